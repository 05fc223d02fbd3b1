//! Engine configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use idgate_liveness::LivenessConfig;
use idgate_mrz::{CenturyRule, ParseOptions, PERMISSIVE_MIN_LINE_LEN, STRICT_MIN_LINE_LEN};

use crate::error::ConfigError;

/// Scan pipeline tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Minimum cleaned-line length admitted as an MRZ candidate.
    #[serde(default = "default_min_line_len")]
    pub min_line_len: usize,

    /// Fraction of the image height cropped from the bottom for the first
    /// OCR pass.
    #[serde(default = "default_crop_fraction")]
    pub crop_fraction: f64,

    /// Whether checksum-guided repair runs on parse results.
    #[serde(default = "default_true")]
    pub repair: bool,

    /// Century rule applied to birth dates.
    #[serde(default)]
    pub birth_century: CenturyRule,

    /// Century rule applied to expiry dates.
    #[serde(default)]
    pub expiry_century: CenturyRule,
}

/// Top-level configuration for the verification engines.
///
/// Loaded from a TOML file via [`EngineConfig::from_toml_file`] or built
/// programmatically (e.g. for tests). Every field has a default so an empty
/// file is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub liveness: LivenessConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_min_line_len() -> usize {
    STRICT_MIN_LINE_LEN
}

fn default_crop_fraction() -> f64 {
    0.25
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ScanConfig {
    /// Preset for text-only server scans: admits TD1's 30-character rows
    /// even when OCR clipped a few characters off the ends.
    pub fn permissive() -> Self {
        Self {
            min_line_len: PERMISSIVE_MIN_LINE_LEN,
            ..Self::default()
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            birth_century: self.birth_century,
            expiry_century: self.expiry_century,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_line_len: default_min_line_len(),
            crop_fraction: default_crop_fraction(),
            repair: default_true(),
            birth_century: CenturyRule::default(),
            expiry_century: CenturyRule::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("EngineConfig is always serializable to TOML")
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            scan: ScanConfig::default(),
            liveness: LivenessConfig::default(),
        }
    }
}
