use std::path::PathBuf;
use thiserror::Error;

/// Failure at a collaborator boundary (OCR, preprocessing, camera) or in
/// the staged-file plumbing between them.
///
/// Everything the engines themselves can express as data (missing lines,
/// failed checksums, liveness resets) stays out of this enum.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("ocr engine failed: {0}")]
    Ocr(String),

    #[error("image preprocessing failed: {0}")]
    Preprocess(String),

    #[error("photo capture failed: {0}")]
    Capture(String),

    #[error("staged image I/O: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
