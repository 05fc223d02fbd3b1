//! MRZ date normalization.
//!
//! Dates in a machine-readable zone are six digits, `YYMMDD`. The century
//! is not encoded, so expanding to a full year is a policy decision that
//! differs between birth dates (mostly in the past) and expiry dates
//! (mostly in the near future).

use serde::{Deserialize, Serialize};

/// Century expansion policy for two-digit years.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CenturyRule {
    /// Years below 50 land in the 2000s, the rest in the 1900s.
    PivotFifty,
    /// Years of 30 and above land in the 1900s, the rest in the 2000s.
    PivotThirty,
    /// Every year lands in the 2000s.
    ForceTwoThousands,
}

impl Default for CenturyRule {
    fn default() -> Self {
        CenturyRule::PivotFifty
    }
}

impl CenturyRule {
    /// Expands a two-digit year to a full year under this rule.
    pub fn full_year(self, yy: u32) -> u32 {
        match self {
            CenturyRule::PivotFifty => {
                if yy < 50 {
                    2000 + yy
                } else {
                    1900 + yy
                }
            }
            CenturyRule::PivotThirty => {
                if yy >= 30 {
                    1900 + yy
                } else {
                    2000 + yy
                }
            }
            CenturyRule::ForceTwoThousands => 2000 + yy,
        }
    }
}

/// A date field as scanned plus its normalized form.
///
/// `raw` is the six-digit field exactly as read from the zone; `iso` is the
/// `YYYY-MM-DD` expansion. Input that is not exactly six ASCII digits passes
/// through unchanged so the caller can spot it via [`MrzDate::is_normalized`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrzDate {
    pub raw: String,
    pub iso: String,
}

impl MrzDate {
    pub fn normalize(raw: &str, rule: CenturyRule) -> Self {
        let bytes = raw.as_bytes();
        let iso = if bytes.len() == 6 && bytes.iter().all(u8::is_ascii_digit) {
            let yy = u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0');
            format!("{:04}-{}-{}", rule.full_year(yy), &raw[2..4], &raw[4..6])
        } else {
            raw.to_string()
        };
        MrzDate {
            raw: raw.to_string(),
            iso,
        }
    }

    /// True when normalization produced a calendar date.
    pub fn is_normalized(&self) -> bool {
        self.iso != self.raw
    }
}
