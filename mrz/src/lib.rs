//! Machine-readable zone codec.
//!
//! Takes raw OCR text through candidate extraction, fixed-offset parsing
//! of the TD3 (passport) and TD1 (ID card) layouts, ICAO 9303 check digit
//! validation, and checksum-guided repair of common OCR confusions.
//!
//! Parsing is total: checksum failures are reported as flags on the
//! document, never as errors, and malformed fields degrade to their raw
//! text.

pub mod checksum;
pub mod date;
pub mod decode;
pub mod document;
pub mod extract;
mod fields;
pub mod repair;
pub mod td1;
pub mod td3;

pub use checksum::{char_value, check_digit, validate};
pub use date::{CenturyRule, MrzDate};
pub use decode::{decode, ParseOptions};
pub use document::{MrzDocument, Td1Document, Td3Document};
pub use extract::{
    clean_line, extract_lines, MAX_MRZ_LINES, PERMISSIVE_MIN_LINE_LEN, STRICT_MIN_LINE_LEN,
};
pub use repair::{repair_document, Correction, RepairedField};
pub use td1::TD1_LINE_LEN;
pub use td3::TD3_LINE_LEN;
