//! Parsed machine-readable documents.
//!
//! Field names serialize in camelCase to match the shape emitted by the
//! scanning endpoints. Check digits are carried verbatim alongside their
//! computed validity so a caller can render exactly what was read.

use serde::{Deserialize, Serialize};

use crate::date::MrzDate;

/// A parsed TD3 zone (passports, two rows of 44).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Td3Document {
    pub document_type: String,
    pub issuing_country: String,
    pub last_name: String,
    pub first_name: String,
    pub passport_number: String,
    pub passport_number_check_digit: char,
    pub passport_number_valid: bool,
    pub nationality: String,
    pub birth_date: MrzDate,
    pub birth_date_check_digit: char,
    pub birth_date_valid: bool,
    pub sex: String,
    pub expiry_date: MrzDate,
    pub expiry_date_check_digit: char,
    pub expiry_date_valid: bool,
    pub optional_data: String,
    pub final_check_digit: char,
    pub composite_valid: bool,
    /// The padded rows the fields were sliced from.
    pub raw_lines: Vec<String>,
}

/// A parsed TD1 zone (ID cards, three rows of 30).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Td1Document {
    pub document_type: String,
    pub issuing_country: String,
    pub document_number: String,
    pub document_number_check_digit: char,
    pub document_number_valid: bool,
    pub nationality: String,
    pub birth_date: MrzDate,
    pub birth_date_check_digit: char,
    pub birth_date_valid: bool,
    pub sex: String,
    pub expiry_date: MrzDate,
    pub expiry_date_check_digit: char,
    pub expiry_date_valid: bool,
    pub optional1: String,
    pub optional2: String,
    pub last_name: String,
    pub first_name: String,
    pub final_check_digit: char,
    pub composite_valid: bool,
    pub raw_lines: Vec<String>,
}

/// Either supported zone layout, tagged by format name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format")]
pub enum MrzDocument {
    #[serde(rename = "TD3")]
    Td3(Td3Document),
    #[serde(rename = "TD1")]
    Td1(Td1Document),
}

impl MrzDocument {
    pub fn format(&self) -> &'static str {
        match self {
            MrzDocument::Td3(_) => "TD3",
            MrzDocument::Td1(_) => "TD1",
        }
    }

    pub fn raw_lines(&self) -> &[String] {
        match self {
            MrzDocument::Td3(doc) => &doc.raw_lines,
            MrzDocument::Td1(doc) => &doc.raw_lines,
        }
    }

    /// The four per-document validity flags, in layout order.
    pub fn check_flags(&self) -> [bool; 4] {
        match self {
            MrzDocument::Td3(doc) => [
                doc.passport_number_valid,
                doc.birth_date_valid,
                doc.expiry_date_valid,
                doc.composite_valid,
            ],
            MrzDocument::Td1(doc) => [
                doc.document_number_valid,
                doc.birth_date_valid,
                doc.expiry_date_valid,
                doc.composite_valid,
            ],
        }
    }

    pub fn all_checks_passed(&self) -> bool {
        self.check_flags().iter().all(|flag| *flag)
    }

    pub fn failed_check_count(&self) -> usize {
        self.check_flags().iter().filter(|flag| !**flag).count()
    }
}
