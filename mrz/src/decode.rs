//! Format selection over extracted candidate lines.

use serde::{Deserialize, Serialize};

use crate::date::CenturyRule;
use crate::document::MrzDocument;
use crate::td1::parse_td1;
use crate::td3::parse_td3;
use crate::Td3Document;

/// Century policies applied while decoding, one per date field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub birth_century: CenturyRule,
    pub expiry_century: CenturyRule,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            birth_century: CenturyRule::default(),
            expiry_century: CenturyRule::default(),
        }
    }
}

/// Decodes candidate lines into a document.
///
/// TD3 is tried first whenever two lines exist. The attempt is kept if any
/// of its four checks passes; otherwise, with three lines available, TD1 is
/// decoded instead. A document is returned even when every check fails,
/// since callers surface the validity flags rather than abort. Fewer than
/// two lines decode to nothing.
pub fn decode(lines: &[String], options: &ParseOptions) -> Option<MrzDocument> {
    let td3 = parse_td3(lines, options)?;
    if has_checksum_evidence(&td3) || lines.len() < 3 {
        return Some(MrzDocument::Td3(td3));
    }
    match parse_td1(lines, options) {
        Some(td1) => Some(MrzDocument::Td1(td1)),
        None => Some(MrzDocument::Td3(td3)),
    }
}

/// At least one of the four checks passed, so the TD3 reading is not pure
/// coincidence of offsets.
fn has_checksum_evidence(doc: &Td3Document) -> bool {
    doc.passport_number_valid
        || doc.birth_date_valid
        || doc.expiry_date_valid
        || doc.composite_valid
}

#[cfg(test)]
mod tests {
    use super::*;

    const TD3_LINE1: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<";
    const TD3_LINE2: &str = "L898902C36UTO7408122F1204159ZE184226B<<<<<19";
    const TD1_LINE1: &str = "I<UTOD231458907<<<<<<<<<<<<<<<";
    const TD1_LINE2: &str = "7408122F2506078UTO<<<<<<<<<<<8";
    const TD1_LINE3: &str = "ERIKSSON<<ANNA<MARIA<<<<<<<<<<";

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn nothing_below_two_lines() {
        assert!(decode(&[], &ParseOptions::default()).is_none());
        assert!(decode(&lines(&[TD3_LINE1]), &ParseOptions::default()).is_none());
    }

    #[test]
    fn two_valid_lines_decode_as_td3() {
        let doc = decode(&lines(&[TD3_LINE1, TD3_LINE2]), &ParseOptions::default()).unwrap();
        assert_eq!(doc.format(), "TD3");
        assert!(doc.all_checks_passed());
    }

    #[test]
    fn two_garbage_lines_still_decode_as_td3() {
        let doc = decode(
            &lines(&["X".repeat(44).as_str(), "Y".repeat(44).as_str()]),
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.format(), "TD3");
        assert!(!doc.all_checks_passed());
    }

    #[test]
    fn three_id_card_rows_fall_through_to_td1() {
        let doc = decode(
            &lines(&[TD1_LINE1, TD1_LINE2, TD1_LINE3]),
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.format(), "TD1");
        assert!(doc.all_checks_passed());
    }

    #[test]
    fn checksum_evidence_keeps_td3_even_with_three_lines() {
        // A passport read plus one stray extra candidate line.
        let doc = decode(
            &lines(&[TD3_LINE1, TD3_LINE2, "NOISENOISENOISENOISENOISENOISE"]),
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.format(), "TD3");
    }

    #[test]
    fn td1_returned_regardless_of_its_flags() {
        // Three rows, none of which checksum under either layout.
        let doc = decode(
            &lines(&[
                "Q".repeat(30).as_str(),
                "R".repeat(30).as_str(),
                "S".repeat(30).as_str(),
            ]),
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.format(), "TD1");
        assert!(!doc.all_checks_passed());
    }
}
