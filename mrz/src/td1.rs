//! TD1 layout: three rows of 30 characters (ID cards).

use crate::checksum::validate;
use crate::date::MrzDate;
use crate::decode::ParseOptions;
use crate::document::Td1Document;
use crate::fields::{char_at, pad_to, slice, split_names, strip_fillers};

pub const TD1_LINE_LEN: usize = 30;

/// Row 1: document type [0,2), issuing country [2,5), number [5,14) +
/// digit [14], optional data [15,30). Row 2: birth [0,6) + digit [6],
/// sex [7], expiry [8,14) + digit [14], nationality [15,18), optional
/// data [18,29), final digit [29]. Row 3: names.
pub(crate) fn parse_td1(lines: &[String], options: &ParseOptions) -> Option<Td1Document> {
    if lines.len() < 3 {
        return None;
    }
    let line1 = pad_to(&lines[0], TD1_LINE_LEN);
    let line2 = pad_to(&lines[1], TD1_LINE_LEN);
    let line3 = pad_to(&lines[2], TD1_LINE_LEN);

    let (last_name, first_name) = split_names(&line3);

    let document_number_raw = slice(&line1, 5, 14);
    let document_number_check_digit = char_at(&line1, 14);
    let birth_raw = slice(&line2, 0, 6);
    let birth_date_check_digit = char_at(&line2, 6);
    let expiry_raw = slice(&line2, 8, 14);
    let expiry_date_check_digit = char_at(&line2, 14);
    let final_check_digit = char_at(&line2, 29);

    let composite = [
        slice(&line1, 5, 15),
        slice(&line2, 0, 7),
        slice(&line2, 8, 15),
        slice(&line2, 18, 29),
        slice(&line1, 15, 30),
    ]
    .concat();

    Some(Td1Document {
        document_type: slice(&line1, 0, 2),
        issuing_country: slice(&line1, 2, 5),
        document_number: strip_fillers(&document_number_raw),
        document_number_check_digit,
        document_number_valid: validate(&document_number_raw, document_number_check_digit),
        nationality: slice(&line2, 15, 18),
        birth_date: MrzDate::normalize(&birth_raw, options.birth_century),
        birth_date_check_digit,
        birth_date_valid: validate(&birth_raw, birth_date_check_digit),
        sex: slice(&line2, 7, 8),
        expiry_date: MrzDate::normalize(&expiry_raw, options.expiry_century),
        expiry_date_check_digit,
        expiry_date_valid: validate(&expiry_raw, expiry_date_check_digit),
        optional1: slice(&line1, 15, 30).replace('<', " ").trim().to_string(),
        optional2: slice(&line2, 18, 29).replace('<', " ").trim().to_string(),
        last_name,
        first_name,
        final_check_digit,
        composite_valid: validate(&composite, final_check_digit),
        raw_lines: vec![line1, line2, line3],
    })
}
