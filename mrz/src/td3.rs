//! TD3 layout: two rows of 44 characters (passports).

use crate::checksum::validate;
use crate::date::MrzDate;
use crate::decode::ParseOptions;
use crate::document::Td3Document;
use crate::fields::{char_at, pad_to, slice, split_names, strip_fillers};

pub const TD3_LINE_LEN: usize = 44;

/// Row 1: document type [0,2), issuing country [2,5), names [5,44).
/// Row 2: number [0,9) + digit [9], nationality [10,13), birth [13,19) +
/// digit [19], sex [20], expiry [21,27) + digit [27], optional data
/// [28,42), final digit [43]. Position 42 is not covered by any check here.
pub(crate) fn parse_td3(lines: &[String], options: &ParseOptions) -> Option<Td3Document> {
    if lines.len() < 2 {
        return None;
    }
    let line1 = pad_to(&lines[0], TD3_LINE_LEN);
    let line2 = pad_to(&lines[1], TD3_LINE_LEN);

    let (last_name, first_name) = split_names(&slice(&line1, 5, 44));

    let passport_number_raw = slice(&line2, 0, 9);
    let passport_number_check_digit = char_at(&line2, 9);
    let birth_raw = slice(&line2, 13, 19);
    let birth_date_check_digit = char_at(&line2, 19);
    let expiry_raw = slice(&line2, 21, 27);
    let expiry_date_check_digit = char_at(&line2, 27);
    let final_check_digit = char_at(&line2, 43);

    let composite = [
        slice(&line2, 0, 10),
        slice(&line2, 13, 20),
        slice(&line2, 21, 28),
        slice(&line2, 28, 42),
    ]
    .concat();

    Some(Td3Document {
        document_type: slice(&line1, 0, 2),
        issuing_country: slice(&line1, 2, 5),
        last_name,
        first_name,
        passport_number: strip_fillers(&passport_number_raw),
        passport_number_check_digit,
        passport_number_valid: validate(&passport_number_raw, passport_number_check_digit),
        nationality: slice(&line2, 10, 13),
        birth_date: MrzDate::normalize(&birth_raw, options.birth_century),
        birth_date_check_digit,
        birth_date_valid: validate(&birth_raw, birth_date_check_digit),
        sex: slice(&line2, 20, 21),
        expiry_date: MrzDate::normalize(&expiry_raw, options.expiry_century),
        expiry_date_check_digit,
        expiry_date_valid: validate(&expiry_raw, expiry_date_check_digit),
        optional_data: slice(&line2, 28, 42).replace('<', " ").trim().to_string(),
        final_check_digit,
        composite_valid: validate(&composite, final_check_digit),
        raw_lines: vec![line1, line2],
    })
}
