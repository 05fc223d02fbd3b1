//! ICAO 9303 check digit arithmetic.
//!
//! Every checksummed field in a machine-readable zone is validated with the
//! same weighted modulus: each character is mapped to a numeric value, the
//! values are multiplied by the repeating weight cycle 7-3-1, and the sum
//! modulo 10 is the expected digit.

/// Weight cycle applied positionally across a field.
const WEIGHTS: [u32; 3] = [7, 3, 1];

/// Numeric value of a single MRZ character.
///
/// Digits map to their value and `A`..`Z` map to `10`..`35`. The filler
/// `<` and anything else outside the MRZ alphabet map to zero so that
/// validation over noisy OCR output stays total.
pub fn char_value(c: char) -> u32 {
    match c {
        '0'..='9' => c as u32 - '0' as u32,
        'A'..='Z' => c as u32 - 'A' as u32 + 10,
        _ => 0,
    }
}

/// Computes the check digit for a field.
///
/// Total over arbitrary input: unknown characters count as zero and the
/// result is always an ASCII digit.
pub fn check_digit(data: &str) -> char {
    let sum: u64 = data
        .chars()
        .enumerate()
        .map(|(i, c)| u64::from(char_value(c) * WEIGHTS[i % 3]))
        .sum();
    (b'0' + (sum % 10) as u8) as char
}

/// True when `data` checks out against the digit read from the document.
pub fn validate(data: &str, expected: char) -> bool {
    check_digit(data) == expected
}
