//! Candidate-line extraction from raw OCR text.
//!
//! OCR text is noisy, with anything from mixed case and stray spaces to
//! the classic letter-for-digit confusions. Extraction normalizes each line into
//! the MRZ alphabet and keeps only lines long enough to plausibly be MRZ
//! rows. The caller picks the length threshold: a strict passport-only pass
//! wants longer lines than a pass that must also admit ID-card rows.

use crate::td3::TD3_LINE_LEN;

/// Threshold for a passport-only pass over live camera text.
pub const STRICT_MIN_LINE_LEN: usize = 30;

/// Threshold admitting the shorter 30-character ID-card rows, used when
/// scanning recognized-text dumps of unknown document type.
pub const PERMISSIVE_MIN_LINE_LEN: usize = 25;

/// No machine-readable zone has more than three rows.
pub const MAX_MRZ_LINES: usize = 3;

/// Normalizes one raw OCR line into the MRZ alphabet.
///
/// Trims surrounding whitespace, uppercases, maps interior blanks to the
/// filler `<`, maps the letter confusions `O` to `0` and `I` to `1`, and
/// drops everything else outside `A`..`Z`, `0`..`9`, `<`.
///
/// The letter-to-digit mapping corrupts genuine letters inside name fields;
/// the repair pass restores those after parsing.
pub fn clean_line(line: &str) -> String {
    line.trim()
        .chars()
        .filter_map(|c| {
            let c = c.to_ascii_uppercase();
            match c {
                ' ' => Some('<'),
                'O' => Some('0'),
                'I' => Some('1'),
                'A'..='Z' | '0'..='9' | '<' => Some(c),
                _ => None,
            }
        })
        .collect()
}

/// Extracts candidate MRZ lines from a block of recognized text.
///
/// Lines shorter than `min_len` after cleaning are discarded. A lone
/// survivor long enough to hold both passport rows run together is split
/// back into two. When more than [`MAX_MRZ_LINES`] candidates survive,
/// the longest ones win, longest first; smaller sets keep their original
/// order.
pub fn extract_lines(text: &str, min_len: usize) -> Vec<String> {
    let mut lines: Vec<String> = text
        .lines()
        .map(clean_line)
        .filter(|line| line.chars().count() >= min_len)
        .collect();
    if let [only] = lines.as_slice() {
        if let Some((top, bottom)) = split_joined_rows(only) {
            return vec![top, bottom];
        }
    }
    if lines.len() > MAX_MRZ_LINES {
        lines.sort_by(|a, b| b.len().cmp(&a.len()));
        lines.truncate(MAX_MRZ_LINES);
    }
    lines
}

/// Splits a line that holds two concatenated passport rows.
///
/// OCR engines sometimes return the whole zone as one unbroken run. A
/// full read yields two 44-character rows; a read clipped short of the
/// second row's filler yields two 36-character prefixes that the parser
/// pads back out. Characters past the second row are discarded. The
/// input must already be cleaned, and the MRZ alphabet is ASCII, so byte
/// indexing is safe.
fn split_joined_rows(line: &str) -> Option<(String, String)> {
    let full = 2 * TD3_LINE_LEN;
    if line.len() >= full {
        let (top, rest) = line.split_at(TD3_LINE_LEN);
        Some((top.to_string(), rest[..TD3_LINE_LEN].to_string()))
    } else if line.len() >= 72 {
        Some((line[..36].to_string(), line[36..72].to_string()))
    } else {
        None
    }
}
