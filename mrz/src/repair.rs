//! Checksum-guided repair of OCR confusions.
//!
//! OCR confuses visually similar glyph pairs: zero with O, Q and D, one
//! with I and L, five with S, and so on. When a checksummed field fails
//! validation, the repair pass substitutes candidates from a fixed
//! ambiguity table until the check digit matches, within hard attempt
//! caps. Name fields carry no checksum, so for them the letter-for-digit
//! mapping is applied directly.
//!
//! Repair edits the raw rows and re-parses them, which recomputes every
//! validity flag including the composite.

use serde::{Deserialize, Serialize};

use crate::checksum::check_digit;
use crate::decode::ParseOptions;
use crate::document::{MrzDocument, Td1Document, Td3Document};
use crate::fields::{char_at, slice, strip_fillers};
use crate::td1::parse_td1;
use crate::td3::parse_td3;

/// Above this many ambiguous positions the search degrades to
/// one-substitution-at-a-time.
const MAX_CARTESIAN_POSITIONS: usize = 6;
const SINGLE_POSITION_ATTEMPT_CAP: u32 = 2_000;
const CARTESIAN_ATTEMPT_CAP: u32 = 50_000;

/// Which document field a correction applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepairedField {
    DocumentNumber,
    BirthDate,
    ExpiryDate,
    LastName,
    FirstName,
}

/// One applied correction, with the search effort that found it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    pub field: RepairedField,
    pub before: String,
    pub after: String,
    pub attempts: u32,
}

#[derive(Clone, Copy)]
enum FieldAlphabet {
    Alphanumeric,
    DigitsOnly,
}

/// Glyph confusion candidates, most likely reading first.
fn ambiguity_candidates(ch: char) -> &'static [char] {
    match ch {
        'O' => &['0', 'O'],
        'Q' => &['0', 'Q'],
        'D' => &['0', 'D'],
        '0' => &['0', 'O', 'Q', 'D'],
        'I' => &['1', 'I', 'L'],
        'L' => &['1', 'L'],
        '1' => &['1', 'I', 'L'],
        'S' => &['5', 'S'],
        '5' => &['5', 'S'],
        'Z' => &['2', 'Z'],
        '2' => &['2', 'Z'],
        'B' => &['8', 'B'],
        '8' => &['8', 'B'],
        'A' => &['4', 'A'],
        '4' => &['4', 'A'],
        _ => &[],
    }
}

/// Attempts to make `field` satisfy its check digit by substituting
/// ambiguous characters.
///
/// A position participates when the table offers it a candidate different
/// from the character actually read, after restricting date fields to
/// digit candidates. The search is deterministic: positions ascend, pools
/// keep table order, and the cartesian walk varies the last position
/// fastest. Returns the first satisfying variant and the attempts spent,
/// or nothing within the caps.
fn try_fix_by_checksum(
    field: &str,
    expected: char,
    alphabet: FieldAlphabet,
) -> Option<(String, u32)> {
    let chars: Vec<char> = field.chars().collect();
    let mut positions: Vec<usize> = Vec::new();
    let mut pools: Vec<Vec<char>> = Vec::new();
    for (i, ch) in chars.iter().enumerate() {
        let pool: Vec<char> = ambiguity_candidates(*ch)
            .iter()
            .copied()
            .filter(|c| match alphabet {
                FieldAlphabet::Alphanumeric => true,
                FieldAlphabet::DigitsOnly => c.is_ascii_digit(),
            })
            .collect();
        if pool.iter().any(|c| c != ch) {
            positions.push(i);
            pools.push(pool);
        }
    }
    if positions.is_empty() {
        return if check_digit(field) == expected {
            Some((field.to_string(), 0))
        } else {
            None
        };
    }
    if positions.len() > MAX_CARTESIAN_POSITIONS {
        single_position_search(&chars, &positions, &pools, expected)
    } else {
        cartesian_search(&chars, &positions, &pools, expected)
    }
}

fn single_position_search(
    chars: &[char],
    positions: &[usize],
    pools: &[Vec<char>],
    expected: char,
) -> Option<(String, u32)> {
    let mut attempts = 0u32;
    for (idx, pool) in positions.iter().zip(pools) {
        for cand in pool {
            attempts += 1;
            let mut trial = chars.to_vec();
            trial[*idx] = *cand;
            let trial_s: String = trial.into_iter().collect();
            if check_digit(&trial_s) == expected {
                return Some((trial_s, attempts));
            }
            if attempts > SINGLE_POSITION_ATTEMPT_CAP {
                return None;
            }
        }
    }
    None
}

fn cartesian_search(
    chars: &[char],
    positions: &[usize],
    pools: &[Vec<char>],
    expected: char,
) -> Option<(String, u32)> {
    let mut indices = vec![0usize; pools.len()];
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let mut trial = chars.to_vec();
        for (slot, pos) in positions.iter().enumerate() {
            trial[*pos] = pools[slot][indices[slot]];
        }
        let trial_s: String = trial.into_iter().collect();
        if check_digit(&trial_s) == expected {
            return Some((trial_s, attempts));
        }
        if attempts > CARTESIAN_ATTEMPT_CAP {
            return None;
        }
        // Odometer step, last position fastest.
        let mut slot = pools.len();
        loop {
            if slot == 0 {
                return None;
            }
            slot -= 1;
            indices[slot] += 1;
            if indices[slot] < pools[slot].len() {
                break;
            }
            indices[slot] = 0;
        }
    }
}

/// Digits never belong in a name field; restore the letters they most
/// plausibly replaced.
fn fix_name(name: &str) -> Option<String> {
    let fixed: String = name
        .chars()
        .map(|ch| match ch {
            '1' => 'I',
            '0' => 'O',
            '5' => 'S',
            '2' => 'Z',
            '8' => 'B',
            '4' => 'A',
            other => other,
        })
        .collect();
    if fixed != name {
        Some(fixed)
    } else {
        None
    }
}

/// Repairs a parsed document in place of its raw rows.
///
/// Failing checksummed fields are searched individually; successful fixes
/// are written back into the rows, which are then re-parsed so the
/// composite check reflects the repaired content. Name fields are cleaned
/// of digits afterwards. Returns the repaired document with the applied
/// corrections, or nothing when the document had nothing to fix or
/// nothing fixable.
pub fn repair_document(
    doc: &MrzDocument,
    options: &ParseOptions,
) -> Option<(MrzDocument, Vec<Correction>)> {
    match doc {
        MrzDocument::Td3(td3) => repair_td3(td3, options),
        MrzDocument::Td1(td1) => repair_td1(td1, options),
    }
}

/// Replaces the characters of `line` starting at `start` with `replacement`.
fn splice(line: &str, start: usize, replacement: &str) -> String {
    line.chars()
        .take(start)
        .chain(replacement.chars())
        .chain(line.chars().skip(start + replacement.chars().count()))
        .collect()
}

fn repair_td3(doc: &Td3Document, options: &ParseOptions) -> Option<(MrzDocument, Vec<Correction>)> {
    let line1 = doc.raw_lines.first().cloned().unwrap_or_default();
    let mut line2 = doc.raw_lines.get(1).cloned().unwrap_or_default();
    let mut corrections = Vec::new();

    if !doc.passport_number_valid {
        let segment = slice(&line2, 0, 9);
        if let Some((fixed, attempts)) =
            try_fix_by_checksum(&segment, char_at(&line2, 9), FieldAlphabet::Alphanumeric)
        {
            corrections.push(Correction {
                field: RepairedField::DocumentNumber,
                before: strip_fillers(&segment),
                after: strip_fillers(&fixed),
                attempts,
            });
            line2 = splice(&line2, 0, &fixed);
        }
    }
    if !doc.birth_date_valid {
        let segment = slice(&line2, 13, 19);
        if let Some((fixed, attempts)) =
            try_fix_by_checksum(&segment, char_at(&line2, 19), FieldAlphabet::DigitsOnly)
        {
            corrections.push(Correction {
                field: RepairedField::BirthDate,
                before: segment,
                after: fixed.clone(),
                attempts,
            });
            line2 = splice(&line2, 13, &fixed);
        }
    }
    if !doc.expiry_date_valid {
        let segment = slice(&line2, 21, 27);
        if let Some((fixed, attempts)) =
            try_fix_by_checksum(&segment, char_at(&line2, 27), FieldAlphabet::DigitsOnly)
        {
            corrections.push(Correction {
                field: RepairedField::ExpiryDate,
                before: segment,
                after: fixed.clone(),
                attempts,
            });
            line2 = splice(&line2, 21, &fixed);
        }
    }

    let mut repaired = parse_td3(&[line1, line2], options)?;
    fix_document_names(
        &mut repaired.last_name,
        &mut repaired.first_name,
        &mut corrections,
    );

    if corrections.is_empty() {
        return None;
    }
    Some((MrzDocument::Td3(repaired), corrections))
}

fn repair_td1(doc: &Td1Document, options: &ParseOptions) -> Option<(MrzDocument, Vec<Correction>)> {
    let mut line1 = doc.raw_lines.first().cloned().unwrap_or_default();
    let mut line2 = doc.raw_lines.get(1).cloned().unwrap_or_default();
    let line3 = doc.raw_lines.get(2).cloned().unwrap_or_default();
    let mut corrections = Vec::new();

    if !doc.document_number_valid {
        let segment = slice(&line1, 5, 14);
        if let Some((fixed, attempts)) =
            try_fix_by_checksum(&segment, char_at(&line1, 14), FieldAlphabet::Alphanumeric)
        {
            corrections.push(Correction {
                field: RepairedField::DocumentNumber,
                before: strip_fillers(&segment),
                after: strip_fillers(&fixed),
                attempts,
            });
            line1 = splice(&line1, 5, &fixed);
        }
    }
    if !doc.birth_date_valid {
        let segment = slice(&line2, 0, 6);
        if let Some((fixed, attempts)) =
            try_fix_by_checksum(&segment, char_at(&line2, 6), FieldAlphabet::DigitsOnly)
        {
            corrections.push(Correction {
                field: RepairedField::BirthDate,
                before: segment,
                after: fixed.clone(),
                attempts,
            });
            line2 = splice(&line2, 0, &fixed);
        }
    }
    if !doc.expiry_date_valid {
        let segment = slice(&line2, 8, 14);
        if let Some((fixed, attempts)) =
            try_fix_by_checksum(&segment, char_at(&line2, 14), FieldAlphabet::DigitsOnly)
        {
            corrections.push(Correction {
                field: RepairedField::ExpiryDate,
                before: segment,
                after: fixed.clone(),
                attempts,
            });
            line2 = splice(&line2, 8, &fixed);
        }
    }

    let mut repaired = parse_td1(&[line1, line2, line3], options)?;
    fix_document_names(
        &mut repaired.last_name,
        &mut repaired.first_name,
        &mut corrections,
    );

    if corrections.is_empty() {
        return None;
    }
    Some((MrzDocument::Td1(repaired), corrections))
}

fn fix_document_names(
    last_name: &mut String,
    first_name: &mut String,
    corrections: &mut Vec<Correction>,
) {
    if let Some(fixed) = fix_name(last_name) {
        corrections.push(Correction {
            field: RepairedField::LastName,
            before: last_name.clone(),
            after: fixed.clone(),
            attempts: 0,
        });
        *last_name = fixed;
    }
    if let Some(fixed) = fix_name(first_name) {
        corrections.push(Correction {
            field: RepairedField::FirstName,
            before: first_name.clone(),
            after: fixed.clone(),
            attempts: 0,
        });
        *first_name = fixed;
    }
}
