//! Fixed-offset field slicing shared by the TD3 and TD1 parsers.
//!
//! All helpers operate on character positions and tolerate short or
//! non-ASCII input. An out-of-range field yields an empty string, never a
//! panic, so parsing stays total over raw OCR output.

/// Truncates or right-pads `line` with `<` to exactly `width` characters.
pub(crate) fn pad_to(line: &str, width: usize) -> String {
    let mut out: String = line.chars().take(width).collect();
    let have = out.chars().count();
    out.extend(std::iter::repeat('<').take(width.saturating_sub(have)));
    out
}

/// Characters `[start, end)` of `line`.
pub(crate) fn slice(line: &str, start: usize, end: usize) -> String {
    line.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

/// Character at position `i`, filler when absent.
pub(crate) fn char_at(line: &str, i: usize) -> char {
    line.chars().nth(i).unwrap_or('<')
}

/// Removes filler characters entirely, e.g. for document numbers.
pub(crate) fn strip_fillers(field: &str) -> String {
    field.chars().filter(|c| *c != '<').collect()
}

/// Turns a filler-padded name segment into words separated by single spaces.
pub(crate) fn expand_name(field: &str) -> String {
    field
        .split('<')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a name field on the first `<<` into (surname, given names).
pub(crate) fn split_names(field: &str) -> (String, String) {
    match field.split_once("<<") {
        Some((surname, given)) => (expand_name(surname), expand_name(given)),
        None => (expand_name(field), String::new()),
    }
}
