#![no_main]

use libfuzzer_sys::fuzz_target;

use idgate_mrz::{clean_line, extract_lines, MAX_MRZ_LINES, PERMISSIVE_MIN_LINE_LEN};

// Fuzz candidate extraction with arbitrary text and length gates.
// Extraction must never panic, and its output must honor the character
// alphabet, the length gate, and the line cap.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let min_len = ((data[0] as usize) % 64).max(1);
    let text = String::from_utf8_lossy(&data[1..]);

    let lines = extract_lines(&text, min_len);
    assert!(lines.len() <= MAX_MRZ_LINES);
    for line in &lines {
        // A lone survivor holding two joined passport rows is split into
        // 44- or 36-character halves, which may undercut a larger gate.
        assert!(line.len() >= min_len.min(36));
        assert!(line
            .chars()
            .all(|c| c == '<' || c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    // The single-line cleaner feeds the extractor and shares its alphabet.
    for raw in text.lines() {
        let cleaned = clean_line(raw);
        assert!(cleaned
            .chars()
            .all(|c| c == '<' || c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    let _ = extract_lines(&text, PERMISSIVE_MIN_LINE_LEN);
});
