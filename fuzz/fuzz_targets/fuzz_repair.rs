#![no_main]

use libfuzzer_sys::fuzz_target;

use idgate_mrz::{decode, extract_lines, repair_document, ParseOptions, PERMISSIVE_MIN_LINE_LEN};

// Fuzz checksum-guided repair over documents parsed from arbitrary text.
// Repair must never panic, never return an empty correction list, never
// change the document format, and never break a field check that already
// passed (the recomputed composite may move either way).
fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let lines = extract_lines(&text, PERMISSIVE_MIN_LINE_LEN);

    let options = ParseOptions::default();
    let Some(doc) = decode(&lines, &options) else {
        return;
    };

    let Some((repaired, corrections)) = repair_document(&doc, &options) else {
        return;
    };

    assert!(!corrections.is_empty());
    assert_eq!(repaired.format(), doc.format());

    let before = doc.check_flags();
    let after = repaired.check_flags();
    for i in 0..3 {
        if before[i] {
            assert!(after[i], "repair broke a passing field check");
        }
    }

    for correction in &corrections {
        assert_ne!(correction.before, correction.after);
    }

    // Repair is idempotent on its own output's fields: running it again
    // must not rediscover the same checksum fixes.
    if let Some((_, again)) = repair_document(&repaired, &options) {
        for c in &again {
            assert!(
                !corrections
                    .iter()
                    .any(|prev| prev.field == c.field && prev.after == c.before && prev.before == c.after),
                "repair oscillated on {:?}",
                c.field
            );
        }
    }
});
