#![no_main]

use libfuzzer_sys::fuzz_target;

use idgate_mrz::{decode, extract_lines, CenturyRule, MrzDocument, ParseOptions};

// Fuzz the full text-to-document path. Parsing is total: it must never
// panic, a returned document always carries the padded lines it was read
// from, and the result survives a serde round trip unchanged.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let options = ParseOptions {
        birth_century: match data[0] % 3 {
            0 => CenturyRule::PivotFifty,
            1 => CenturyRule::PivotThirty,
            _ => CenturyRule::ForceTwoThousands,
        },
        expiry_century: match (data[0] >> 2) % 3 {
            0 => CenturyRule::PivotFifty,
            1 => CenturyRule::PivotThirty,
            _ => CenturyRule::ForceTwoThousands,
        },
    };

    let text = String::from_utf8_lossy(&data[1..]);
    let min_len = ((data[0] as usize) % 40).max(1);
    let lines = extract_lines(&text, min_len);

    let Some(doc) = decode(&lines, &options) else {
        return;
    };

    match &doc {
        MrzDocument::Td3(td3) => {
            assert_eq!(td3.raw_lines.len(), 2);
            for line in &td3.raw_lines {
                assert_eq!(line.chars().count(), 44);
            }
        }
        MrzDocument::Td1(td1) => {
            assert_eq!(td1.raw_lines.len(), 3);
            for line in &td1.raw_lines {
                assert_eq!(line.chars().count(), 30);
            }
        }
    }

    let json = serde_json::to_string(&doc).expect("document serializes");
    let back: MrzDocument = serde_json::from_str(&json).expect("document deserializes");
    assert_eq!(doc, back);
});
