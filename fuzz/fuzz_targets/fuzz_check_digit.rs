#![no_main]

use libfuzzer_sys::fuzz_target;

use idgate_mrz::{char_value, check_digit, validate};

// Fuzz the ICAO 9303 checksum over arbitrary strings. The function is
// total: any input, including non-MRZ characters, yields exactly one
// decimal digit, and validate agrees with it.
fuzz_target!(|data: &[u8]| {
    let field = String::from_utf8_lossy(data);

    let digit = check_digit(&field);
    assert!(digit.is_ascii_digit());

    // Deterministic: same input, same digit.
    assert_eq!(digit, check_digit(&field));
    assert!(validate(&field, digit));

    for c in field.chars() {
        assert!(char_value(c) <= 35);
    }

    // Appending the check digit and checksumming again is still total.
    let mut extended = field.into_owned();
    extended.push(digit);
    let _ = check_digit(&extended);
});
