//! Example of the UTF-16 to UTF-8 conversion used for every text fragment

use emx_formdata::utf8::{encode_utf16, utf8_code_at};

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect::<Vec<_>>().join(" ")
}

fn main() {
    println!("=== UTF-8 Encoding Example ===\n");

    let samples: Vec<(&str, Vec<u16>)> = vec![
        ("ASCII 'A'", vec![0x41]),
        ("e acute", vec![0xE9]),
        ("CJK", vec![0x4E16]),
        ("emoji pair", vec![0xD83D, 0xDE00]),
        ("lone high surrogate", vec![0xD83D]),
        ("lone low surrogate", vec![0xDE00]),
    ];

    for (label, units) in &samples {
        let (bytes, consumed) = utf8_code_at(units, 0);
        println!("{:<20} units={:<2} consumed={} bytes={}", label, units.len(), consumed, hex(&bytes));
    }

    let text = "héllo 世界 \u{1f30f}";
    let units: Vec<u16> = text.encode_utf16().collect();
    let encoded = encode_utf16(&units);
    assert_eq!(encoded, text.as_bytes());
    println!("\n{:?} -> {}", text, hex(&encoded));
}
