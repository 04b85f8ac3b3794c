//! UTF-16 code unit to UTF-8 byte conversion
//!
//! Works on raw UTF-16 code units rather than `char`s so that unpaired
//! surrogates still have a defined encoding: they fall through to the
//! three-byte branch, the same lenient behavior as WTF-8.

const SURROGATE_MASK: u16 = 0xFC00;
const HIGH_SURROGATE: u16 = 0xD800;
const LOW_SURROGATE: u16 = 0xDC00;

/// Encode the code point starting at `units[i]`.
///
/// Returns the UTF-8 bytes (1 to 4 of them) and the number of code units
/// consumed, which is 2 only for a valid surrogate pair.
///
/// # Panics
/// Panics if `i` is out of bounds.
pub fn utf8_code_at(units: &[u16], i: usize) -> (Vec<u8>, usize) {
    let c = u32::from(units[i]);

    if c < 0x80 {
        return (vec![c as u8], 1);
    }

    if c < 0x800 {
        return (vec![0xC0 | (c >> 6) as u8, 0x80 | (c & 0x3F) as u8], 1);
    }

    if is_high_surrogate(units[i]) {
        if let Some(&next) = units.get(i + 1) {
            if is_low_surrogate(next) {
                let cp = 0x10000 + ((c & 0x3FF) << 10) + (u32::from(next) & 0x3FF);
                let bytes = vec![
                    0xF0 | (cp >> 18) as u8,
                    0x80 | ((cp >> 12) & 0x3F) as u8,
                    0x80 | ((cp >> 6) & 0x3F) as u8,
                    0x80 | (cp & 0x3F) as u8,
                ];
                return (bytes, 2);
            }
        }
    }

    let bytes = vec![
        0xE0 | (c >> 12) as u8,
        0x80 | ((c >> 6) & 0x3F) as u8,
        0x80 | (c & 0x3F) as u8,
    ];
    (bytes, 1)
}

/// Encode a whole sequence of UTF-16 code units
pub fn encode_utf16(units: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        let (bytes, consumed) = utf8_code_at(units, i);
        out.extend_from_slice(&bytes);
        i += consumed;
    }
    out
}

/// Encode a Rust string through its UTF-16 view.
///
/// A `&str` never holds unpaired surrogates, so the result always equals
/// `s.as_bytes()`; the framer still goes through here so every textual
/// fragment of a body takes one path.
pub fn str_to_utf8(s: &str) -> Vec<u8> {
    let units: Vec<u16> = s.encode_utf16().collect();
    encode_utf16(&units)
}

/// Lazy byte iterator over a slice of UTF-16 code units
#[derive(Debug, Clone)]
pub struct Utf8Bytes<'a> {
    units: &'a [u16],
    pos: usize,
    pending: [u8; 4],
    pending_len: usize,
    pending_pos: usize,
}

impl<'a> Utf8Bytes<'a> {
    /// Create an iterator positioned at the first code unit
    pub fn new(units: &'a [u16]) -> Self {
        Self {
            units,
            pos: 0,
            pending: [0; 4],
            pending_len: 0,
            pending_pos: 0,
        }
    }
}

impl Iterator for Utf8Bytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.pending_pos == self.pending_len {
            if self.pos >= self.units.len() {
                return None;
            }
            let (bytes, consumed) = utf8_code_at(self.units, self.pos);
            self.pos += consumed;
            self.pending[..bytes.len()].copy_from_slice(&bytes);
            self.pending_len = bytes.len();
            self.pending_pos = 0;
        }

        let byte = self.pending[self.pending_pos];
        self.pending_pos += 1;
        Some(byte)
    }
}

fn is_high_surrogate(unit: u16) -> bool {
    unit & SURROGATE_MASK == HIGH_SURROGATE
}

fn is_low_surrogate(unit: u16) -> bool {
    unit & SURROGATE_MASK == LOW_SURROGATE
}
