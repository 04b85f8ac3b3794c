//! Multipart boundary generation and validation

use rand::Rng;

/// Fixed tag placed in front of every generated token
pub const BOUNDARY_PREFIX: &str = "emxFormBoundary";
/// Number of random characters in a generated token
pub const BOUNDARY_TOKEN_LEN: usize = 17;
/// Characters a generated token is drawn from
pub const BOUNDARY_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// RFC 2046 upper bound on boundary length
pub const MAX_BOUNDARY_LEN: usize = 70;

/// Extra characters RFC 2046 allows in a boundary besides ASCII alphanumerics
const BCHARS_SPECIAL: &str = "'()+_,-./:=? ";

/// A multipart boundary (without the leading `--`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary {
    value: String,
    token_start: usize,
}

/// Error type for caller-supplied boundaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    /// Boundary is the empty string
    Empty,
    /// Boundary is longer than 70 characters
    TooLong { len: usize },
    /// Boundary contains a character outside the RFC 2046 `bchars` set
    InvalidChar { ch: char },
    /// Boundary ends with a space
    TrailingSpace,
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryError::Empty => write!(f, "Boundary must not be empty"),
            BoundaryError::TooLong { len } => {
                write!(f, "Boundary is {} characters long (maximum is {})", len, MAX_BOUNDARY_LEN)
            }
            BoundaryError::InvalidChar { ch } => {
                write!(f, "Invalid character in boundary: {:?}", ch)
            }
            BoundaryError::TrailingSpace => write!(f, "Boundary must not end with a space"),
        }
    }
}

impl std::error::Error for BoundaryError {}

impl Boundary {
    /// Generate a fresh boundary from the thread-local RNG
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate a boundary from the given RNG
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut value = String::with_capacity(BOUNDARY_PREFIX.len() + BOUNDARY_TOKEN_LEN);
        value.push_str(BOUNDARY_PREFIX);
        for _ in 0..BOUNDARY_TOKEN_LEN {
            let idx = rng.gen_range(0..BOUNDARY_ALPHABET.len());
            value.push(BOUNDARY_ALPHABET[idx] as char);
        }
        Self {
            value,
            token_start: BOUNDARY_PREFIX.len(),
        }
    }

    /// Use a caller-supplied boundary, validated against RFC 2046
    pub fn new(value: impl Into<String>) -> Result<Self, BoundaryError> {
        let value = value.into();

        if value.is_empty() {
            return Err(BoundaryError::Empty);
        }

        let len = value.chars().count();
        if len > MAX_BOUNDARY_LEN {
            return Err(BoundaryError::TooLong { len });
        }

        if let Some(ch) = value
            .chars()
            .find(|&c| !c.is_ascii_alphanumeric() && !BCHARS_SPECIAL.contains(c))
        {
            return Err(BoundaryError::InvalidChar { ch });
        }

        if value.ends_with(' ') {
            return Err(BoundaryError::TrailingSpace);
        }

        Ok(Self { value, token_start: 0 })
    }

    /// The full boundary value, as it appears in the `Content-Type` header
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The random part of a generated boundary (the whole value for custom ones)
    pub fn token(&self) -> &str {
        &self.value[self.token_start..]
    }

    /// Delimiter line that opens each part: `--<boundary>`
    pub fn delimiter(&self) -> String {
        format!("--{}", self.value)
    }

    /// Delimiter that closes the body: `--<boundary>--`
    pub fn close_delimiter(&self) -> String {
        format!("--{}--", self.value)
    }

    /// Whether the opening delimiter appears anywhere in `data`
    pub fn occurs_in(&self, data: &[u8]) -> bool {
        let needle = self.delimiter();
        let needle = needle.as_bytes();
        data.len() >= needle.len() && data.windows(needle.len()).any(|w| w == needle)
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for Boundary {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_token_shape() {
        let boundary = Boundary::generate();
        assert!(boundary.as_str().starts_with(BOUNDARY_PREFIX));
        assert_eq!(boundary.token().len(), BOUNDARY_TOKEN_LEN);
        assert!(boundary.token().bytes().all(|b| BOUNDARY_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generated_boundary_is_valid_rfc2046() {
        let boundary = Boundary::generate();
        assert!(Boundary::new(boundary.as_str()).is_ok());
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = Boundary::generate_with(&mut StdRng::seed_from_u64(7));
        let b = Boundary::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_consecutive_boundaries_differ() {
        let a = Boundary::generate();
        let b = Boundary::generate();
        assert_ne!(a.token(), b.token());
    }

    #[test]
    fn test_alphabet_coverage() {
        // 62 symbols over many draws should all show up eventually
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.extend(Boundary::generate_with(&mut rng).token().bytes());
        }
        assert_eq!(BOUNDARY_ALPHABET.len(), 62);
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn test_delimiters() {
        let boundary = Boundary::new("abcd").unwrap();
        assert_eq!(boundary.delimiter(), "--abcd");
        assert_eq!(boundary.close_delimiter(), "--abcd--");
        assert_eq!(boundary.token(), "abcd");
        assert_eq!(boundary.to_string(), "abcd");
    }

    #[test]
    fn test_custom_boundary_validation() {
        assert_eq!(Boundary::new(""), Err(BoundaryError::Empty));
        assert_eq!(
            Boundary::new("a".repeat(71)),
            Err(BoundaryError::TooLong { len: 71 })
        );
        assert_eq!(
            Boundary::new("bad\"quote"),
            Err(BoundaryError::InvalidChar { ch: '"' })
        );
        assert_eq!(Boundary::new("ends "), Err(BoundaryError::TrailingSpace));
        assert!(Boundary::new("----WebKitFormBoundary7MA4YWxkTrZu0gW").is_ok());
        assert!(Boundary::new("a".repeat(70)).is_ok());
    }

    #[test]
    fn test_occurs_in() {
        let boundary = Boundary::new("xyz").unwrap();
        assert!(boundary.occurs_in(b"before--xyzafter"));
        assert!(!boundary.occurs_in(b"xyz without dashes"));
        assert!(!boundary.occurs_in(b""));
    }
}
