//! Character tables and the per-request sampling universe.

/// Lowercase ASCII letters.
pub const LOWERCASE: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Uppercase ASCII letters.
pub const UPPERCASE: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Digits counted towards the minimum digit requirement.
pub const DIGITS: &[u8; 10] = b"0123456789";

/// Symbols counted towards the minimum symbol requirement.
///
/// The order is fixed and the apostrophe appears twice, so it is drawn with
/// double weight whenever symbols are part of the universe.
pub const SYMBOLS: &[u8; 32] = b"!\"#$%&'()=~|-^\\`{*}<>?_@[;:],./'";

/// Counts the bytes of `password` that belong to `set`.
#[inline]
pub fn count_in(password: &[u8], set: &[u8]) -> usize {
    password.iter().filter(|b| set.contains(b)).count()
}

/// The ordered characters eligible for selection for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    chars: Vec<u8>,
}

impl Universe {
    /// Builds the universe for a password of `length` characters.
    ///
    /// `min_digits` and `min_symbols` are the raw request values: zero
    /// excludes the class entirely, a negative value includes it without a
    /// minimum. Letters are only included when the minimums leave room for
    /// filler characters, and a class is dropped when the other class must
    /// occupy every slot.
    pub fn new(length: i64, min_digits: i64, min_symbols: i64) -> Self {
        let nnc = min_digits.max(0);
        let nsc = min_symbols.max(0);

        let mut chars = Vec::with_capacity(
            LOWERCASE.len() + UPPERCASE.len() + DIGITS.len() + SYMBOLS.len(),
        );
        if length > nnc.saturating_add(nsc) {
            chars.extend_from_slice(LOWERCASE);
            chars.extend_from_slice(UPPERCASE);
        }
        if min_digits != 0 && nsc != length {
            chars.extend_from_slice(DIGITS);
        }
        if min_symbols != 0 && nnc != length {
            chars.extend_from_slice(SYMBOLS);
        }

        Self { chars }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, c: u8) -> bool {
        self.chars.contains(&c)
    }
}
