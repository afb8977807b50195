//! Byte classification shared by the occurrence and frequency paths.
//!
//! Classification is ASCII only; any byte >= 0x80 is a separator.

/// Returns true for bytes that form words when matching a target word
#[inline]
pub fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

/// Returns true for bytes that extend a frequency token.
///
/// Tokens additionally keep `_` and `-`, so `well-known` and `snake_case`
/// are counted as single words.
#[inline]
pub fn is_token_byte(b: u8) -> bool {
    is_word_byte(b) || b == b'_' || b == b'-'
}
