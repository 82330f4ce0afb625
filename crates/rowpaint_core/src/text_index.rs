//! Conversions between the display model's UTF-16 column space and the
//! byte/char offsets used by text shapers.
//!
//! Columns count UTF-16 code units: a codepoint outside the basic
//! multilingual plane occupies two columns. Shapers address UTF-8 bytes
//! (or chars), so every column crossing the shaping boundary goes through
//! these helpers.

/// Number of UTF-16 code units in `text`.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Convert a UTF-16 column into a UTF-8 byte offset.
///
/// A column that falls inside a surrogate pair snaps forward to the end of
/// that codepoint. Columns past the end clamp to `text.len()`.
pub fn column_to_byte(text: &str, column: usize) -> usize {
    let mut remaining = column;
    for (byte, ch) in text.char_indices() {
        if remaining == 0 {
            return byte;
        }
        remaining = remaining.saturating_sub(ch.len_utf16());
    }
    text.len()
}

/// Convert a UTF-8 byte offset into a UTF-16 column.
///
/// `byte` is clamped to the text; an offset inside a multi-byte sequence
/// counts the codepoint it interrupts as already passed.
pub fn byte_to_column(text: &str, byte: usize) -> usize {
    text.char_indices()
        .take_while(|(start, _)| *start < byte)
        .map(|(_, ch)| ch.len_utf16())
        .sum()
}

/// Convert a UTF-16 column into a char (codepoint) index.
pub fn column_to_char(text: &str, column: usize) -> usize {
    let mut remaining = column;
    for (index, ch) in text.chars().enumerate() {
        if remaining == 0 {
            return index;
        }
        remaining = remaining.saturating_sub(ch.len_utf16());
    }
    text.chars().count()
}

/// Convert a char (codepoint) index into a UTF-16 column.
pub fn char_to_column(text: &str, char_index: usize) -> usize {
    text.chars().take(char_index).map(char::len_utf16).sum()
}

/// Convert a char index into a byte offset, clamped to `text.len()`.
pub fn char_to_byte(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Apply a shaper hit-test result to produce a column.
///
/// `byte` is the start of the glyph under the pointer and `trailing` is the
/// number of codepoints to skip when the pointer sits past the glyph's
/// visual midpoint.
///
/// # Returns
/// The UTF-16 column of the resolved character boundary.
pub fn resolve_hit(text: &str, byte: usize, trailing: usize) -> usize {
    let mut byte = floor_char_boundary(text, byte);
    for _ in 0..trailing {
        match text[byte..].chars().next() {
            Some(ch) => byte += ch.len_utf8(),
            None => break,
        }
    }
    byte_to_column(text, byte)
}

fn floor_char_boundary(text: &str, byte: usize) -> usize {
    let mut byte = byte.min(text.len());
    while !text.is_char_boundary(byte) {
        byte -= 1;
    }
    byte
}
