//! Character classes used by the scanner.

use unicode_xid::UnicodeXID;

pub const BACKSLASH: char = '\\';
pub const DOUBLE_QUOTE: char = '"';
pub const SINGLE_QUOTE: char = '\'';
pub const AT: char = '@';
pub const DOT: char = '.';
pub const UNDERSCORE: char = '_';

/// Separator characters, each a token on its own.
pub const SEPARATORS: &[char] = &['(', ')', '{', '}', '[', ']', ';', ',', '.'];

/// Check if a character is whitespace between tokens.
#[inline]
pub fn is_white_space(ch: char) -> bool {
    ch.is_whitespace() || ch == '\u{FEFF}'
}

/// Check if a character is a decimal digit.
#[inline]
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Check if a character is an octal digit (0-7).
#[inline]
pub fn is_octal_digit(ch: char) -> bool {
    matches!(ch, '0'..='7')
}

/// Check if a character is a binary digit.
#[inline]
pub fn is_binary_digit(ch: char) -> bool {
    matches!(ch, '0' | '1')
}

/// Check if a character is a hex digit.
#[inline]
pub fn is_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

#[inline]
pub fn is_separator(ch: char) -> bool {
    SEPARATORS.contains(&ch)
}

/// Check if a character can start a Java identifier.
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_ascii_alphabetic() || (ch as u32 > 0x7F && ch.is_xid_start())
}

/// Check if a character can continue a Java identifier.
#[inline]
pub fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_ascii_alphanumeric() || (ch as u32 > 0x7F && ch.is_xid_continue())
}
