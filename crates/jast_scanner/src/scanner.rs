//! The Java scanner/lexer.
//!
//! Converts source text into a stream of [`Token`]s. Unicode escapes are
//! resolved in a pre-pass over the whole text, since `\uXXXX` may appear
//! anywhere, including inside identifiers and operators. The scanner itself
//! is a lazy iterator: each call to `next` skips whitespace and comments and
//! classifies one token.

use crate::char_codes::*;
use crate::token::{classify_word, LiteralKind, Token, TokenKind, OPERATORS_BY_LENGTH};
use jast_core::text::{line_at, position_of};
use jast_core::Position;
use jast_diagnostics::{messages, DiagnosticMessage, LexError};
use memchr::{memchr, memchr_iter, memmem};
use std::borrow::Cow;
use std::iter::FusedIterator;

/// States of the string/character literal scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralState {
    Normal,
    Escape,
    /// After `\0`..`\3`: up to two more octal digits.
    OctalLong(u8),
    /// After `\4`..`\7`: up to one more octal digit.
    OctalShort,
}

/// The scanner converts Java source text into tokens.
pub struct Lexer {
    /// Source text with unicode escapes resolved.
    text: String,
    /// Current byte offset.
    pos: usize,
    /// Current 1-based line.
    line: u32,
    /// Byte offset where the current line starts.
    line_start: usize,
    /// Doc comment waiting to be attached to the next token.
    javadoc: Option<String>,
    ignore_errors: bool,
    /// Errors collected while `ignore_errors` is set.
    errors: Vec<LexError>,
    /// Error found during the escape pre-pass, reported on the first `next`.
    pending: Option<LexError>,
    finished: bool,
}

impl Lexer {
    /// Create a new lexer for the given source text.
    pub fn new(text: &str, ignore_errors: bool) -> Self {
        let mut errors = Vec::new();
        let (text, pending) = match resolve_unicode_escapes(text, ignore_errors, &mut errors) {
            Ok(resolved) => (resolved.into_owned(), None),
            Err(err) => (text.to_string(), Some(err)),
        };
        Self {
            text,
            pos: 0,
            line: 1,
            line_start: 0,
            javadoc: None,
            ignore_errors,
            errors,
            pending,
            finished: false,
        }
    }

    /// The text being scanned, after unicode escape resolution.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Errors collected so far (only populated when ignoring errors).
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    /// Position of the scanner cursor.
    pub fn position(&self) -> Position {
        self.position_at(self.pos)
    }

    fn position_at(&self, pos: usize) -> Position {
        let column = self.text[self.line_start..pos].chars().count() as u32 + 1;
        Position::new(self.line, column)
    }

    #[inline]
    fn byte(&self, at: usize) -> u8 {
        self.text.as_bytes().get(at).copied().unwrap_or(0)
    }

    #[inline]
    fn char_at(&self, at: usize) -> Option<char> {
        self.text.get(at..).and_then(|rest| rest.chars().next())
    }

    /// Record newlines in `text[from..to]`.
    fn advance_lines(&mut self, from: usize, to: usize) {
        for i in memchr_iter(b'\n', &self.text.as_bytes()[from..to]) {
            self.line += 1;
            self.line_start = from + i + 1;
        }
    }

    fn skip_white_space(&mut self) {
        let start = self.pos;
        let rest = &self.text[start..];
        let skipped = rest
            .char_indices()
            .find(|&(_, ch)| !is_white_space(ch))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += skipped;
        self.advance_lines(start, self.pos);
    }

    fn error_at(&self, message: &DiagnosticMessage, start: usize, end: usize) -> LexError {
        let end = end.min(self.text.len()).max(start);
        let line = position_of(&self.text, start).line;
        LexError::new(message, &self.text[start..end], line, line_at(&self.text, start))
    }

    /// Collect the error when ignoring errors, otherwise raise it.
    fn report(&mut self, err: LexError) -> Result<(), LexError> {
        if self.ignore_errors {
            tracing::debug!(error = %err, "lexical error ignored");
            self.errors.push(err);
            Ok(())
        } else {
            Err(err)
        }
    }

    /// Scan the next token, or `None` at end of input.
    fn scan(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            self.skip_white_space();
            let len = self.text.len();
            if self.pos >= len {
                return Ok(None);
            }

            let start = self.pos;
            let c0 = self.byte(start);
            let c1 = self.byte(start + 1);

            let kind = if c0 == b'/' && c1 == b'/' {
                let end = memchr(b'\n', &self.text.as_bytes()[start..]).map_or(len, |i| start + i);
                self.pos = end;
                continue;
            } else if c0 == b'/' && c1 == b'*' {
                self.scan_block_comment()?;
                continue;
            } else if c0 == b'.' && c1 == b'.' && self.byte(start + 2) == b'.' {
                self.pos = start + 3;
                TokenKind::Operator
            } else if c0 == AT as u8 {
                self.pos = start + 1;
                TokenKind::Annotation
            } else if c0 == DOT as u8 && c1.is_ascii_digit() {
                TokenKind::Literal(self.scan_decimal_float_fraction())
            } else if is_separator(c0 as char) {
                self.pos = start + 1;
                TokenKind::Separator
            } else if c0 == DOUBLE_QUOTE as u8 || c0 == SINGLE_QUOTE as u8 {
                match self.scan_quoted(c0)? {
                    Some(kind) => TokenKind::Literal(kind),
                    None => continue,
                }
            } else if c0.is_ascii_digit() {
                TokenKind::Literal(self.scan_number())
            } else if self.char_at(start).is_some_and(is_identifier_start) {
                self.scan_identifier();
                classify_word(&self.text[start..self.pos])
            } else if let Some(op) = self.match_operator() {
                self.pos = start + op.len();
                TokenKind::Operator
            } else {
                let width = self.char_at(start).map_or(1, char::len_utf8);
                let err = self.error_at(&messages::COULD_NOT_PROCESS_TOKEN, start, start + width);
                self.report(err)?;
                self.pos = start + width;
                continue;
            };

            let mut token = Token::new(kind, &self.text[start..self.pos], self.position_at(start));
            token.javadoc = self.javadoc.take();
            return Ok(Some(token));
        }
    }

    fn scan_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let len = self.text.len();
        match memmem::find(&self.text.as_bytes()[start + 2..], b"*/") {
            Some(i) => {
                let end = start + 2 + i + 2;
                let comment = &self.text[start..end];
                if comment.starts_with("/**") && comment != "/**/" {
                    self.javadoc = Some(comment.to_string());
                }
                self.pos = end;
                self.advance_lines(start, end);
                Ok(())
            }
            None => {
                let err = self.error_at(&messages::EXPECTED_END_OF_BLOCK_COMMENT, start, len);
                self.pos = len;
                self.advance_lines(start, len);
                self.report(err)
            }
        }
    }

    fn match_operator(&self) -> Option<&'static str> {
        let rest = &self.text[self.pos..];
        OPERATORS_BY_LENGTH
            .iter()
            .flat_map(|bucket| bucket.iter())
            .find(|op| rest.starts_with(**op))
            .copied()
    }

    fn scan_identifier(&mut self) {
        let rest = &self.text[self.pos..];
        let end = rest
            .char_indices()
            .skip(1)
            .find(|&(_, ch)| !is_identifier_part(ch))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
    }

    /// Scan a string or character literal starting at the opening quote.
    ///
    /// Returns `None` when an unterminated literal was skipped under
    /// `ignore_errors`.
    fn scan_quoted(&mut self, delimiter: u8) -> Result<Option<LiteralKind>, LexError> {
        let start = self.pos;
        let mut state = LiteralState::Normal;
        let mut i = start + 1;
        let len = self.text.len();

        while i < len {
            let c = self.byte(i);
            match state {
                LiteralState::Normal => {
                    if c == BACKSLASH as u8 {
                        state = LiteralState::Escape;
                    } else if c == delimiter {
                        self.pos = i + 1;
                        let kind = if delimiter == DOUBLE_QUOTE as u8 {
                            LiteralKind::String
                        } else {
                            LiteralKind::Character
                        };
                        return Ok(Some(kind));
                    }
                    i += 1;
                }
                LiteralState::Escape => {
                    state = match c {
                        b'b' | b't' | b'n' | b'f' | b'r' | b'u' | b'"' | b'\'' | b'\\' => LiteralState::Normal,
                        b'0'..=b'3' => LiteralState::OctalLong(2),
                        b'4'..=b'7' => LiteralState::OctalShort,
                        _ => {
                            let width = self.char_at(i).map_or(1, char::len_utf8);
                            let err = self.error_at(&messages::ILLEGAL_ESCAPE_CHARACTER, i - 1, i + width);
                            self.report(err)?;
                            LiteralState::Normal
                        }
                    };
                    i += 1;
                }
                LiteralState::OctalLong(remaining) => {
                    if is_octal_digit(c as char) {
                        i += 1;
                        state = if remaining > 1 {
                            LiteralState::OctalLong(remaining - 1)
                        } else {
                            LiteralState::Normal
                        };
                    } else {
                        state = LiteralState::Normal;
                    }
                }
                LiteralState::OctalShort => {
                    if is_octal_digit(c as char) {
                        i += 1;
                    }
                    state = LiteralState::Normal;
                }
            }
        }

        let err = self.error_at(&messages::UNTERMINATED_LITERAL, start, len);
        self.pos = len;
        self.advance_lines(start, len);
        self.report(err)?;
        Ok(None)
    }

    /// Consume a run of digits accepted by `is_digit`, allowing `_` after
    /// the first digit.
    fn scan_digits(&mut self, is_digit: fn(char) -> bool) -> usize {
        let start = self.pos;
        while self.pos < self.text.len() {
            let c = self.byte(self.pos) as char;
            if is_digit(c) || (c == UNDERSCORE && self.pos > start) {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.pos - start
    }

    fn scan_integer_suffix(&mut self) {
        if matches!(self.byte(self.pos), b'l' | b'L') {
            self.pos += 1;
        }
    }

    fn scan_float_suffix(&mut self) {
        if matches!(self.byte(self.pos), b'f' | b'F' | b'd' | b'D') {
            self.pos += 1;
        }
    }

    /// Optional exponent introduced by one of `markers`.
    fn scan_exponent(&mut self, markers: &[u8]) {
        if !markers.contains(&self.byte(self.pos)) {
            return;
        }
        self.pos += 1;
        if matches!(self.byte(self.pos), b'+' | b'-') {
            self.pos += 1;
        }
        self.scan_digits(is_digit);
    }

    fn scan_number(&mut self) -> LiteralKind {
        let c0 = self.byte(self.pos);
        let c1 = self.byte(self.pos + 1);
        if c0 == b'0' && matches!(c1, b'x' | b'X') {
            self.scan_hex_number()
        } else if c0 == b'0' && matches!(c1, b'b' | b'B') {
            self.pos += 2;
            self.scan_digits(is_binary_digit);
            self.scan_integer_suffix();
            LiteralKind::BinaryInteger
        } else if c0 == b'0' && is_octal_digit(c1 as char) {
            self.pos += 1;
            self.scan_digits(is_octal_digit);
            self.scan_integer_suffix();
            LiteralKind::OctalInteger
        } else {
            self.scan_decimal_number()
        }
    }

    fn scan_hex_number(&mut self) -> LiteralKind {
        let start = self.pos;
        self.pos += 2;
        self.scan_digits(is_hex_digit);
        if !matches!(self.byte(self.pos), b'.' | b'p' | b'P') {
            self.scan_integer_suffix();
            return LiteralKind::HexInteger;
        }

        // Hex float: rescan from the prefix with the fractional grammar.
        self.pos = start + 2;
        self.scan_digits(is_hex_digit);
        if self.byte(self.pos) == b'.' {
            self.pos += 1;
            self.scan_digits(is_hex_digit);
        }
        self.scan_exponent(b"pP");
        self.scan_float_suffix();
        LiteralKind::HexFloatingPoint
    }

    fn scan_decimal_number(&mut self) -> LiteralKind {
        self.scan_digits(is_digit);
        match self.byte(self.pos) {
            b'.' => {
                self.pos += 1;
                self.scan_digits(is_digit);
                self.scan_exponent(b"eE");
                self.scan_float_suffix();
                LiteralKind::DecimalFloatingPoint
            }
            b'e' | b'E' => {
                self.scan_exponent(b"eE");
                self.scan_float_suffix();
                LiteralKind::DecimalFloatingPoint
            }
            b'f' | b'F' | b'd' | b'D' => {
                self.pos += 1;
                LiteralKind::DecimalFloatingPoint
            }
            _ => {
                self.scan_integer_suffix();
                LiteralKind::DecimalInteger
            }
        }
    }

    /// A float that starts with `.`, such as `.5e3`.
    fn scan_decimal_float_fraction(&mut self) -> LiteralKind {
        self.pos += 1;
        self.scan_digits(is_digit);
        self.scan_exponent(b"eE");
        self.scan_float_suffix();
        LiteralKind::DecimalFloatingPoint
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some(err) = self.pending.take() {
            self.finished = true;
            return Some(Err(err));
        }
        match self.scan() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Lexer {}

/// A fully scanned token sequence.
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    /// Errors skipped over because `ignore_errors` was set.
    pub errors: Vec<LexError>,
    /// Position just past the last character of input.
    pub end: Position,
}

/// Scan all of `text`.
///
/// With `ignore_errors`, unprocessable characters are skipped and the errors
/// returned alongside the tokens; otherwise the first error is returned and
/// no tokens are.
pub fn tokenize(text: &str, ignore_errors: bool) -> Result<Tokenized, LexError> {
    let mut lexer = Lexer::new(text, ignore_errors);
    let mut tokens = Vec::new();
    for token in lexer.by_ref() {
        tokens.push(token?);
    }
    Ok(Tokenized {
        tokens,
        end: lexer.position(),
        errors: lexer.take_errors(),
    })
}

/// Replace `\uXXXX` escapes with the characters they denote.
///
/// A backslash is only eligible to start an escape when it is preceded by an
/// even number of backslashes, so `\\u0041` is left alone. Any number of `u`
/// markers may follow (`\uuu0041`). A high surrogate escape followed by a low
/// surrogate escape yields one supplementary character.
pub fn resolve_unicode_escapes<'a>(
    text: &'a str,
    ignore_errors: bool,
    errors: &mut Vec<LexError>,
) -> Result<Cow<'a, str>, LexError> {
    if memmem::find(text.as_bytes(), b"\\u").is_none() {
        return Ok(Cow::Borrowed(text));
    }

    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut out = String::with_capacity(len);
    let mut copied = 0;
    let mut i = 0;

    while i < len {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < len && bytes[i] == b'\\' {
            i += 1;
        }
        if (i - run_start) % 2 == 0 || i >= len || bytes[i] != b'u' {
            continue;
        }

        let escape_start = i - 1;
        let (decoded, end) = decode_escape(bytes, escape_start);
        match decoded.and_then(|code| {
            if (0xD800..0xDC00).contains(&code) {
                let (low, low_end) = decode_escape(bytes, end);
                match low {
                    Some(low) if (0xDC00..0xE000).contains(&low) => {
                        let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                        char::from_u32(combined).map(|ch| (ch, low_end))
                    }
                    _ => None,
                }
            } else {
                char::from_u32(code).map(|ch| (ch, end))
            }
        }) {
            Some((ch, end)) => {
                out.push_str(&text[copied..escape_start]);
                out.push(ch);
                copied = end;
                i = end;
            }
            None => {
                let snippet_end = end.min(len);
                let err = LexError::new(
                    &messages::INVALID_UNICODE_ESCAPE,
                    &text[escape_start..snippet_end],
                    position_of(text, escape_start).line,
                    line_at(text, escape_start),
                );
                if !ignore_errors {
                    return Err(err);
                }
                errors.push(err);
                i = snippet_end.max(escape_start + 2);
            }
        }
    }

    out.push_str(&text[copied..]);
    Ok(Cow::Owned(out))
}

/// Decode one `\u+XXXX` escape starting at `at`.
///
/// Returns the code unit (if well formed) and the offset just past the
/// scanned text. The end offset always lands on an ASCII boundary.
fn decode_escape(bytes: &[u8], at: usize) -> (Option<u32>, usize) {
    let len = bytes.len();
    if at + 1 >= len || bytes[at] != b'\\' || bytes[at + 1] != b'u' {
        return (None, at);
    }
    let mut i = at + 1;
    while i < len && bytes[i] == b'u' {
        i += 1;
    }
    let digits_end = (i + 4).min(len);
    let mut end = i;
    while end < digits_end && bytes[end].is_ascii_hexdigit() {
        end += 1;
    }
    if end - i < 4 {
        return (None, end);
    }
    let code = bytes[i..end]
        .iter()
        .fold(0u32, |acc, &b| acc * 16 + (b as char).to_digit(16).unwrap_or(0));
    (Some(code), end)
}
