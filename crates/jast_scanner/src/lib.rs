//! jast_scanner: Lexer/tokenizer for Java source code.
//!
//! Produces classified tokens with positions and attached doc comments:
//! - Unicode escape resolution ahead of scanning
//! - Longest-match operators (`>>` is left to the parser)
//! - Decimal, hex, octal and binary numbers, including hex floats
//! - String and character literals with escape validation

mod char_codes;
mod scanner;
mod token;

pub use scanner::{resolve_unicode_escapes, tokenize, Lexer, Tokenized};
pub use token::{classify_word, is_operator, LiteralKind, Token, TokenKind, BASIC_TYPES, KEYWORDS, MODIFIERS};
