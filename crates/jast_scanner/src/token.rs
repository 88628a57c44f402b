//! Tokens produced by the scanner.

use jast_core::Position;
use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The flavour of a literal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    DecimalInteger,
    OctalInteger,
    BinaryInteger,
    HexInteger,
    DecimalFloatingPoint,
    HexFloatingPoint,
    Boolean,
    Character,
    String,
    Null,
}

impl LiteralKind {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            LiteralKind::DecimalInteger | LiteralKind::OctalInteger | LiteralKind::BinaryInteger | LiteralKind::HexInteger
        )
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, LiteralKind::DecimalFloatingPoint | LiteralKind::HexFloatingPoint)
    }
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Keyword,
    /// A keyword that is also a declaration modifier (`public`, `static`, ...).
    Modifier,
    /// A primitive type keyword (`int`, `boolean`, ...).
    BasicType,
    Literal(LiteralKind),
    Identifier,
    Operator,
    Separator,
    /// The `@` that introduces an annotation.
    Annotation,
    EndOfInput,
}

impl TokenKind {
    /// Modifiers and basic types are keywords too.
    pub fn is_keyword(self) -> bool {
        matches!(self, TokenKind::Keyword | TokenKind::Modifier | TokenKind::BasicType)
    }

    pub fn is_literal(self) -> bool {
        matches!(self, TokenKind::Literal(_))
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword => write!(f, "Keyword"),
            TokenKind::Modifier => write!(f, "Modifier"),
            TokenKind::BasicType => write!(f, "BasicType"),
            TokenKind::Literal(kind) => write!(f, "{:?}", kind),
            TokenKind::Identifier => write!(f, "Identifier"),
            TokenKind::Operator => write!(f, "Operator"),
            TokenKind::Separator => write!(f, "Separator"),
            TokenKind::Annotation => write!(f, "Annotation"),
            TokenKind::EndOfInput => write!(f, "EndOfInput"),
        }
    }
}

/// A classified lexical unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text of the token (after unicode escape resolution).
    pub value: String,
    pub position: Position,
    /// The `/** ... */` comment immediately preceding this token, if any.
    pub javadoc: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
            javadoc: None,
        }
    }

    /// The token reported once the input is exhausted.
    pub fn end_of_input(position: Position) -> Self {
        Self::new(TokenKind::EndOfInput, "", position)
    }

    #[inline]
    pub fn is(&self, value: &str) -> bool {
        self.value == value
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\" {}", self.kind, self.value, self.position)
    }
}

/// Every reserved word, including modifiers and basic types.
pub const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const", "continue",
    "default", "do", "double", "else", "enum", "extends", "final", "finally", "float", "for", "goto", "if",
    "implements", "import", "instanceof", "int", "interface", "long", "native", "new", "package", "private",
    "protected", "public", "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
    "throw", "throws", "transient", "try", "void", "volatile", "while",
];

pub const MODIFIERS: &[&str] = &[
    "abstract", "default", "final", "native", "private", "protected", "public", "static", "strictfp",
    "synchronized", "transient", "volatile",
];

pub const BASIC_TYPES: &[&str] = &["boolean", "byte", "char", "short", "int", "long", "float", "double"];

/// Operators grouped by length, longest first.
pub const OPERATORS_BY_LENGTH: &[&[&str]] = &[
    &[">>>="],
    &["...", "<<=", ">>="],
    &[
        "->", "::", "++", "--", "&&", "||", "==", "!=", "<=", ">=", "+=", "-=", "*=", "/=", "&=", "|=", "^=", "%=",
        "<<",
    ],
    &["=", ">", "<", "!", "~", "?", ":", "+", "-", "*", "/", "&", "|", "^", "%"],
];

lazy_static! {
    static ref WORD_KINDS: FxHashMap<&'static str, TokenKind> = {
        let mut map = FxHashMap::default();
        for &word in KEYWORDS {
            map.insert(word, TokenKind::Keyword);
        }
        for &word in MODIFIERS {
            map.insert(word, TokenKind::Modifier);
        }
        for &word in BASIC_TYPES {
            map.insert(word, TokenKind::BasicType);
        }
        map.insert("true", TokenKind::Literal(LiteralKind::Boolean));
        map.insert("false", TokenKind::Literal(LiteralKind::Boolean));
        map.insert("null", TokenKind::Literal(LiteralKind::Null));
        map
    };
}

/// Classify a scanned identifier-shaped word.
pub fn classify_word(word: &str) -> TokenKind {
    WORD_KINDS.get(word).copied().unwrap_or(TokenKind::Identifier)
}

/// Whether `value` is one of the known operators.
pub fn is_operator(value: &str) -> bool {
    OPERATORS_BY_LENGTH.iter().any(|bucket| bucket.contains(&value))
}
