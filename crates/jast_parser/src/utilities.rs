//! Parser utility functions and token patterns.

use jast_scanner::{Token, TokenKind};

/// A pattern a single token may be matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pat {
    /// Exact token text.
    Value(&'static str),
    Identifier,
    BasicType,
    /// The `@` annotation marker.
    Annotation,
}

impl Pat {
    pub fn matches(self, token: &Token) -> bool {
        match self {
            Pat::Value(value) => !token.is_eof() && token.value == value,
            Pat::Identifier => token.kind == TokenKind::Identifier,
            Pat::BasicType => token.kind == TokenKind::BasicType,
            Pat::Annotation => token.kind == TokenKind::Annotation,
        }
    }

    /// Whether a mismatch should be reported as `Expected '<value>'` rather
    /// than `Expected <class>`.
    pub fn is_value(self) -> bool {
        matches!(self, Pat::Value(_))
    }

    pub fn describe(self) -> &'static str {
        match self {
            Pat::Value(value) => value,
            Pat::Identifier => "Identifier",
            Pat::BasicType => "BasicType",
            Pat::Annotation => "Annotation",
        }
    }
}

impl From<&'static str> for Pat {
    fn from(value: &'static str) -> Self {
        Pat::Value(value)
    }
}

pub const PREFIX_OPERATORS: &[&str] = &["++", "--", "!", "~", "+", "-"];

pub const POSTFIX_OPERATORS: &[&str] = &["++", "--"];

pub const ASSIGNMENT_OPERATORS: &[&str] = &["=", "+=", "-=", "*=", "/=", "&=", "|=", "^=", "%=", "<<=", ">>=", ">>>="];

pub const INFIX_OPERATORS: &[&str] = &[
    "||", "&&", "|", "^", "&", "==", "!=", "<", ">", "<=", ">=", "<<", ">>", ">>>", "+", "-", "*", "/", "%",
];

/// Operator tokens only; a `"+"` string literal never counts.
#[inline]
fn is_operator_in(token: &Token, set: &[&str]) -> bool {
    token.kind == TokenKind::Operator && set.contains(&token.value.as_str())
}

pub fn is_prefix_operator(token: &Token) -> bool {
    is_operator_in(token, PREFIX_OPERATORS)
}

pub fn is_postfix_operator(token: &Token) -> bool {
    is_operator_in(token, POSTFIX_OPERATORS)
}

pub fn is_assignment_operator(token: &Token) -> bool {
    is_operator_in(token, ASSIGNMENT_OPERATORS)
}

/// Check if a token continues a binary expression.
pub fn is_infix_operator(token: &Token) -> bool {
    is_operator_in(token, INFIX_OPERATORS) || (token.kind == TokenKind::Keyword && token.value == "instanceof")
}

/// Whether `second` starts right where `first` ends, with nothing between.
pub fn are_adjacent(first: &Token, second: &Token) -> bool {
    first.position.line == second.position.line
        && first.position.column + first.value.chars().count() as u32 == second.position.column
}

#[cfg(test)]
mod tests {
    use super::*;
    use jast_core::Position;
    use jast_scanner::LiteralKind;

    fn op(value: &str, column: u32) -> Token {
        Token::new(TokenKind::Operator, value, Position::new(1, column))
    }

    #[test]
    fn test_value_pattern_ignores_eof() {
        let eof = Token::end_of_input(Position::new(1, 1));
        assert!(!Pat::Value("").matches(&eof));
        assert!(Pat::Value(";").matches(&Token::new(TokenKind::Separator, ";", Position::new(1, 1))));
    }

    #[test]
    fn test_class_patterns() {
        let lit = Token::new(TokenKind::Literal(LiteralKind::String), "\"+\"", Position::new(1, 1));
        assert!(!Pat::Identifier.matches(&lit));
        assert!(!is_infix_operator(&lit));
        assert_eq!(Pat::Identifier.describe(), "Identifier");
    }

    #[test]
    fn test_adjacency() {
        assert!(are_adjacent(&op(">", 5), &op(">", 6)));
        assert!(!are_adjacent(&op(">", 5), &op(">", 7)));
    }
}
