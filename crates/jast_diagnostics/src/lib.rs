//! jast_diagnostics: Diagnostic messages and error types.
//!
//! The lexer reports [`LexError`], the parser reports [`SyntaxError`], and the
//! public entry points return the union [`ParseError`]. Message texts are kept
//! in one catalogue (`messages`) so both stages phrase things consistently.

use jast_core::Position;
use miette::Diagnostic;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which stage of the pipeline produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCategory {
    Lexical,
    Syntax,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Lexical => write!(f, "lexical"),
            DiagnosticCategory::Syntax => write!(f, "syntax"),
        }
    }
}

/// A message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// Stable numeric code.
    pub code: u32,
    pub category: DiagnosticCategory,
    /// The template text. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

impl DiagnosticMessage {
    /// Render the template with `args`.
    pub fn format(&self, args: &[&str]) -> String {
        format_message(self.message, args)
    }
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A lexical error: an unrecognised character, a bad escape, or an
/// unterminated literal or comment.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic, Serialize)]
#[error("{message} at \"{snippet}\", line {line}: {line_text}")]
#[diagnostic(code(jast::lex))]
pub struct LexError {
    pub message: String,
    /// The offending source text.
    pub snippet: String,
    /// 1-based line number.
    pub line: u32,
    /// The whole source line containing the error.
    pub line_text: String,
}

impl LexError {
    pub fn new(message: &DiagnosticMessage, snippet: impl Into<String>, line: u32, line_text: impl Into<String>) -> Self {
        Self {
            message: message.format(&[]),
            snippet: snippet.into(),
            line,
            line_text: line_text.into(),
        }
    }
}

/// A syntax error raised by a parser production.
///
/// Inside a speculative region this only means "try the next alternative";
/// it becomes fatal when it reaches a caller that has no alternative left.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic, Serialize)]
#[error("{description} at \"{token}\" ({position})")]
#[diagnostic(code(jast::syntax))]
pub struct SyntaxError {
    pub description: String,
    /// Raw text of the offending token.
    pub token: String,
    pub position: Position,
}

impl SyntaxError {
    pub fn new(description: impl Into<String>, token: impl Into<String>, position: Position) -> Self {
        Self {
            description: description.into(),
            token: token.into(),
            position,
        }
    }
}

/// Error returned by the public parsing entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ParseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    pub fn category(&self) -> DiagnosticCategory {
        match self {
            ParseError::Lex(_) => DiagnosticCategory::Lexical,
            ParseError::Syntax(_) => DiagnosticCategory::Syntax,
        }
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Lexical, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Lexical, message: $msg }
        };
        ($code:expr, Syntax, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Syntax, message: $msg }
        };
    }

    // Lexer
    pub const COULD_NOT_PROCESS_TOKEN: DiagnosticMessage = diag!(1001, Lexical, "Could not process token");
    pub const UNTERMINATED_LITERAL: DiagnosticMessage =
        diag!(1002, Lexical, "Unterminated character/string literal");
    pub const ILLEGAL_ESCAPE_CHARACTER: DiagnosticMessage = diag!(1003, Lexical, "Illegal escape character");
    pub const EXPECTED_END_OF_BLOCK_COMMENT: DiagnosticMessage =
        diag!(1004, Lexical, "Expected end of block comment");
    pub const INVALID_UNICODE_ESCAPE: DiagnosticMessage = diag!(1005, Lexical, "Invalid unicode escape");

    // Parser
    pub const EXPECTED_0: DiagnosticMessage = diag!(2001, Syntax, "Expected '{0}'");
    pub const EXPECTED_CLASS_0: DiagnosticMessage = diag!(2002, Syntax, "Expected {0}");
    pub const EXPECTED_EXPRESSION: DiagnosticMessage = diag!(2003, Syntax, "Expected expression");
    pub const EXPECTED_TYPE: DiagnosticMessage = diag!(2004, Syntax, "Expected type");
    pub const EXPECTED_TYPE_DECLARATION: DiagnosticMessage = diag!(2005, Syntax, "Expected type declaration");
    pub const EXPECTED_SELECTOR: DiagnosticMessage = diag!(2006, Syntax, "Expected selector");
    pub const EXPECTED_CATCH_OR_FINALLY: DiagnosticMessage = diag!(2007, Syntax, "Expected catch/finally block");
    pub const EXPECTED_SWITCH_CASE: DiagnosticMessage = diag!(2008, Syntax, "Expected switch case");
    pub const ILLEGAL_LAMBDA_PARAMETER: DiagnosticMessage = diag!(2009, Syntax, "Illegal lambda parameter");
    pub const ARRAY_CREATOR_WITH_TYPE_ARGUMENTS: DiagnosticMessage = diag!(
        2010,
        Syntax,
        "Array creator not allowed with generic constructor type arguments"
    );
    pub const UNEXPECTED_END_OF_INPUT: DiagnosticMessage = diag!(2011, Syntax, "Unexpected end of input");
    pub const MAXIMUM_NESTING_DEPTH_EXCEEDED: DiagnosticMessage =
        diag!(2012, Syntax, "Maximum nesting depth exceeded");
    pub const EXPECTED_FORMAL_PARAMETER: DiagnosticMessage = diag!(2013, Syntax, "Expected formal parameter");
    pub const EXPECTED_ARRAY_DIMENSION: DiagnosticMessage =
        diag!(2014, Syntax, "Expected array dimension or initializer");
    pub const UNEXPECTED_TRAILING_INPUT: DiagnosticMessage = diag!(2015, Syntax, "Unexpected trailing input");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(messages::EXPECTED_0.format(&[";"]), "Expected ';'");
        assert_eq!(format_message("{0} and {1}", &["a", "b"]), "a and b");
    }

    #[test]
    fn test_lex_error_display() {
        let err = LexError::new(&messages::COULD_NOT_PROCESS_TOKEN, "#", 3, "int # x;");
        assert_eq!(err.to_string(), "Could not process token at \"#\", line 3: int # x;");
    }

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError::new("Expected ';'", "}", Position::new(2, 7));
        assert_eq!(err.to_string(), "Expected ';' at \"}\" (line 2, column 7)");
    }

    #[test]
    fn test_parse_error_from() {
        let err: ParseError = SyntaxError::new("Expected type", "1", Position::new(1, 1)).into();
        assert_eq!(err.category(), DiagnosticCategory::Syntax);
        assert_eq!(err.to_string(), "Expected type at \"1\" (line 1, column 1)");
    }

    #[test]
    fn test_codes_are_unique() {
        let all = [
            &messages::COULD_NOT_PROCESS_TOKEN,
            &messages::UNTERMINATED_LITERAL,
            &messages::ILLEGAL_ESCAPE_CHARACTER,
            &messages::EXPECTED_END_OF_BLOCK_COMMENT,
            &messages::INVALID_UNICODE_ESCAPE,
            &messages::EXPECTED_0,
            &messages::EXPECTED_CLASS_0,
            &messages::EXPECTED_EXPRESSION,
            &messages::EXPECTED_TYPE,
            &messages::EXPECTED_TYPE_DECLARATION,
            &messages::EXPECTED_SELECTOR,
            &messages::EXPECTED_CATCH_OR_FINALLY,
            &messages::EXPECTED_SWITCH_CASE,
            &messages::ILLEGAL_LAMBDA_PARAMETER,
            &messages::ARRAY_CREATOR_WITH_TYPE_ARGUMENTS,
            &messages::UNEXPECTED_END_OF_INPUT,
            &messages::MAXIMUM_NESTING_DEPTH_EXCEEDED,
            &messages::EXPECTED_FORMAL_PARAMETER,
            &messages::EXPECTED_ARRAY_DIMENSION,
            &messages::UNEXPECTED_TRAILING_INPUT,
        ];
        let mut codes: Vec<u32> = all.iter().map(|m| m.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
