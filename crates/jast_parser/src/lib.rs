//! jast_parser: Recursive descent parser for Java source.
//!
//! Parses the token stream produced by `jast_scanner` into the typed tree
//! defined in `jast_ast`. The functions in this module are the public entry
//! points; each scans its input, runs one production and checks that all
//! input was consumed.

mod expressions;
mod options;
mod parser;
mod precedence;
mod statements;
mod types;
mod utilities;

pub use options::ParseOptions;
pub use parser::{PResult, Parser, MAX_RECURSION_DEPTH};
pub use precedence::{get_binary_operator_precedence, OperatorPrecedence};

use jast_ast::{BodyDeclaration, CompilationUnit, Expression, Type, TypeDeclaration};
use jast_diagnostics::{LexError, ParseError};
use jast_scanner::tokenize;

/// A parsed tree plus the lexical errors skipped under `ignore_errors`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput<T> {
    pub tree: T,
    pub lex_errors: Vec<LexError>,
}

fn run<T>(
    source: &str,
    options: &ParseOptions,
    production: impl FnOnce(&mut Parser) -> PResult<T>,
) -> Result<ParseOutput<T>, ParseError> {
    let tokenized = tokenize(source, options.ignore_errors)?;
    tracing::debug!(
        tokens = tokenized.tokens.len(),
        lex_errors = tokenized.errors.len(),
        "scanned source"
    );
    let mut parser = Parser::new(tokenized.tokens, tokenized.end, *options);
    let tree = production(&mut parser)?;
    Ok(ParseOutput {
        tree,
        lex_errors: tokenized.errors,
    })
}

/// `source` without one trailing `;`, ignoring trailing whitespace.
fn strip_semicolon(source: &str) -> &str {
    let trimmed = source.trim_end();
    trimmed.strip_suffix(';').unwrap_or(trimmed)
}

/// Parse a complete compilation unit.
pub fn parse(source: &str, options: &ParseOptions) -> Result<ParseOutput<CompilationUnit>, ParseError> {
    run(source, options, |p| {
        let unit = p.parse_compilation_unit()?;
        p.expect_end()?;
        Ok(unit)
    })
}

/// Parse a single expression. A trailing `;` is optional.
pub fn parse_expression(source: &str, options: &ParseOptions) -> Result<ParseOutput<Expression>, ParseError> {
    run(source, options, |p| {
        let expression = p.parse_expression()?;
        p.eat(";");
        p.expect_end()?;
        Ok(expression)
    })
}

/// Parse a field or method signature such as `public int size()`.
pub fn parse_member_signature(source: &str, options: &ParseOptions) -> Result<ParseOutput<BodyDeclaration>, ParseError> {
    let source = format!("{};", strip_semicolon(source));
    run(&source, options, |p| {
        let member = p.parse_member_declaration()?;
        p.expect_end()?;
        Ok(member)
    })
}

/// Parse a constructor signature such as `public Foo(int x)`. The body is
/// supplied as `{ }`.
pub fn parse_constructor_signature(
    source: &str,
    options: &ParseOptions,
) -> Result<ParseOutput<BodyDeclaration>, ParseError> {
    let source = format!("{} {{ }}", strip_semicolon(source));
    run(&source, options, |p| {
        let member = p.parse_member_declaration()?;
        p.expect_end()?;
        Ok(member)
    })
}

/// Parse a type such as `Map<String, int[]>[]`.
pub fn parse_type(source: &str, options: &ParseOptions) -> Result<ParseOutput<Type>, ParseError> {
    run(source, options, |p| {
        let parsed = p.parse_type()?;
        p.expect_end()?;
        Ok(parsed)
    })
}

/// Parse a class or interface header such as
/// `public class Foo<T> extends Bar implements Baz`. The body is supplied as
/// `{ }`.
pub fn parse_type_signature(source: &str, options: &ParseOptions) -> Result<ParseOutput<TypeDeclaration>, ParseError> {
    let source = format!("{} {{ }}", strip_semicolon(source));
    run(&source, options, |p| {
        let declaration = p.parse_class_or_interface_declaration()?;
        p.expect_end()?;
        Ok(declaration)
    })
}
