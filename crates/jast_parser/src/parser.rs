//! Recursive-descent parser for Java source.
//!
//! The parser pulls tokens through a [`LookAheadBuffer`]. Most productions
//! decide on a fixed amount of lookahead; where the grammar is ambiguous
//! (local variable vs. statement, lambda vs. cast vs. parenthesised
//! expression, enhanced vs. classic `for`) a speculative region is opened
//! with [`Parser::speculate`] and rewound on failure.
//!
//! Productions are split across this module (infrastructure, compilation
//! units and declarations), `types`, `statements` and `expressions`.

use crate::options::ParseOptions;
use crate::utilities::Pat;
use jast_ast::*;
use jast_core::{LookAheadBuffer, Position};
use jast_diagnostics::{messages, DiagnosticMessage, SyntaxError};
use jast_scanner::{Token, TokenKind};

/// Result of a single production.
pub type PResult<T> = Result<T, SyntaxError>;

/// Maximum nesting of expressions, types and statements before parsing is
/// abandoned.
pub const MAX_RECURSION_DEPTH: usize = 200;

const TRACE_TARGET: &str = "jast_parser::trace";

/// Modifiers, annotations and doc comment collected ahead of a declaration.
#[derive(Debug, Default)]
pub(crate) struct Header {
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub documentation: Option<String>,
}

/// Java parser over a materialised token list.
pub struct Parser {
    pub(crate) tokens: LookAheadBuffer<std::vec::IntoIter<Token>>,
    options: ParseOptions,
    /// Open productions, for the debug trace.
    depth: usize,
    /// Open expressions, types and statements.
    nesting: usize,
}

impl Parser {
    /// Create a parser. `end` is the position reported for the end of input.
    pub fn new(tokens: Vec<Token>, end: Position, options: ParseOptions) -> Self {
        Self {
            tokens: LookAheadBuffer::new(tokens.into_iter(), Token::end_of_input(end)),
            options,
            depth: 0,
            nesting: 0,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    // ========================================================================
    // Token cursor
    // ========================================================================

    #[inline]
    pub(crate) fn look(&mut self, k: usize) -> &Token {
        self.tokens.look(k)
    }

    #[inline]
    pub(crate) fn position(&mut self) -> Position {
        self.look(0).position
    }

    pub(crate) fn at_end(&mut self) -> bool {
        self.look(0).is_eof()
    }

    /// Whether token `k` has the text `value`.
    pub(crate) fn is_at(&mut self, k: usize, value: &str) -> bool {
        let token = self.look(k);
        !token.is_eof() && token.is(value)
    }

    #[inline]
    pub(crate) fn is(&mut self, value: &str) -> bool {
        self.is_at(0, value)
    }

    pub(crate) fn kind_at(&mut self, k: usize) -> TokenKind {
        self.look(k).kind
    }

    /// Consume the next token. At the end of input the end token is
    /// returned and nothing is consumed.
    pub(crate) fn advance(&mut self) -> Token {
        match self.tokens.next() {
            Some(token) => token,
            None => self.tokens.default_value().clone(),
        }
    }

    /// Whether the upcoming tokens match `pats`, without consuming anything.
    pub(crate) fn would_accept(&mut self, pats: &[Pat]) -> bool {
        pats.iter().enumerate().all(|(i, pat)| pat.matches(self.tokens.look(i)))
    }

    /// Consume the upcoming tokens if they match `pats`.
    pub(crate) fn try_accept(&mut self, pats: &[Pat]) -> bool {
        if !self.would_accept(pats) {
            return false;
        }
        for _ in pats {
            self.advance();
        }
        true
    }

    #[inline]
    pub(crate) fn eat(&mut self, value: &'static str) -> bool {
        self.try_accept(&[Pat::Value(value)])
    }

    /// Consume tokens matching `pats` one by one, failing on the first
    /// mismatch. Returns the text of the last token.
    pub(crate) fn accept(&mut self, pats: &[Pat]) -> PResult<String> {
        let mut last = String::new();
        for &pat in pats {
            if !pat.matches(self.look(0)) {
                return Err(self.expected(pat));
            }
            last = self.advance().value;
        }
        Ok(last)
    }

    #[inline]
    pub(crate) fn expect(&mut self, value: &'static str) -> PResult<String> {
        self.accept(&[Pat::Value(value)])
    }

    pub(crate) fn parse_identifier(&mut self) -> PResult<String> {
        self.accept(&[Pat::Identifier])
    }

    // ========================================================================
    // Errors
    // ========================================================================

    /// An error located at the next token.
    pub(crate) fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) -> SyntaxError {
        let token = self.look(0);
        SyntaxError::new(message.format(args), token.value.clone(), token.position)
    }

    /// Like [`Parser::error`], but reports running out of input as such.
    pub(crate) fn illegal(&mut self, message: &DiagnosticMessage) -> SyntaxError {
        if self.at_end() {
            self.error(&messages::UNEXPECTED_END_OF_INPUT, &[])
        } else {
            self.error(message, &[])
        }
    }

    fn expected(&mut self, pat: Pat) -> SyntaxError {
        if pat.is_value() {
            self.error(&messages::EXPECTED_0, &[pat.describe()])
        } else if self.at_end() {
            self.error(&messages::UNEXPECTED_END_OF_INPUT, &[])
        } else {
            self.error(&messages::EXPECTED_CLASS_0, &[pat.describe()])
        }
    }

    /// Fail unless every token has been consumed.
    pub(crate) fn expect_end(&mut self) -> PResult<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error(&messages::UNEXPECTED_TRAILING_INPUT, &[]))
        }
    }

    // ========================================================================
    // Speculation and tracing
    // ========================================================================

    /// Run `f` inside a marker. Tokens are kept on success and rewound on
    /// failure.
    pub(crate) fn speculate<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let (depth, nesting) = (self.depth, self.nesting);
        self.tokens.push_marker();
        let result = f(self);
        self.tokens.pop_marker(result.is_err());
        if let Err(err) = &result {
            self.depth = depth;
            self.nesting = nesting;
            tracing::trace!(target: TRACE_TARGET, error = %err, "rewound speculative parse");
        }
        result
    }

    /// Run a production that can contain itself (expression, type or
    /// statement), failing once [`MAX_RECURSION_DEPTH`] of them are open.
    pub(crate) fn nested<T>(&mut self, production: &'static str, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.nesting >= MAX_RECURSION_DEPTH {
            return Err(self.error(&messages::MAXIMUM_NESTING_DEPTH_EXCEEDED, &[]));
        }
        self.nesting += 1;
        let result = self.traced(production, f);
        self.nesting -= 1;
        result
    }

    /// Run a named production, emitting the debug trace when enabled.
    pub(crate) fn traced<T>(&mut self, production: &'static str, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.depth += 1;

        let start = if self.options.debug {
            let start = self.look(0).clone();
            tracing::debug!(
                target: TRACE_TARGET,
                "{:02} {}> {}({})",
                self.depth,
                "-".repeat(self.depth),
                production,
                start
            );
            Some(start)
        } else {
            None
        };

        let result = f(self);

        if let Some(start) = start {
            let last = self.tokens.last_consumed().map(|t| t.to_string()).unwrap_or_default();
            let error = result.as_ref().err().map(|e| e.to_string()).unwrap_or_default();
            tracing::debug!(
                target: TRACE_TARGET,
                "{:02} <{} {}({}, {}) {}",
                self.depth,
                "-".repeat(self.depth),
                production,
                start,
                last,
                error
            );
        }

        self.depth -= 1;
        result
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    pub(crate) fn parse_qualified_identifier(&mut self) -> PResult<String> {
        let mut parts = vec![self.parse_identifier()?];
        while self.would_accept(&[Pat::Value("."), Pat::Identifier]) {
            self.advance();
            parts.push(self.parse_identifier()?);
        }
        Ok(parts.join("."))
    }

    pub(crate) fn parse_qualified_identifier_list(&mut self) -> PResult<Vec<String>> {
        let mut names = Vec::new();
        loop {
            names.push(self.parse_qualified_identifier()?);
            if !self.eat(",") {
                return Ok(names);
            }
        }
    }

    // ========================================================================
    // Compilation unit
    // ========================================================================

    pub fn parse_compilation_unit(&mut self) -> PResult<CompilationUnit> {
        self.traced("compilation_unit", |p| {
            let position = p.position();
            let package = p.parse_package_declaration()?;

            let mut imports = Vec::new();
            while p.is("import") {
                imports.push(p.parse_import_declaration()?);
            }

            let mut types = Vec::new();
            while !p.at_end() {
                if let Some(declaration) = p.parse_type_declaration()? {
                    types.push(declaration);
                }
            }

            Ok(CompilationUnit {
                package,
                imports,
                types,
                position: Some(position),
            })
        })
    }

    /// Annotations at the top of a file belong to the package only when a
    /// `package` keyword follows them; otherwise they are left for the first
    /// type declaration.
    fn parse_package_declaration(&mut self) -> PResult<Option<PackageDeclaration>> {
        self.tokens.push_marker();
        let documentation = self.look(0).javadoc.clone();
        let annotations = if self.is_annotation(0) {
            self.parse_annotations()
        } else {
            Ok(Vec::new())
        };

        let annotations = match annotations {
            Ok(annotations) if self.is("package") => {
                self.tokens.pop_marker(false);
                annotations
            }
            _ => {
                self.tokens.pop_marker(true);
                return Ok(None);
            }
        };

        self.traced("package_declaration", |p| {
            p.expect("package")?;
            let position = p.position();
            let name = p.parse_qualified_identifier()?;
            p.expect(";")?;
            Ok(Some(PackageDeclaration {
                modifiers: Modifiers::empty(),
                annotations,
                documentation,
                name,
                position: Some(position),
            }))
        })
    }

    fn parse_import_declaration(&mut self) -> PResult<Import> {
        self.traced("import_declaration", |p| {
            let position = p.position();
            p.expect("import")?;
            let r#static = p.eat("static");
            let mut path = vec![p.parse_identifier()?];
            let mut wildcard = false;
            while p.eat(".") {
                if p.eat("*") {
                    wildcard = true;
                    break;
                }
                path.push(p.parse_identifier()?);
            }
            p.expect(";")?;
            Ok(Import {
                path: path.join("."),
                r#static,
                wildcard,
                position: Some(position),
            })
        })
    }

    fn parse_type_declaration(&mut self) -> PResult<Option<TypeDeclaration>> {
        if self.eat(";") {
            return Ok(None);
        }
        self.parse_class_or_interface_declaration().map(Some)
    }

    pub fn parse_class_or_interface_declaration(&mut self) -> PResult<TypeDeclaration> {
        self.traced("class_or_interface_declaration", |p| {
            let header = p.parse_modifiers()?;
            p.parse_type_declaration_rest(header)?
                .ok_or_else(|| p.illegal(&messages::EXPECTED_TYPE_DECLARATION))
        })
    }

    /// A class, enum, interface or annotation type after its modifiers, or
    /// `None` if the next token starts none of them.
    pub(crate) fn parse_type_declaration_rest(&mut self, header: Header) -> PResult<Option<TypeDeclaration>> {
        let declaration: TypeDeclaration = if self.is("class") {
            self.parse_normal_class_declaration(header)?.into()
        } else if self.is("enum") {
            self.parse_enum_declaration(header)?.into()
        } else if self.is("interface") {
            self.parse_normal_interface_declaration(header)?.into()
        } else if self.is_annotation_declaration(0) {
            self.parse_annotation_type_declaration(header)?.into()
        } else {
            return Ok(None);
        };
        Ok(Some(declaration))
    }

    fn parse_normal_class_declaration(&mut self, header: Header) -> PResult<ClassDeclaration> {
        self.traced("normal_class_declaration", |p| {
            let position = p.position();
            p.expect("class")?;
            let name = p.parse_identifier()?;
            let type_parameters = if p.is("<") { p.parse_type_parameters()? } else { Vec::new() };
            let extends = if p.eat("extends") { Some(p.parse_reference_type()?) } else { None };
            let implements = if p.eat("implements") { p.parse_reference_type_list()? } else { Vec::new() };
            let body = p.parse_class_body()?;
            Ok(ClassDeclaration {
                modifiers: header.modifiers,
                annotations: header.annotations,
                documentation: header.documentation,
                name,
                body,
                type_parameters,
                extends,
                implements,
                position: Some(position),
            })
        })
    }

    fn parse_enum_declaration(&mut self, header: Header) -> PResult<EnumDeclaration> {
        self.traced("enum_declaration", |p| {
            let position = p.position();
            p.expect("enum")?;
            let name = p.parse_identifier()?;
            let implements = if p.eat("implements") { p.parse_reference_type_list()? } else { Vec::new() };
            let body = p.parse_enum_body()?;
            Ok(EnumDeclaration {
                modifiers: header.modifiers,
                annotations: header.annotations,
                documentation: header.documentation,
                name,
                body,
                implements,
                position: Some(position),
            })
        })
    }

    fn parse_normal_interface_declaration(&mut self, header: Header) -> PResult<InterfaceDeclaration> {
        self.traced("normal_interface_declaration", |p| {
            let position = p.position();
            p.expect("interface")?;
            let name = p.parse_identifier()?;
            let type_parameters = if p.is("<") { p.parse_type_parameters()? } else { Vec::new() };
            let extends = if p.eat("extends") { p.parse_reference_type_list()? } else { Vec::new() };
            let body = p.parse_interface_body()?;
            Ok(InterfaceDeclaration {
                modifiers: header.modifiers,
                annotations: header.annotations,
                documentation: header.documentation,
                name,
                body,
                type_parameters,
                extends,
                position: Some(position),
            })
        })
    }

    fn parse_annotation_type_declaration(&mut self, header: Header) -> PResult<AnnotationDeclaration> {
        self.traced("annotation_type_declaration", |p| {
            let position = p.position();
            p.accept(&[Pat::Annotation, Pat::Value("interface")])?;
            let name = p.parse_identifier()?;
            let body = p.parse_annotation_type_body()?;
            Ok(AnnotationDeclaration {
                modifiers: header.modifiers,
                annotations: header.annotations,
                documentation: header.documentation,
                name,
                body,
                position: Some(position),
            })
        })
    }

    // ========================================================================
    // Annotations and modifiers
    // ========================================================================

    /// `@Name` that is an annotation application, not `@interface`.
    pub(crate) fn is_annotation(&mut self, k: usize) -> bool {
        self.kind_at(k) == TokenKind::Annotation && !self.is_at(k + 1, "interface")
    }

    pub(crate) fn is_annotation_declaration(&mut self, k: usize) -> bool {
        self.kind_at(k) == TokenKind::Annotation && self.is_at(k + 1, "interface")
    }

    pub(crate) fn parse_modifiers(&mut self) -> PResult<Header> {
        let mut header = Header {
            documentation: self.look(0).javadoc.clone(),
            ..Header::default()
        };
        loop {
            if self.kind_at(0) == TokenKind::Modifier {
                let keyword = self.advance().value;
                if let Some(modifier) = Modifiers::from_keyword(&keyword) {
                    header.modifiers |= modifier;
                }
            } else if self.is_annotation(0) {
                header.annotations.push(self.parse_annotation()?);
            } else {
                return Ok(header);
            }
        }
    }

    /// `final` and annotations, as allowed on parameters and locals.
    pub(crate) fn parse_variable_modifiers(&mut self) -> PResult<(Modifiers, Vec<Annotation>)> {
        let mut modifiers = Modifiers::empty();
        let mut annotations = Vec::new();
        loop {
            if self.eat("final") {
                modifiers |= Modifiers::FINAL;
            } else if self.is_annotation(0) {
                annotations.push(self.parse_annotation()?);
            } else {
                return Ok((modifiers, annotations));
            }
        }
    }

    pub(crate) fn parse_annotations(&mut self) -> PResult<Vec<Annotation>> {
        let mut annotations = vec![self.parse_annotation()?];
        while self.is_annotation(0) {
            annotations.push(self.parse_annotation()?);
        }
        Ok(annotations)
    }

    pub(crate) fn parse_annotation(&mut self) -> PResult<Annotation> {
        self.traced("annotation", |p| {
            let position = p.position();
            p.accept(&[Pat::Annotation])?;
            let name = p.parse_qualified_identifier()?;
            let mut element = None;
            if p.eat("(") {
                if !p.is(")") {
                    element = Some(p.parse_annotation_element()?);
                }
                p.expect(")")?;
            }
            Ok(Annotation {
                name,
                element,
                position: Some(position),
            })
        })
    }

    fn parse_annotation_element(&mut self) -> PResult<AnnotationElement> {
        if !self.would_accept(&[Pat::Identifier, Pat::Value("=")]) {
            return Ok(AnnotationElement::Value(self.parse_element_value()?));
        }
        let mut pairs = Vec::new();
        loop {
            let position = self.position();
            let name = self.parse_identifier()?;
            self.expect("=")?;
            let value = self.parse_element_value()?;
            pairs.push(ElementValuePair {
                name,
                value,
                position: Some(position),
            });
            if !self.eat(",") {
                return Ok(AnnotationElement::Pairs(pairs));
            }
        }
    }

    pub(crate) fn parse_element_value(&mut self) -> PResult<ElementValue> {
        self.traced("element_value", |p| {
            if p.is_annotation(0) {
                Ok(ElementValue::Annotation(Box::new(p.parse_annotation()?)))
            } else if p.is("{") {
                Ok(ElementValue::Array(Box::new(p.parse_element_value_array_initializer()?)))
            } else {
                Ok(ElementValue::Expression(p.parse_expressionl()?))
            }
        })
    }

    fn parse_element_value_array_initializer(&mut self) -> PResult<ElementArrayValue> {
        let position = self.position();
        self.expect("{")?;
        let mut values = Vec::new();
        while !self.is("}") {
            values.push(self.parse_element_value()?);
            if !self.eat(",") {
                break;
            }
        }
        self.expect("}")?;
        Ok(ElementArrayValue {
            values,
            position: Some(position),
        })
    }

    // ========================================================================
    // Class bodies
    // ========================================================================

    pub(crate) fn parse_class_body(&mut self) -> PResult<Vec<BodyDeclaration>> {
        self.traced("class_body", |p| {
            p.expect("{")?;
            let mut declarations = Vec::new();
            while !p.is("}") {
                if p.at_end() {
                    return Err(p.error(&messages::EXPECTED_0, &["}"]));
                }
                if let Some(declaration) = p.parse_class_body_declaration()? {
                    declarations.push(declaration);
                }
            }
            p.expect("}")?;
            Ok(declarations)
        })
    }

    fn parse_class_body_declaration(&mut self) -> PResult<Option<BodyDeclaration>> {
        let position = self.position();
        if self.eat(";") {
            return Ok(None);
        }
        let r#static = self.would_accept(&[Pat::Value("static"), Pat::Value("{")]);
        if r#static || self.is("{") {
            if r#static {
                self.advance();
            }
            let body = self.parse_block()?;
            return Ok(Some(
                InitializerBlock {
                    r#static,
                    body,
                    position: Some(position),
                }
                .into(),
            ));
        }
        self.parse_member_declaration().map(Some)
    }

    /// A class member: method, constructor, field or nested type.
    pub fn parse_member_declaration(&mut self) -> PResult<BodyDeclaration> {
        self.traced("member_declaration", |p| {
            let header = p.parse_modifiers()?;
            let position = p.position();

            if p.eat("void") {
                let name = p.parse_identifier()?;
                return p.parse_method_declarator_rest(header, Vec::new(), None, name, position).map(Into::into);
            }
            if p.is("<") {
                return p.parse_generic_method_or_constructor_declaration(header);
            }
            if p.would_accept(&[Pat::Identifier, Pat::Value("(")]) {
                let name = p.parse_identifier()?;
                return p.parse_constructor_declarator_rest(header, Vec::new(), name, position).map(Into::into);
            }
            if p.is("class") || p.is("enum") || p.is("interface") || p.is_annotation_declaration(0) {
                return match p.parse_type_declaration_rest(header)? {
                    Some(declaration) => Ok(declaration.into()),
                    None => Err(p.illegal(&messages::EXPECTED_TYPE_DECLARATION)),
                };
            }
            p.parse_method_or_field_declaration(header, position)
        })
    }

    fn parse_method_or_field_declaration(&mut self, header: Header, position: Position) -> PResult<BodyDeclaration> {
        let member_type = self.parse_type()?;
        let name_position = self.position();
        let name = self.parse_identifier()?;
        if self.is("(") {
            return self
                .parse_method_declarator_rest(header, Vec::new(), Some(member_type), name, position)
                .map(Into::into);
        }
        let declarators = self.parse_variable_declarators_rest(name, name_position)?;
        self.expect(";")?;
        Ok(FieldDeclaration {
            documentation: header.documentation,
            modifiers: header.modifiers,
            annotations: header.annotations,
            r#type: member_type,
            declarators,
            position: Some(position),
        }
        .into())
    }

    /// Parameters, extra dimensions, `throws` and body of a method. Array
    /// dimensions after the parameter list are added to the return type.
    fn parse_method_declarator_rest(
        &mut self,
        header: Header,
        type_parameters: Vec<TypeParameter>,
        mut return_type: Option<Type>,
        name: String,
        position: Position,
    ) -> PResult<MethodDeclaration> {
        self.traced("method_declarator_rest", |p| {
            let parameters = p.parse_formal_parameters()?;
            let extra = p.parse_array_dimension();
            if let Some(return_type) = return_type.as_mut() {
                return_type.add_dimensions(extra);
            }
            let throws = if p.eat("throws") { p.parse_qualified_identifier_list()? } else { Vec::new() };
            let body = if p.is("{") {
                Some(p.parse_block()?)
            } else {
                p.expect(";")?;
                None
            };
            Ok(MethodDeclaration {
                documentation: header.documentation,
                modifiers: header.modifiers,
                annotations: header.annotations,
                type_parameters,
                return_type,
                name,
                parameters,
                throws,
                body,
                position: Some(position),
            })
        })
    }

    fn parse_constructor_declarator_rest(
        &mut self,
        header: Header,
        type_parameters: Vec<TypeParameter>,
        name: String,
        position: Position,
    ) -> PResult<ConstructorDeclaration> {
        self.traced("constructor_declarator_rest", |p| {
            let parameters = p.parse_formal_parameters()?;
            let throws = if p.eat("throws") { p.parse_qualified_identifier_list()? } else { Vec::new() };
            let body = p.parse_block()?;
            Ok(ConstructorDeclaration {
                modifiers: header.modifiers,
                annotations: header.annotations,
                documentation: header.documentation,
                type_parameters,
                name,
                parameters,
                throws,
                body,
                position: Some(position),
            })
        })
    }

    fn parse_generic_method_or_constructor_declaration(&mut self, header: Header) -> PResult<BodyDeclaration> {
        let type_parameters = self.parse_type_parameters()?;
        let position = self.position();
        if self.would_accept(&[Pat::Identifier, Pat::Value("(")]) {
            let name = self.parse_identifier()?;
            return self
                .parse_constructor_declarator_rest(header, type_parameters, name, position)
                .map(Into::into);
        }
        let return_type = if self.eat("void") { None } else { Some(self.parse_type()?) };
        let name = self.parse_identifier()?;
        self.parse_method_declarator_rest(header, type_parameters, return_type, name, position)
            .map(Into::into)
    }

    // ========================================================================
    // Interface and annotation bodies
    // ========================================================================

    fn parse_interface_body(&mut self) -> PResult<Vec<BodyDeclaration>> {
        self.traced("interface_body", |p| {
            p.expect("{")?;
            let mut declarations = Vec::new();
            while !p.is("}") {
                if p.at_end() {
                    return Err(p.error(&messages::EXPECTED_0, &["}"]));
                }
                if p.eat(";") {
                    continue;
                }
                declarations.push(p.parse_interface_member_declaration()?);
            }
            p.expect("}")?;
            Ok(declarations)
        })
    }

    fn parse_interface_member_declaration(&mut self) -> PResult<BodyDeclaration> {
        self.traced("interface_member_declaration", |p| {
            let header = p.parse_modifiers()?;
            let position = p.position();

            if p.is("class") || p.is("enum") || p.is("interface") || p.is_annotation_declaration(0) {
                return match p.parse_type_declaration_rest(header)? {
                    Some(declaration) => Ok(declaration.into()),
                    None => Err(p.illegal(&messages::EXPECTED_TYPE_DECLARATION)),
                };
            }
            if p.is("<") {
                let type_parameters = p.parse_type_parameters()?;
                let return_type = if p.eat("void") { None } else { Some(p.parse_type()?) };
                let name = p.parse_identifier()?;
                return p
                    .parse_method_declarator_rest(header, type_parameters, return_type, name, position)
                    .map(Into::into);
            }
            if p.eat("void") {
                let name = p.parse_identifier()?;
                return p.parse_method_declarator_rest(header, Vec::new(), None, name, position).map(Into::into);
            }

            let member_type = p.parse_type()?;
            let name_position = p.position();
            let name = p.parse_identifier()?;
            if p.is("(") {
                return p
                    .parse_method_declarator_rest(header, Vec::new(), Some(member_type), name, position)
                    .map(Into::into);
            }
            let declarators = p.parse_constant_declarators_rest(name, name_position)?;
            p.expect(";")?;
            Ok(ConstantDeclaration {
                documentation: header.documentation,
                modifiers: header.modifiers,
                annotations: header.annotations,
                r#type: member_type,
                declarators,
                position: Some(position),
            }
            .into())
        })
    }

    /// Interface constants must be initialised.
    fn parse_constant_declarators_rest(&mut self, first: String, position: Position) -> PResult<Vec<VariableDeclarator>> {
        let mut declarators = vec![self.parse_constant_declarator_rest(first, position)?];
        while self.eat(",") {
            let position = self.position();
            let name = self.parse_identifier()?;
            declarators.push(self.parse_constant_declarator_rest(name, position)?);
        }
        Ok(declarators)
    }

    fn parse_constant_declarator_rest(&mut self, name: String, position: Position) -> PResult<VariableDeclarator> {
        let dimensions = self.parse_array_dimension();
        self.expect("=")?;
        let initializer = self.parse_variable_initializer()?;
        Ok(VariableDeclarator {
            name,
            dimensions,
            initializer: Some(initializer),
            position: Some(position),
        })
    }

    fn parse_annotation_type_body(&mut self) -> PResult<Vec<BodyDeclaration>> {
        self.traced("annotation_type_body", |p| {
            p.expect("{")?;
            let mut declarations = Vec::new();
            while !p.is("}") {
                if p.at_end() {
                    return Err(p.error(&messages::EXPECTED_0, &["}"]));
                }
                if p.eat(";") {
                    continue;
                }
                declarations.push(p.parse_annotation_type_element_declaration()?);
            }
            p.expect("}")?;
            Ok(declarations)
        })
    }

    fn parse_annotation_type_element_declaration(&mut self) -> PResult<BodyDeclaration> {
        let header = self.parse_modifiers()?;
        let position = self.position();

        if self.is("class") || self.is("enum") || self.is("interface") || self.is_annotation_declaration(0) {
            return match self.parse_type_declaration_rest(header)? {
                Some(declaration) => Ok(declaration.into()),
                None => Err(self.illegal(&messages::EXPECTED_TYPE_DECLARATION)),
            };
        }

        let return_type = self.parse_type()?;
        let name_position = self.position();
        let name = self.parse_identifier()?;
        if self.eat("(") {
            self.expect(")")?;
            let dimensions = self.parse_array_dimension();
            let r#default = if self.eat("default") { Some(self.parse_element_value()?) } else { None };
            self.expect(";")?;
            return Ok(AnnotationMethod {
                modifiers: header.modifiers,
                annotations: header.annotations,
                name,
                return_type,
                dimensions,
                r#default,
                position: Some(position),
            }
            .into());
        }

        let declarators = self.parse_constant_declarators_rest(name, name_position)?;
        self.expect(";")?;
        Ok(ConstantDeclaration {
            documentation: header.documentation,
            modifiers: header.modifiers,
            annotations: header.annotations,
            r#type: return_type,
            declarators,
            position: Some(position),
        }
        .into())
    }

    // ========================================================================
    // Enum bodies
    // ========================================================================

    fn parse_enum_body(&mut self) -> PResult<EnumBody> {
        self.traced("enum_body", |p| {
            let position = p.position();
            p.expect("{")?;
            let mut constants = Vec::new();
            if !p.eat(",") {
                while !p.is(";") && !p.is("}") {
                    constants.push(p.parse_enum_constant()?);
                    if !p.eat(",") {
                        break;
                    }
                }
            }
            let mut declarations = Vec::new();
            if p.eat(";") {
                while !p.is("}") {
                    if p.at_end() {
                        return Err(p.error(&messages::EXPECTED_0, &["}"]));
                    }
                    if let Some(declaration) = p.parse_class_body_declaration()? {
                        declarations.push(declaration);
                    }
                }
            }
            p.expect("}")?;
            Ok(EnumBody {
                constants,
                declarations,
                position: Some(position),
            })
        })
    }

    fn parse_enum_constant(&mut self) -> PResult<EnumConstantDeclaration> {
        let documentation = self.look(0).javadoc.clone();
        let annotations = if self.is_annotation(0) { self.parse_annotations()? } else { Vec::new() };
        let position = self.position();
        let name = self.parse_identifier()?;
        let arguments = if self.is("(") { Some(self.parse_arguments()?) } else { None };
        let body = if self.is("{") { Some(self.parse_class_body()?) } else { None };
        Ok(EnumConstantDeclaration {
            modifiers: Modifiers::empty(),
            annotations,
            documentation,
            name,
            arguments,
            body,
            position: Some(position),
        })
    }

    // ========================================================================
    // Parameters and variables
    // ========================================================================

    pub(crate) fn parse_formal_parameters(&mut self) -> PResult<Vec<FormalParameter>> {
        self.traced("formal_parameters", |p| {
            p.expect("(")?;
            let mut parameters = Vec::new();
            if p.eat(")") {
                return Ok(parameters);
            }
            loop {
                let (modifiers, annotations) = p.parse_variable_modifiers()?;
                let position = p.position();
                if !matches!(p.kind_at(0), TokenKind::Identifier | TokenKind::BasicType) {
                    return Err(p.illegal(&messages::EXPECTED_FORMAL_PARAMETER));
                }
                let mut parameter_type = p.parse_type()?;
                let varargs = p.eat("...");
                let name = p.parse_identifier()?;
                parameter_type.add_dimensions(p.parse_array_dimension());
                parameters.push(FormalParameter {
                    modifiers,
                    annotations,
                    r#type: parameter_type,
                    name,
                    varargs,
                    position: Some(position),
                });
                // A variable arity parameter is always last.
                if varargs || !p.eat(",") {
                    break;
                }
            }
            p.expect(")")?;
            Ok(parameters)
        })
    }

    /// Declarators after the first name, which the caller already consumed.
    pub(crate) fn parse_variable_declarators_rest(
        &mut self,
        first: String,
        position: Position,
    ) -> PResult<Vec<VariableDeclarator>> {
        let mut declarators = vec![self.parse_variable_declarator_rest(first, position)?];
        while self.eat(",") {
            declarators.push(self.parse_variable_declarator()?);
        }
        Ok(declarators)
    }

    pub(crate) fn parse_variable_declarators(&mut self) -> PResult<Vec<VariableDeclarator>> {
        let mut declarators = vec![self.parse_variable_declarator()?];
        while self.eat(",") {
            declarators.push(self.parse_variable_declarator()?);
        }
        Ok(declarators)
    }

    pub(crate) fn parse_variable_declarator(&mut self) -> PResult<VariableDeclarator> {
        let position = self.position();
        let name = self.parse_identifier()?;
        self.parse_variable_declarator_rest(name, position)
    }

    fn parse_variable_declarator_rest(&mut self, name: String, position: Position) -> PResult<VariableDeclarator> {
        let dimensions = self.parse_array_dimension();
        let initializer = if self.eat("=") { Some(self.parse_variable_initializer()?) } else { None };
        Ok(VariableDeclarator {
            name,
            dimensions,
            initializer,
            position: Some(position),
        })
    }

    pub(crate) fn parse_variable_initializer(&mut self) -> PResult<VariableInitializer> {
        if self.is("{") {
            Ok(VariableInitializer::Array(Box::new(self.parse_array_initializer()?)))
        } else {
            Ok(VariableInitializer::Expression(self.parse_expression()?))
        }
    }

    /// `{ a, b, }` with an optional trailing comma.
    pub(crate) fn parse_array_initializer(&mut self) -> PResult<ArrayInitializer> {
        self.traced("array_initializer", |p| {
            let position = p.position();
            p.expect("{")?;
            let mut initializers = Vec::new();
            if !p.eat(",") {
                while !p.is("}") {
                    initializers.push(p.parse_variable_initializer()?);
                    if !p.eat(",") {
                        break;
                    }
                }
            }
            p.expect("}")?;
            Ok(ArrayInitializer {
                initializers,
                position: Some(position),
            })
        })
    }
}
