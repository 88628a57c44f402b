//! Block and statement productions.

use crate::parser::{PResult, Parser};
use crate::utilities::Pat;
use jast_ast::*;
use jast_core::Position;
use jast_diagnostics::messages;
use jast_scanner::TokenKind;

impl Parser {
    pub(crate) fn parse_block(&mut self) -> PResult<Vec<Statement>> {
        self.traced("block", |p| {
            p.expect("{")?;
            let mut statements = Vec::new();
            while !p.is("}") {
                if p.at_end() {
                    return Err(p.error(&messages::EXPECTED_0, &["}"]));
                }
                statements.push(p.parse_block_statement()?);
            }
            p.expect("}")?;
            Ok(statements)
        })
    }

    /// A local class, a local variable declaration or a statement.
    ///
    /// Modifiers and annotations are skipped by lookahead first. A type
    /// keyword after them means a local type; annotations or a basic type
    /// mean a variable. A leading identifier is ambiguous and is tried as a
    /// variable declaration before falling back to a statement.
    pub(crate) fn parse_block_statement(&mut self) -> PResult<Statement> {
        self.traced("block_statement", |p| {
            let mut i = 0;
            let mut found_annotations = false;
            loop {
                if p.kind_at(i) == TokenKind::Modifier {
                    i += 1;
                } else if p.is_annotation(i) {
                    found_annotations = true;
                    i = p.skip_annotation(i);
                } else {
                    break;
                }
            }

            if p.is_at(i, "class") || p.is_at(i, "enum") || p.is_at(i, "interface") || p.is_annotation_declaration(i) {
                return p.parse_class_or_interface_declaration().map(Into::into);
            }

            let kind = p.kind_at(i);
            if found_annotations || (kind == TokenKind::BasicType && !p.is_at(i + 1, ".")) {
                return p.parse_local_variable_declaration_statement().map(Into::into);
            }
            if kind != TokenKind::Identifier {
                return p.parse_statement();
            }

            match p.speculate(|p| p.parse_local_variable_declaration_statement()) {
                Ok(declaration) => Ok(declaration.into()),
                Err(_) => p.parse_statement(),
            }
        })
    }

    /// The rest of an `if` after its keyword. `else if` chains are read in a
    /// loop and folded from the last branch, so their length costs no
    /// recursion.
    fn parse_if_rest(&mut self, position: Option<Position>) -> PResult<IfStatement> {
        let condition = self.parse_par_expression()?;
        let then_statement = self.parse_statement()?;

        let mut branches = Vec::new();
        let mut else_statement = None;
        while self.eat("else") {
            if !self.is("if") {
                else_statement = Some(self.parse_statement()?);
                break;
            }
            let branch_position = Some(self.position());
            self.advance();
            let condition = self.parse_par_expression()?;
            let then_statement = self.parse_statement()?;
            branches.push((condition, then_statement, branch_position));
        }

        while let Some((condition, then_statement, position)) = branches.pop() {
            let branch = IfStatement {
                label: None,
                condition,
                then_statement,
                else_statement,
                position,
            };
            else_statement = Some(branch.into());
        }
        Ok(IfStatement {
            label: None,
            condition,
            then_statement,
            else_statement,
            position,
        })
    }

    /// Index just past the annotation starting at token `i`.
    fn skip_annotation(&mut self, mut i: usize) -> usize {
        i += 2;
        while self.is_at(i, ".") {
            i += 2;
        }
        if self.is_at(i, "(") {
            let mut parens = 1;
            i += 1;
            while parens > 0 && !self.look(i).is_eof() {
                if self.is_at(i, "(") {
                    parens += 1;
                } else if self.is_at(i, ")") {
                    parens -= 1;
                }
                i += 1;
            }
        }
        i
    }

    fn parse_local_variable_declaration_statement(&mut self) -> PResult<LocalVariableDeclaration> {
        self.traced("local_variable_declaration_statement", |p| {
            let position = p.position();
            let (modifiers, annotations) = p.parse_variable_modifiers()?;
            let java_type = p.parse_type()?;
            let declarators = p.parse_variable_declarators()?;
            p.expect(";")?;
            Ok(LocalVariableDeclaration {
                modifiers,
                annotations,
                r#type: java_type,
                declarators,
                position: Some(position),
            })
        })
    }

    pub(crate) fn parse_statement(&mut self) -> PResult<Statement> {
        self.nested("statement", |p| {
            let position = Some(p.position());

            if p.is("{") {
                let statements = p.parse_block()?;
                return Ok(BlockStatement {
                    label: None,
                    statements,
                    position,
                }
                .into());
            }
            if p.eat(";") {
                return Ok(EmptyStatement { label: None, position }.into());
            }
            if p.would_accept(&[Pat::Identifier, Pat::Value(":")]) {
                let label = p.parse_identifier()?;
                p.expect(":")?;
                let mut statement = p.parse_statement()?;
                if let Some(slot) = statement.label_mut() {
                    *slot = Some(label);
                }
                return Ok(statement);
            }

            let keyword = if p.kind_at(0).is_keyword() { p.look(0).value.clone() } else { String::new() };
            let statement: Statement = match keyword.as_str() {
                "if" => {
                    p.advance();
                    p.parse_if_rest(position)?.into()
                }
                "assert" => {
                    p.advance();
                    let condition = p.parse_expression()?;
                    let value = if p.eat(":") { Some(p.parse_expression()?) } else { None };
                    p.expect(";")?;
                    AssertStatement {
                        label: None,
                        condition,
                        value,
                        position,
                    }
                    .into()
                }
                "switch" => {
                    p.advance();
                    let expression = p.parse_par_expression()?;
                    p.expect("{")?;
                    let cases = p.parse_switch_block_statement_groups()?;
                    p.expect("}")?;
                    SwitchStatement {
                        label: None,
                        expression,
                        cases,
                        position,
                    }
                    .into()
                }
                "while" => {
                    p.advance();
                    let condition = p.parse_par_expression()?;
                    let body = p.parse_statement()?;
                    WhileStatement {
                        label: None,
                        condition,
                        body,
                        position,
                    }
                    .into()
                }
                "do" => {
                    p.advance();
                    let body = p.parse_statement()?;
                    p.expect("while")?;
                    let condition = p.parse_par_expression()?;
                    p.expect(";")?;
                    DoStatement {
                        label: None,
                        condition,
                        body,
                        position,
                    }
                    .into()
                }
                "for" => {
                    p.advance();
                    p.expect("(")?;
                    let control = p.parse_for_control()?;
                    p.expect(")")?;
                    let body = p.parse_statement()?;
                    ForStatement {
                        label: None,
                        control,
                        body,
                        position,
                    }
                    .into()
                }
                "break" | "continue" => {
                    p.advance();
                    let goto = if p.kind_at(0) == TokenKind::Identifier { Some(p.parse_identifier()?) } else { None };
                    p.expect(";")?;
                    if keyword == "break" {
                        BreakStatement { label: None, goto, position }.into()
                    } else {
                        ContinueStatement { label: None, goto, position }.into()
                    }
                }
                "return" => {
                    p.advance();
                    let expression = if p.is(";") { None } else { Some(p.parse_expression()?) };
                    p.expect(";")?;
                    ReturnStatement {
                        label: None,
                        expression,
                        position,
                    }
                    .into()
                }
                "synchronized" => {
                    p.advance();
                    let lock = p.parse_par_expression()?;
                    let block = p.parse_block()?;
                    SynchronizedStatement {
                        label: None,
                        lock,
                        block,
                        position,
                    }
                    .into()
                }
                "throw" => {
                    p.advance();
                    let expression = p.parse_expression()?;
                    p.expect(";")?;
                    ThrowStatement {
                        label: None,
                        expression,
                        position,
                    }
                    .into()
                }
                "try" => {
                    p.advance();
                    p.parse_try_statement(position)?.into()
                }
                _ => {
                    let expression = p.parse_expression()?;
                    p.expect(";")?;
                    StatementExpression {
                        label: None,
                        expression,
                        position,
                    }
                    .into()
                }
            };
            Ok(statement)
        })
    }

    // ========================================================================
    // try
    // ========================================================================

    fn parse_try_statement(&mut self, position: Option<Position>) -> PResult<TryStatement> {
        let resources = if self.is("{") { None } else { Some(self.parse_resource_specification()?) };
        let block = self.parse_block()?;
        let mut catches = Vec::new();
        while self.is("catch") {
            catches.push(self.parse_catch_clause()?);
        }
        let finally_block = if self.eat("finally") { Some(self.parse_block()?) } else { None };
        if resources.is_none() && catches.is_empty() && finally_block.is_none() {
            return Err(self.illegal(&messages::EXPECTED_CATCH_OR_FINALLY));
        }
        Ok(TryStatement {
            label: None,
            resources,
            block,
            catches,
            finally_block,
            position,
        })
    }

    fn parse_catch_clause(&mut self) -> PResult<CatchClause> {
        self.traced("catch_clause", |p| {
            let position = p.position();
            p.accept(&[Pat::Value("catch"), Pat::Value("(")])?;
            let parameter_position = p.position();
            let (modifiers, annotations) = p.parse_variable_modifiers()?;
            let mut types = vec![p.parse_qualified_identifier()?];
            while p.eat("|") {
                types.push(p.parse_qualified_identifier()?);
            }
            let name = p.parse_identifier()?;
            p.expect(")")?;
            let block = p.parse_block()?;
            Ok(CatchClause {
                label: None,
                parameter: CatchClauseParameter {
                    modifiers,
                    annotations,
                    types,
                    name,
                    position: Some(parameter_position),
                },
                block,
                position: Some(position),
            })
        })
    }

    /// `( resource ; resource [;] )`
    fn parse_resource_specification(&mut self) -> PResult<Vec<TryResource>> {
        self.expect("(")?;
        let mut resources = Vec::new();
        loop {
            resources.push(self.parse_resource()?);
            if !self.is(")") {
                self.expect(";")?;
            }
            if self.eat(")") {
                return Ok(resources);
            }
        }
    }

    fn parse_resource(&mut self) -> PResult<TryResource> {
        let (modifiers, annotations) = self.parse_variable_modifiers()?;
        let position = self.position();
        let mut reference_type = self.parse_reference_type()?;
        reference_type.dimensions = self.parse_array_dimension();
        let name = self.parse_identifier()?;
        reference_type.dimensions += self.parse_array_dimension();
        self.expect("=")?;
        let value = self.parse_expression()?;
        Ok(TryResource {
            modifiers,
            annotations,
            r#type: reference_type.into(),
            name,
            value,
            position: Some(position),
        })
    }

    // ========================================================================
    // switch
    // ========================================================================

    fn parse_switch_block_statement_groups(&mut self) -> PResult<Vec<SwitchStatementCase>> {
        let mut groups = Vec::new();
        while self.is("case") || self.is("default") {
            groups.push(self.parse_switch_block_statement_group()?);
        }
        if !self.is("}") {
            return Err(self.illegal(&messages::EXPECTED_SWITCH_CASE));
        }
        Ok(groups)
    }

    /// Consecutive labels followed by the statements they share.
    fn parse_switch_block_statement_group(&mut self) -> PResult<SwitchStatementCase> {
        self.traced("switch_block_statement_group", |p| {
            let position = p.position();
            let mut case = Vec::new();
            let mut r#default = false;
            loop {
                if p.eat("case") {
                    case.push(p.parse_expression()?);
                } else if p.eat("default") {
                    r#default = true;
                } else {
                    return Err(p.illegal(&messages::EXPECTED_SWITCH_CASE));
                }
                p.expect(":")?;
                if !p.is("case") && !p.is("default") {
                    break;
                }
            }

            let mut statements = Vec::new();
            while !p.is("case") && !p.is("default") && !p.is("}") && !p.at_end() {
                statements.push(p.parse_block_statement()?);
            }
            Ok(SwitchStatementCase {
                case,
                r#default,
                statements,
                position: Some(position),
            })
        })
    }

    // ========================================================================
    // for
    // ========================================================================

    /// Tries a declaration-led control (`int i = 0; ...` or `T x : xs`)
    /// first, then falls back to the expression form.
    fn parse_for_control(&mut self) -> PResult<ForLoopControl> {
        self.traced("for_control", |p| {
            if let Ok(control) = p.speculate(|p| p.parse_for_var_control()) {
                return Ok(control);
            }
            let position = Some(p.position());
            let init = if p.is(";") { None } else { Some(ForInit::Expressions(p.parse_for_init_or_update()?)) };
            p.parse_for_control_rest(init, position).map(Into::into)
        })
    }

    fn parse_for_var_control(&mut self) -> PResult<ForLoopControl> {
        let position = Some(self.position());
        let (modifiers, annotations) = self.parse_variable_modifiers()?;
        let mut var_type = self.parse_type()?;
        let name_position = Some(self.position());
        let name = self.parse_identifier()?;
        var_type.add_dimensions(self.parse_array_dimension());

        if self.eat(":") {
            let iterable = self.parse_expression()?;
            let var = VariableDeclaration {
                modifiers,
                annotations,
                r#type: var_type,
                declarators: vec![VariableDeclarator {
                    name,
                    dimensions: 0,
                    initializer: None,
                    position: name_position,
                }],
                position,
            };
            return Ok(EnhancedForControl { var, iterable, position }.into());
        }

        let initializer = if self.eat("=") { Some(self.parse_variable_initializer()?) } else { None };
        let mut declarators = vec![VariableDeclarator {
            name,
            dimensions: 0,
            initializer,
            position: name_position,
        }];
        while self.eat(",") {
            declarators.push(self.parse_variable_declarator()?);
        }
        let var = VariableDeclaration {
            modifiers,
            annotations,
            r#type: var_type,
            declarators,
            position,
        };
        self.parse_for_control_rest(Some(ForInit::Declaration(Box::new(var))), position)
            .map(Into::into)
    }

    /// `; condition ; update` after the init clause.
    fn parse_for_control_rest(
        &mut self,
        init: Option<ForInit>,
        position: Option<Position>,
    ) -> PResult<ForControl> {
        self.expect(";")?;
        let condition = if self.is(";") { None } else { Some(self.parse_expression()?) };
        self.expect(";")?;
        let update = if self.is(")") { Vec::new() } else { self.parse_for_init_or_update()? };
        Ok(ForControl {
            init,
            condition,
            update,
            position,
        })
    }

    fn parse_for_init_or_update(&mut self) -> PResult<Vec<Expression>> {
        let mut expressions = vec![self.parse_expression()?];
        while self.eat(",") {
            expressions.push(self.parse_expression()?);
        }
        Ok(expressions)
    }
}

#[cfg(test)]
mod tests {
    use crate::options::ParseOptions;
    use crate::parser::Parser;
    use jast_ast::*;
    use jast_scanner::tokenize;

    fn statement(source: &str) -> Statement {
        let tokenized = tokenize(source, false).unwrap();
        let mut parser = Parser::new(tokenized.tokens, tokenized.end, ParseOptions::default());
        parser.parse_block_statement().unwrap()
    }

    #[test]
    fn test_local_variable_vs_expression() {
        assert_eq!(statement("Foo x = y;").kind(), NodeKind::LocalVariableDeclaration);
        assert_eq!(statement("foo(x);").kind(), NodeKind::StatementExpression);
        assert_eq!(statement("a.b.c = 5;").kind(), NodeKind::StatementExpression);
        assert_eq!(statement("List<String> xs;").kind(), NodeKind::LocalVariableDeclaration);
        assert_eq!(statement("final int[] xs = {1, 2};").kind(), NodeKind::LocalVariableDeclaration);
        assert_eq!(statement("int.class.getName();").kind(), NodeKind::StatementExpression);
    }

    #[test]
    fn test_local_class() {
        assert_eq!(statement("final class Local {}").kind(), NodeKind::ClassDeclaration);
        assert_eq!(statement("@Deprecated class Local {}").kind(), NodeKind::ClassDeclaration);
    }

    #[test]
    fn test_label() {
        let Statement::WhileStatement(w) = statement("outer: while (true) { break outer; }") else {
            panic!("expected while")
        };
        assert_eq!(w.label.as_deref(), Some("outer"));
        let Statement::BlockStatement(block) = &w.body else { panic!("expected block") };
        let Statement::BreakStatement(b) = &block.statements[0] else { panic!("expected break") };
        assert_eq!(b.goto.as_deref(), Some("outer"));
    }

    #[test]
    fn test_for_controls() {
        let Statement::ForStatement(f) = statement("for (String s : names) {}") else { panic!("expected for") };
        assert_eq!(f.control.kind(), NodeKind::EnhancedForControl);

        let Statement::ForStatement(f) = statement("for (int i = 0, j = 1; i < j; i++, j--) ;") else {
            panic!("expected for")
        };
        let ForLoopControl::ForControl(control) = &f.control else { panic!("expected classic for") };
        let Some(ForInit::Declaration(var)) = &control.init else { panic!("expected declaration") };
        assert_eq!(var.declarators.len(), 2);
        assert_eq!(control.update.len(), 2);

        let Statement::ForStatement(f) = statement("for (i = 0; ; ) {}") else { panic!("expected for") };
        let ForLoopControl::ForControl(control) = &f.control else { panic!("expected classic for") };
        assert!(matches!(control.init, Some(ForInit::Expressions(_))));
        assert!(control.condition.is_none());
    }

    #[test]
    fn test_switch_groups() {
        let Statement::SwitchStatement(s) = statement("switch (x) { case 1: case 2: a(); break; default: b(); }") else {
            panic!("expected switch")
        };
        assert_eq!(s.cases.len(), 2);
        assert_eq!(s.cases[0].case.len(), 2);
        assert_eq!(s.cases[0].statements.len(), 2);
        assert!(s.cases[1].r#default);
        assert!(s.cases[1].case.is_empty());
    }

    #[test]
    fn test_try_forms() {
        let Statement::TryStatement(t) = statement("try (InputStream in = open(); Reader r = wrap(in);) { } catch (IOException | RuntimeException e) { } finally { }") else {
            panic!("expected try")
        };
        assert_eq!(t.resources.as_ref().map(Vec::len), Some(2));
        assert_eq!(t.catches[0].parameter.types, vec!["IOException", "RuntimeException"]);
        assert!(t.finally_block.is_some());
    }

    #[test]
    fn test_try_without_handlers_is_an_error() {
        let tokenized = tokenize("try { }", false).unwrap();
        let mut parser = Parser::new(tokenized.tokens, tokenized.end, ParseOptions::default());
        let err = parser.parse_block_statement().unwrap_err();
        assert_eq!(err.description, "Unexpected end of input");

        let tokenized = tokenize("try { } x();", false).unwrap();
        let mut parser = Parser::new(tokenized.tokens, tokenized.end, ParseOptions::default());
        let err = parser.parse_block_statement().unwrap_err();
        assert_eq!(err.description, "Expected catch/finally block");
    }
}
