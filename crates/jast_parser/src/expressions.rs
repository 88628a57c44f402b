//! Expression productions.
//!
//! Precedence is handled in three tiers: `parse_expression` (assignment),
//! `parse_expressionl` (ternary, single-parameter lambda, method reference),
//! `parse_expression_2` (binary operators, folded by precedence) and
//! `parse_expression_3` (prefix/postfix operators, casts, lambdas, primaries
//! with selectors).

use crate::parser::{PResult, Parser};
use crate::precedence::build_binary_operation;
use crate::utilities::{is_assignment_operator, is_infix_operator, is_postfix_operator, is_prefix_operator, Pat};
use jast_ast::*;
use jast_core::Position;
use jast_diagnostics::messages;
use jast_scanner::TokenKind;

/// Build a primary node with empty operator, qualifier and selector lists.
macro_rules! primary {
    ($name:ident { $( $field:ident $(: $value:expr)? ),* $(,)? } @ $position:expr) => {
        $name {
            prefix_operators: Vec::new(),
            postfix_operators: Vec::new(),
            qualifier: None,
            selectors: Vec::new(),
            $( $field $(: $value)?, )*
            position: $position,
        }
    };
}

/// What follows a dotted name in a primary.
enum IdentifierSuffix {
    /// Plain name: the last segment is the member.
    Member,
    /// `name(args)`: the last segment is the method.
    Invocation(Vec<Expression>),
    /// `Name[]...class`: the last segment is the type, with this many dimensions.
    ClassLiteral(usize),
    /// A suffix that stands on its own (`.this`, `.new`, `.super`, `.<T>m()`);
    /// the whole name becomes its qualifier.
    Complete(Expression),
}

/// A parenthesised primary is kept as is unless it carries operators that
/// would bind differently once selectors are added outside the parentheses.
fn parenthesize(mut inner: Expression, position: Option<Position>) -> Expression {
    let bare = inner
        .primary_parts()
        .is_some_and(|parts| parts.prefix_operators.is_empty() && parts.postfix_operators.is_empty());
    if bare {
        return inner;
    }
    primary!(ParenthesizedExpression { expression: inner } @ position).into()
}

/// Apply prefix operators that were read before a cast or lambda.
fn with_prefix_operators(expression: Expression, prefix_operators: Vec<String>, position: Option<Position>) -> Expression {
    if prefix_operators.is_empty() {
        return expression;
    }
    let mut wrapped = primary!(ParenthesizedExpression { expression } @ position);
    wrapped.prefix_operators = prefix_operators;
    wrapped.into()
}

impl Parser {
    pub fn parse_expression(&mut self) -> PResult<Expression> {
        self.nested("expression", |p| {
            let position = Some(p.position());
            let expressionl = p.parse_expressionl()?;
            if !is_assignment_operator(p.look(0)) {
                return Ok(expressionl);
            }
            let r#type = p.advance().value;
            let value = p.parse_expression()?;
            Ok(Assignment {
                expressionl,
                value,
                r#type,
                position,
            }
            .into())
        })
    }

    pub(crate) fn parse_expressionl(&mut self) -> PResult<Expression> {
        self.traced("expressionl", |p| {
            let position = Some(p.position());
            let expression_2 = p.parse_expression_2()?;

            if p.eat("?") {
                let if_true = p.parse_expression()?;
                p.expect(":")?;
                let if_false = p.parse_expressionl()?;
                return Ok(TernaryExpression {
                    condition: expression_2,
                    if_true,
                    if_false,
                    position,
                }
                .into());
            }
            if p.is("->") {
                let parameter = p.lambda_parameter(expression_2)?;
                let body = p.parse_lambda_method_body()?;
                return Ok(LambdaExpression {
                    parameters: vec![parameter],
                    body,
                    position,
                }
                .into());
            }
            if p.eat("::") {
                let (method, type_arguments) = p.parse_method_reference()?;
                return Ok(MethodReference {
                    expression: expression_2,
                    method,
                    type_arguments,
                    position,
                }
                .into());
            }
            Ok(expression_2)
        })
    }

    /// `x -> ...` and `(x) -> ...`: the parameter was parsed as a plain name.
    fn lambda_parameter(&mut self, expression: Expression) -> PResult<LambdaParameter> {
        match expression {
            Expression::MemberReference(member)
                if member.qualifier.is_none()
                    && member.selectors.is_empty()
                    && member.prefix_operators.is_empty()
                    && member.postfix_operators.is_empty() =>
            {
                let MemberReference { member, position, .. } = *member;
                Ok(InferredFormalParameter { name: member, position }.into())
            }
            _ => Err(self.error(&messages::ILLEGAL_LAMBDA_PARAMETER, &[])),
        }
    }

    fn parse_expression_2(&mut self) -> PResult<Expression> {
        self.traced("expression_2", |p| {
            let first = p.parse_expression_3()?;
            if !is_infix_operator(p.look(0)) {
                return Ok(first);
            }

            let mut rest = Vec::new();
            while is_infix_operator(p.look(0)) {
                let position = p.position();
                if p.eat("instanceof") {
                    let comparison = p.parse_type()?;
                    rest.push(("instanceof".to_string(), position, Operand::Type(comparison)));
                } else {
                    let operator = p.parse_infix_operator();
                    let operand = p.parse_expression_3()?;
                    rest.push((operator, position, Operand::Expression(operand)));
                }
            }

            match build_binary_operation(first, rest) {
                Some(operation) => Ok(operation),
                None => Err(p.illegal(&messages::EXPECTED_EXPRESSION)),
            }
        })
    }

    /// The lexer never produces `>>` or `>>>`; shifts are rebuilt here.
    fn parse_infix_operator(&mut self) -> String {
        match self.join_right_angles() {
            Some(operator) => operator,
            None => self.advance().value,
        }
    }

    fn parse_expression_3(&mut self) -> PResult<Expression> {
        self.traced("expression_3", |p| {
            let position = Some(p.position());
            let mut prefix_operators = Vec::new();
            while is_prefix_operator(p.look(0)) {
                prefix_operators.push(p.advance().value);
            }

            if p.is("(") {
                if let Ok(lambda) = p.speculate(Self::parse_lambda_expression) {
                    return Ok(with_prefix_operators(lambda, prefix_operators, position));
                }
                if let Ok(cast) = p.speculate(Self::parse_cast) {
                    return Ok(with_prefix_operators(cast, prefix_operators, position));
                }
            }

            let mut primary = p.parse_primary()?;
            let mut selectors = Vec::new();
            while p.is("[") || p.is(".") {
                selectors.push(p.parse_selector()?);
            }
            let mut postfix_operators = Vec::new();
            while is_postfix_operator(p.look(0)) {
                postfix_operators.push(p.advance().value);
            }

            if let Some(parts) = primary.primary_parts() {
                prefix_operators.append(parts.prefix_operators);
                *parts.prefix_operators = prefix_operators;
                parts.selectors.extend(selectors);
                parts.postfix_operators.extend(postfix_operators);
            }
            Ok(primary)
        })
    }

    /// `(Type) operand`. A reference type cast cannot be followed by a
    /// unary `+` or `-`, which makes `(a) - b` a subtraction.
    fn parse_cast(&mut self) -> PResult<Expression> {
        let position = Some(self.position());
        self.expect("(")?;
        let target = self.parse_type()?;
        self.expect(")")?;
        let signed = self.kind_at(0) == TokenKind::Operator
            && (self.is("+") || self.is("-") || self.is("++") || self.is("--"));
        if signed && matches!(target, Type::ReferenceType(_)) {
            return Err(self.error(&messages::EXPECTED_EXPRESSION, &[]));
        }
        let expression = self.parse_expression_3()?;
        Ok(Cast {
            r#type: target,
            expression,
            position,
        }
        .into())
    }

    // ========================================================================
    // Lambdas and method references
    // ========================================================================

    fn parse_lambda_expression(&mut self) -> PResult<Expression> {
        self.traced("lambda_expression", |p| {
            let position = Some(p.position());
            let parameters: Vec<LambdaParameter> =
                if p.would_accept(&[Pat::Value("("), Pat::Identifier, Pat::Value(",")]) {
                    p.advance();
                    let mut parameters = Vec::new();
                    loop {
                        let position = Some(p.position());
                        let name = p.parse_identifier()?;
                        parameters.push(InferredFormalParameter { name, position }.into());
                        if !p.eat(",") {
                            break;
                        }
                    }
                    p.expect(")")?;
                    parameters
                } else if p.would_accept(&[Pat::Value("("), Pat::Identifier, Pat::Value(")"), Pat::Value("->")]) {
                    p.advance();
                    let position = Some(p.position());
                    let name = p.parse_identifier()?;
                    p.advance();
                    vec![InferredFormalParameter { name, position }.into()]
                } else {
                    p.parse_formal_parameters()?.into_iter().map(Into::into).collect()
                };
            let body = p.parse_lambda_method_body()?;
            Ok(LambdaExpression {
                parameters,
                body,
                position,
            }
            .into())
        })
    }

    fn parse_lambda_method_body(&mut self) -> PResult<LambdaBody> {
        self.expect("->")?;
        if self.is("{") {
            Ok(LambdaBody::Block(self.parse_block()?))
        } else {
            Ok(LambdaBody::Expression(self.parse_expression()?))
        }
    }

    /// The part after `::`.
    fn parse_method_reference(&mut self) -> PResult<(MemberReference, Vec<TypeArgument>)> {
        let type_arguments = if self.is("<") { self.parse_nonwildcard_type_arguments()? } else { Vec::new() };
        let position = Some(self.position());
        let member = if self.is("new") { self.advance().value } else { self.parse_identifier()? };
        Ok((primary!(MemberReference { member } @ position), type_arguments))
    }

    // ========================================================================
    // Primaries
    // ========================================================================

    fn parse_primary(&mut self) -> PResult<Expression> {
        self.traced("primary", |p| {
            let position = Some(p.position());
            let kind = p.kind_at(0);

            if kind.is_literal() {
                let value = p.advance().value;
                return Ok(primary!(Literal { value } @ position).into());
            }
            if p.is("(") {
                let inner = p.parse_par_expression()?;
                return Ok(parenthesize(inner, position));
            }
            if p.eat("this") {
                if !p.is("(") {
                    return Ok(primary!(This {} @ position).into());
                }
                let arguments = p.parse_arguments()?;
                return Ok(primary!(ExplicitConstructorInvocation { type_arguments: Vec::new(), arguments } @ position).into());
            }
            if p.would_accept(&[Pat::Value("super"), Pat::Value("::")]) {
                let member = p.advance().value;
                return Ok(primary!(MemberReference { member } @ position).into());
            }
            if p.eat("super") {
                return p.parse_super_suffix(position);
            }
            if p.eat("new") {
                return p.parse_creator(position);
            }
            if p.is("<") {
                let type_arguments = p.parse_nonwildcard_type_arguments()?;
                if p.eat("this") {
                    let arguments = p.parse_arguments()?;
                    return Ok(primary!(ExplicitConstructorInvocation { type_arguments, arguments } @ position).into());
                }
                return p.parse_explicit_generic_invocation_suffix(type_arguments, position);
            }
            if kind == TokenKind::Identifier {
                return p.parse_qualified_primary(position);
            }
            if kind == TokenKind::BasicType {
                let mut basic = p.parse_basic_type()?;
                basic.dimensions = p.parse_array_dimension();
                p.accept(&[Pat::Value("."), Pat::Value("class")])?;
                return Ok(primary!(ClassReference { r#type: basic.into() } @ position).into());
            }
            if p.eat("void") {
                p.accept(&[Pat::Value("."), Pat::Value("class")])?;
                return Ok(primary!(VoidClassReference {} @ position).into());
            }
            Err(p.illegal(&messages::EXPECTED_EXPRESSION))
        })
    }

    /// `( expression )`, returning the inner expression.
    pub(crate) fn parse_par_expression(&mut self) -> PResult<Expression> {
        self.expect("(")?;
        let expression = self.parse_expression()?;
        self.expect(")")?;
        Ok(expression)
    }

    pub(crate) fn parse_arguments(&mut self) -> PResult<Vec<Expression>> {
        self.traced("arguments", |p| {
            p.expect("(")?;
            let mut arguments = Vec::new();
            if p.eat(")") {
                return Ok(arguments);
            }
            loop {
                arguments.push(p.parse_expression()?);
                if !p.eat(",") {
                    break;
                }
            }
            p.expect(")")?;
            Ok(arguments)
        })
    }

    /// What follows `super`: `(args)`, `.member` or `.<T>method(args)`.
    fn parse_super_suffix(&mut self, position: Option<Position>) -> PResult<Expression> {
        if !self.eat(".") {
            let arguments = self.parse_arguments()?;
            return Ok(primary!(SuperConstructorInvocation { type_arguments: Vec::new(), arguments } @ position).into());
        }
        let type_arguments = if self.is("<") { self.parse_nonwildcard_type_arguments()? } else { Vec::new() };
        let member = self.parse_identifier()?;
        if !self.is("(") {
            return Ok(primary!(SuperMemberReference { member } @ position).into());
        }
        let arguments = self.parse_arguments()?;
        Ok(primary!(SuperMethodInvocation { type_arguments, arguments, member } @ position).into())
    }

    /// After `<T, U>`: `super...` or `method(args)`.
    fn parse_explicit_generic_invocation_suffix(
        &mut self,
        type_arguments: Vec<TypeArgument>,
        position: Option<Position>,
    ) -> PResult<Expression> {
        if self.eat("super") {
            let mut invocation = self.parse_super_suffix(position)?;
            match &mut invocation {
                Expression::SuperMethodInvocation(n) if n.type_arguments.is_empty() => n.type_arguments = type_arguments,
                Expression::SuperConstructorInvocation(n) => n.type_arguments = type_arguments,
                _ => {}
            }
            return Ok(invocation);
        }
        let member = self.parse_identifier()?;
        let arguments = self.parse_arguments()?;
        Ok(primary!(MethodInvocation { type_arguments, arguments, member } @ position).into())
    }

    /// A dotted name followed by an identifier suffix. Which segment the
    /// suffix applies to is only known once the suffix has been read.
    fn parse_qualified_primary(&mut self, position: Option<Position>) -> PResult<Expression> {
        let mut names = vec![self.parse_identifier()?];
        while self.would_accept(&[Pat::Value("."), Pat::Identifier]) {
            self.advance();
            names.push(self.parse_identifier()?);
        }

        let mut expression: Expression = match self.parse_identifier_suffix(position)? {
            IdentifierSuffix::Complete(expression) => expression,
            IdentifierSuffix::Member => {
                let member = names.pop().unwrap_or_default();
                primary!(MemberReference { member } @ position).into()
            }
            IdentifierSuffix::Invocation(arguments) => {
                let member = names.pop().unwrap_or_default();
                primary!(MethodInvocation { type_arguments: Vec::new(), arguments, member } @ position).into()
            }
            IdentifierSuffix::ClassLiteral(dimensions) => {
                let reference_type = ReferenceType {
                    name: names.pop().unwrap_or_default(),
                    dimensions,
                    arguments: None,
                    sub_type: None,
                    position,
                };
                primary!(ClassReference { r#type: reference_type.into() } @ position).into()
            }
        };

        if !names.is_empty() {
            if let Some(parts) = expression.primary_parts() {
                *parts.qualifier = Some(names.join("."));
            }
        }
        Ok(expression)
    }

    fn parse_identifier_suffix(&mut self, position: Option<Position>) -> PResult<IdentifierSuffix> {
        if self.try_accept(&[Pat::Value("["), Pat::Value("]")]) {
            let dimensions = 1 + self.parse_array_dimension();
            self.accept(&[Pat::Value("."), Pat::Value("class")])?;
            return Ok(IdentifierSuffix::ClassLiteral(dimensions));
        }
        if self.is("(") {
            return Ok(IdentifierSuffix::Invocation(self.parse_arguments()?));
        }
        if self.try_accept(&[Pat::Value("."), Pat::Value("class")]) {
            return Ok(IdentifierSuffix::ClassLiteral(0));
        }
        if self.try_accept(&[Pat::Value("."), Pat::Value("this")]) {
            return Ok(IdentifierSuffix::Complete(primary!(This {} @ position).into()));
        }
        if self.would_accept(&[Pat::Value("."), Pat::Value("<")]) {
            self.advance();
            let type_arguments = self.parse_nonwildcard_type_arguments()?;
            let invocation = self.parse_explicit_generic_invocation_suffix(type_arguments, position)?;
            return Ok(IdentifierSuffix::Complete(invocation));
        }
        if self.try_accept(&[Pat::Value("."), Pat::Value("new")]) {
            let type_arguments = if self.is("<") { self.parse_nonwildcard_type_arguments()? } else { Vec::new() };
            let creator = self.parse_inner_creator(type_arguments, position)?;
            return Ok(IdentifierSuffix::Complete(creator));
        }
        if self.try_accept(&[Pat::Value("."), Pat::Value("super")]) {
            return Ok(IdentifierSuffix::Complete(self.parse_super_suffix(position)?));
        }
        Ok(IdentifierSuffix::Member)
    }

    fn parse_selector(&mut self) -> PResult<Expression> {
        self.traced("selector", |p| {
            let position = Some(p.position());
            if p.eat("[") {
                let index = p.parse_expression()?;
                p.expect("]")?;
                return Ok(ArraySelector { index, position }.into());
            }

            p.expect(".")?;
            let position = Some(p.position());
            if p.kind_at(0) == TokenKind::Identifier {
                let member = p.advance().value;
                if !p.is("(") {
                    return Ok(primary!(MemberReference { member } @ position).into());
                }
                let arguments = p.parse_arguments()?;
                return Ok(primary!(MethodInvocation { type_arguments: Vec::new(), arguments, member } @ position).into());
            }
            if p.is("<") {
                let type_arguments = p.parse_nonwildcard_type_arguments()?;
                return p.parse_explicit_generic_invocation_suffix(type_arguments, position);
            }
            if p.eat("this") {
                return Ok(primary!(This {} @ position).into());
            }
            if p.eat("super") {
                return p.parse_super_suffix(position);
            }
            if p.eat("new") {
                let type_arguments = if p.is("<") { p.parse_nonwildcard_type_arguments()? } else { Vec::new() };
                return p.parse_inner_creator(type_arguments, position);
            }
            Err(p.illegal(&messages::EXPECTED_SELECTOR))
        })
    }

    // ========================================================================
    // Creators
    // ========================================================================

    /// Everything after `new`.
    fn parse_creator(&mut self, position: Option<Position>) -> PResult<Expression> {
        self.traced("creator", |p| {
            if p.kind_at(0) == TokenKind::BasicType {
                let basic = p.parse_basic_type()?;
                return p.parse_array_creator_rest(basic.into(), position);
            }

            let constructor_type_arguments = if p.is("<") { p.parse_nonwildcard_type_arguments()? } else { Vec::new() };
            let created_name = p.parse_created_name()?;
            if p.is("[") {
                if !constructor_type_arguments.is_empty() {
                    return Err(p.error(&messages::ARRAY_CREATOR_WITH_TYPE_ARGUMENTS, &[]));
                }
                return p.parse_array_creator_rest(created_name.into(), position);
            }

            let arguments = p.parse_arguments()?;
            let body = if p.is("{") { Some(p.parse_class_body()?) } else { None };
            Ok(primary!(ClassCreator {
                r#type: created_name,
                constructor_type_arguments,
                arguments,
                body,
            } @ position)
            .into())
        })
    }

    /// `[]...{ initializer }` or `[size]...[]...`.
    fn parse_array_creator_rest(&mut self, created: Type, position: Option<Position>) -> PResult<Expression> {
        if self.would_accept(&[Pat::Value("["), Pat::Value("]")]) {
            let dimensions = self.parse_array_dimension();
            let initializer = self.parse_array_initializer()?;
            return Ok(primary!(ArrayCreator {
                r#type: created,
                dimensions: vec![None; dimensions],
                initializer: Some(initializer),
            } @ position)
            .into());
        }

        let mut dimensions = Vec::new();
        while self.is("[") && !self.would_accept(&[Pat::Value("["), Pat::Value("]")]) {
            self.advance();
            dimensions.push(Some(self.parse_expression()?));
            self.expect("]")?;
        }
        if dimensions.is_empty() {
            return Err(self.illegal(&messages::EXPECTED_ARRAY_DIMENSION));
        }
        let unsized_dimensions = self.parse_array_dimension();
        dimensions.extend(std::iter::repeat_with(|| None).take(unsized_dimensions));
        Ok(primary!(ArrayCreator {
            r#type: created,
            dimensions,
            initializer: None,
        } @ position)
        .into())
    }

    /// `Inner<T>(args) { body }` after `outer.new`.
    fn parse_inner_creator(
        &mut self,
        constructor_type_arguments: Vec<TypeArgument>,
        position: Option<Position>,
    ) -> PResult<Expression> {
        let type_position = Some(self.position());
        let name = self.parse_identifier()?;
        let type_arguments = if self.is("<") { Some(self.parse_nonwildcard_type_arguments_or_diamond()?) } else { None };
        let arguments = self.parse_arguments()?;
        let body = if self.is("{") { Some(self.parse_class_body()?) } else { None };
        Ok(primary!(InnerClassCreator {
            r#type: ReferenceType {
                name,
                dimensions: 0,
                arguments: type_arguments,
                sub_type: None,
                position: type_position,
            },
            constructor_type_arguments,
            arguments,
            body,
        } @ position)
        .into())
    }
}
