//! Type productions.

use crate::parser::{PResult, Parser};
use crate::utilities::{are_adjacent, Pat};
use jast_ast::*;
use jast_diagnostics::messages;
use jast_scanner::TokenKind;

impl Parser {
    /// A basic or reference type followed by any number of `[]`.
    pub fn parse_type(&mut self) -> PResult<Type> {
        self.nested("type", |p| {
            let mut java_type: Type = match p.kind_at(0) {
                TokenKind::BasicType => p.parse_basic_type()?.into(),
                TokenKind::Identifier => p.parse_reference_type()?.into(),
                _ => return Err(p.illegal(&messages::EXPECTED_TYPE)),
            };
            java_type.add_dimensions(p.parse_array_dimension());
            Ok(java_type)
        })
    }

    pub(crate) fn parse_basic_type(&mut self) -> PResult<BasicType> {
        let position = self.position();
        let name = self.accept(&[Pat::BasicType])?;
        Ok(BasicType {
            name,
            dimensions: 0,
            position: Some(position),
        })
    }

    /// `Outer<A>.Inner<B>`; the nested segments hang off `sub_type`.
    pub(crate) fn parse_reference_type(&mut self) -> PResult<ReferenceType> {
        self.parse_reference_type_with(Self::parse_type_arguments)
    }

    /// Like [`Parser::parse_reference_type`] but each segment may use the
    /// diamond `<>`, as in `new HashMap<>()`.
    pub(crate) fn parse_created_name(&mut self) -> PResult<ReferenceType> {
        self.parse_reference_type_with(Self::parse_type_arguments_or_diamond)
    }

    fn parse_reference_type_with(
        &mut self,
        mut arguments: impl FnMut(&mut Self) -> PResult<Vec<TypeArgument>>,
    ) -> PResult<ReferenceType> {
        self.traced("reference_type", |p| {
            let mut segments = Vec::new();
            loop {
                let position = p.position();
                let name = p.parse_identifier()?;
                let type_arguments = if p.is("<") { Some(arguments(p)?) } else { None };
                segments.push((name, type_arguments, position));
                if !p.would_accept(&[Pat::Value("."), Pat::Identifier]) {
                    break;
                }
                p.advance();
            }

            let mut sub_type: Option<Box<ReferenceType>> = None;
            for (name, arguments, position) in segments.into_iter().rev() {
                let segment = ReferenceType {
                    name,
                    dimensions: 0,
                    arguments,
                    sub_type: sub_type.take(),
                    position: Some(position),
                };
                sub_type = Some(Box::new(segment));
            }
            match sub_type {
                Some(reference_type) => Ok(*reference_type),
                None => Err(p.illegal(&messages::EXPECTED_TYPE)),
            }
        })
    }

    pub(crate) fn parse_type_arguments(&mut self) -> PResult<Vec<TypeArgument>> {
        self.traced("type_arguments", |p| {
            p.expect("<")?;
            let mut arguments = Vec::new();
            loop {
                arguments.push(p.parse_type_argument()?);
                if p.eat(">") {
                    return Ok(arguments);
                }
                p.expect(",")?;
            }
        })
    }

    fn parse_type_argument(&mut self) -> PResult<TypeArgument> {
        let position = self.position();
        let mut pattern_type = None;
        if self.eat("?") {
            if self.is("extends") || self.is("super") {
                pattern_type = Some(self.advance().value);
            } else {
                return Ok(TypeArgument {
                    r#type: None,
                    pattern_type: Some("?".to_string()),
                    position: Some(position),
                });
            }
        }
        let argument_type = self.parse_type_list_element()?;
        Ok(TypeArgument {
            r#type: Some(argument_type),
            pattern_type,
            position: Some(position),
        })
    }

    /// A type argument position: a reference type, or an array of a basic
    /// type (a bare basic type cannot be a type argument).
    fn parse_type_list_element(&mut self) -> PResult<Type> {
        let mut element: Type = if self.kind_at(0) == TokenKind::BasicType {
            let mut basic = self.parse_basic_type()?;
            self.accept(&[Pat::Value("["), Pat::Value("]")])?;
            basic.dimensions = 1;
            basic.into()
        } else {
            self.parse_reference_type()?.into()
        };
        element.add_dimensions(self.parse_array_dimension());
        Ok(element)
    }

    pub(crate) fn parse_type_list(&mut self) -> PResult<Vec<Type>> {
        let mut types = vec![self.parse_type_list_element()?];
        while self.eat(",") {
            types.push(self.parse_type_list_element()?);
        }
        Ok(types)
    }

    /// `extends`/`implements` lists.
    pub(crate) fn parse_reference_type_list(&mut self) -> PResult<Vec<ReferenceType>> {
        let mut types = Vec::new();
        loop {
            let mut reference_type = self.parse_reference_type()?;
            reference_type.dimensions = self.parse_array_dimension();
            types.push(reference_type);
            if !self.eat(",") {
                return Ok(types);
            }
        }
    }

    /// `<A, B[]>` as used for explicit invocation and constructor type
    /// arguments; wildcards are not allowed.
    pub(crate) fn parse_nonwildcard_type_arguments(&mut self) -> PResult<Vec<TypeArgument>> {
        self.traced("nonwildcard_type_arguments", |p| {
            p.expect("<")?;
            let types = p.parse_type_list()?;
            p.expect(">")?;
            Ok(types
                .into_iter()
                .map(|t| TypeArgument {
                    position: t.position(),
                    r#type: Some(t),
                    pattern_type: None,
                })
                .collect())
        })
    }

    pub(crate) fn parse_type_arguments_or_diamond(&mut self) -> PResult<Vec<TypeArgument>> {
        if self.try_accept(&[Pat::Value("<"), Pat::Value(">")]) {
            Ok(Vec::new())
        } else {
            self.parse_type_arguments()
        }
    }

    pub(crate) fn parse_nonwildcard_type_arguments_or_diamond(&mut self) -> PResult<Vec<TypeArgument>> {
        if self.try_accept(&[Pat::Value("<"), Pat::Value(">")]) {
            Ok(Vec::new())
        } else {
            self.parse_nonwildcard_type_arguments()
        }
    }

    pub(crate) fn parse_type_parameters(&mut self) -> PResult<Vec<TypeParameter>> {
        self.traced("type_parameters", |p| {
            p.expect("<")?;
            let mut parameters = Vec::new();
            loop {
                let position = p.position();
                let name = p.parse_identifier()?;
                let mut extends = Vec::new();
                if p.eat("extends") {
                    loop {
                        extends.push(p.parse_reference_type()?);
                        if !p.eat("&") {
                            break;
                        }
                    }
                }
                parameters.push(TypeParameter {
                    name,
                    extends,
                    position: Some(position),
                });
                if p.eat(">") {
                    return Ok(parameters);
                }
                p.expect(",")?;
            }
        })
    }

    /// Count of consecutive `[]` pairs.
    pub(crate) fn parse_array_dimension(&mut self) -> usize {
        let mut dimensions = 0;
        while self.try_accept(&[Pat::Value("["), Pat::Value("]")]) {
            dimensions += 1;
        }
        dimensions
    }

    /// The text of a `>`, `>>` or `>>>` operator spelled as separate `>`
    /// tokens. Tokens are joined only when nothing separates them, so `> >`
    /// stays two relational operators.
    pub(crate) fn join_right_angles(&mut self) -> Option<String> {
        if !self.is(">") {
            return None;
        }
        let mut operator = self.advance().value;
        while operator.len() < 3 {
            let adjacent = match self.tokens.last_consumed().cloned() {
                Some(last) => {
                    let next = self.tokens.look(0);
                    next.is(">") && are_adjacent(&last, next)
                }
                None => false,
            };
            if !adjacent {
                break;
            }
            self.advance();
            operator.push('>');
        }
        Some(operator)
    }
}
