//! Operator precedence for binary operators.

use jast_ast::{BinaryOperation, Expression, Operand};
use jast_core::Position;

/// Binary operator precedence levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    LogicalOr = 0,
    LogicalAnd = 1,
    BitwiseOr = 2,
    BitwiseXor = 3,
    BitwiseAnd = 4,
    Equality = 5,
    /// Includes `instanceof`.
    Relational = 6,
    Shift = 7,
    Additive = 8,
    Multiplicative = 9,
}

impl OperatorPrecedence {
    pub const LOWEST: OperatorPrecedence = OperatorPrecedence::LogicalOr;

    /// All levels, lowest first.
    pub const ALL: [OperatorPrecedence; 10] = [
        OperatorPrecedence::LogicalOr,
        OperatorPrecedence::LogicalAnd,
        OperatorPrecedence::BitwiseOr,
        OperatorPrecedence::BitwiseXor,
        OperatorPrecedence::BitwiseAnd,
        OperatorPrecedence::Equality,
        OperatorPrecedence::Relational,
        OperatorPrecedence::Shift,
        OperatorPrecedence::Additive,
        OperatorPrecedence::Multiplicative,
    ];
}

/// Get the precedence of a binary operator, or `None` if `op` is not one.
pub fn get_binary_operator_precedence(op: &str) -> Option<OperatorPrecedence> {
    let precedence = match op {
        "||" => OperatorPrecedence::LogicalOr,
        "&&" => OperatorPrecedence::LogicalAnd,
        "|" => OperatorPrecedence::BitwiseOr,
        "^" => OperatorPrecedence::BitwiseXor,
        "&" => OperatorPrecedence::BitwiseAnd,
        "==" | "!=" => OperatorPrecedence::Equality,
        "<" | ">" | "<=" | ">=" | "instanceof" => OperatorPrecedence::Relational,
        "<<" | ">>" | ">>>" => OperatorPrecedence::Shift,
        "+" | "-" => OperatorPrecedence::Additive,
        "*" | "/" | "%" => OperatorPrecedence::Multiplicative,
        _ => return None,
    };
    Some(precedence)
}

type PendingOperator = (String, Position, OperatorPrecedence);

/// Fold `first op1 operand1 op2 operand2 ...` into a tree of
/// [`BinaryOperation`]s. Tighter levels bind first; within a level the
/// operators associate to the left.
///
/// Returns `None` if an operator is not a binary operator or a type ends up
/// as a left operand.
pub fn build_binary_operation(first: Expression, rest: Vec<(String, Position, Operand)>) -> Option<Expression> {
    let mut operands = vec![Operand::Expression(first)];
    let mut pending: Vec<PendingOperator> = Vec::new();

    for (operator, position, operand) in rest {
        let precedence = get_binary_operator_precedence(&operator)?;
        while pending.last().is_some_and(|(_, _, top)| *top >= precedence) {
            reduce(&mut operands, &mut pending)?;
        }
        pending.push((operator, position, precedence));
        operands.push(operand);
    }
    while !pending.is_empty() {
        reduce(&mut operands, &mut pending)?;
    }

    match operands.pop()? {
        Operand::Expression(expression) => Some(expression),
        Operand::Type(_) => None,
    }
}

fn reduce(operands: &mut Vec<Operand>, pending: &mut Vec<PendingOperator>) -> Option<()> {
    let (operator, position, _) = pending.pop()?;
    let operandr = operands.pop()?;
    let operandl = match operands.pop()? {
        Operand::Expression(expression) => expression,
        Operand::Type(_) => return None,
    };
    let operation = BinaryOperation {
        operator,
        operandl,
        operandr,
        position: Some(position),
    };
    operands.push(Operand::Expression(operation.into()));
    Some(())
}
