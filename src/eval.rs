//! Stack evaluation of postfix lexeme sequences.

use crate::{
    error::EvalError,
    parse::{Lexeme, Operator},
};
use log::debug;
use smol_str::SmolStr;
use std::collections::HashMap;

/// Reduce a postfix sequence to a single value.
///
/// Binary operators pop their right operand first, then their left;
/// the unary-minus marker pops one value and pushes its negation.
/// Operand lexemes are looked up in `bindings` before being parsed as
/// numbers, so a binding may shadow a literal of the same spelling.
///
/// With `dry_run` set every divisor is forced to 1, which keeps a
/// placeholder binding from manufacturing an infinity while the caller
/// only cares about grammar. Without it, division by zero is not an
/// error: IEEE-754 hands back a signed infinity, which participates in
/// any later comparison like an ordinary value.
pub fn evaluate(
    postfix: &[Lexeme],
    bindings: &HashMap<String, f64>,
    dry_run: bool,
) -> Result<f64, EvalError> {
    let mut stack: Vec<f64> = Vec::new();

    for lexeme in postfix {
        match lexeme {
            Lexeme::Operator(Operator::OpenParen)
            | Lexeme::Operator(Operator::CloseParen) => {
                // only an unmatched parenthesis can reach postfix order
                return Err(EvalError::Structural {
                    reason: "unbalanced parentheses",
                });
            },
            Lexeme::Operator(Operator::Negate) => {
                let value = pop(&mut stack)?;
                stack.push(-value);
            },
            Lexeme::Operator(op) => {
                let right = pop(&mut stack)?;
                let left = pop(&mut stack)?;
                stack.push(apply(*op, left, right, dry_run));
            },
            Lexeme::Operand(text) => {
                stack.push(operand_value(text, bindings)?);
            },
        }
    }

    let result = pop(&mut stack)?;
    if !stack.is_empty() {
        return Err(EvalError::Structural {
            reason: "operands left over after evaluation",
        });
    }

    debug!("postfix sequence evaluated to {}", result);

    Ok(result)
}

fn apply(op: Operator, left: f64, right: f64, dry_run: bool) -> f64 {
    match op {
        Operator::Plus => left + right,
        Operator::Minus => left - right,
        Operator::Times => left * right,
        Operator::Divide => {
            let divisor = if dry_run { 1.0 } else { right };
            left / divisor
        },
        Operator::OpenParen | Operator::CloseParen | Operator::Negate => {
            unreachable!("{:?} is not a binary operator", op)
        },
    }
}

fn operand_value(
    text: &SmolStr,
    bindings: &HashMap<String, f64>,
) -> Result<f64, EvalError> {
    if let Some(&value) = bindings.get(text.as_str()) {
        return Ok(value);
    }

    text.as_str().parse().map_err(|_| EvalError::Operand {
        lexeme: text.clone(),
    })
}

fn pop(stack: &mut Vec<f64>) -> Result<f64, EvalError> {
    stack.pop().ok_or(EvalError::Structural {
        reason: "the expression ran out of operands",
    })
}
