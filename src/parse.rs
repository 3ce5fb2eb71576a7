//! Lexical analysis and infix-to-postfix translation.
//!
//! The grammar is deliberately small:
//!
//! ```text
//! expression := operand | "(" expression ")"
//!             | "-" expression
//!             | expression ("+" | "-" | "*" | "/") expression
//! operand    := NUMBER | IDENTIFIER
//! ```
//!
//! [`tokenize`] splits raw text into [`Lexeme`]s, inserting an explicit
//! unary-minus marker where context calls for one, and [`to_postfix`]
//! rearranges the lexemes into reverse-Polish order with the classic
//! shunting-yard algorithm so the evaluator only ever needs one stack
//! pass.

use crate::error::EvalError;
use log::debug;
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};

/// The closed set of operator symbols.
///
/// Parentheses live in the table at precedence 0 so [`to_postfix`] can
/// treat them uniformly with the arithmetic operators. The set is fixed;
/// the `match`es below are the whole operator table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operator {
    OpenParen,
    CloseParen,
    Plus,
    Minus,
    Times,
    Divide,
    /// The unary-minus marker. Never written by the user; inserted by
    /// [`tokenize`] when a `-` can't have a left operand.
    Negate,
}

impl Operator {
    /// Classify a single character, or `None` for operand characters.
    fn from_char(c: char) -> Option<Operator> {
        match c {
            '(' => Some(Operator::OpenParen),
            ')' => Some(Operator::CloseParen),
            '+' => Some(Operator::Plus),
            '-' => Some(Operator::Minus),
            '*' => Some(Operator::Times),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }

    /// Binding strength. Equal precedence pops, which is what makes the
    /// same-precedence binaries left associative.
    fn precedence(self) -> u8 {
        match self {
            Operator::OpenParen | Operator::CloseParen => 0,
            Operator::Plus | Operator::Minus => 1,
            Operator::Times | Operator::Divide => 2,
            Operator::Negate => 3,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Operator::OpenParen => "(",
            Operator::CloseParen => ")",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Times => "*",
            Operator::Divide => "/",
            Operator::Negate => "~",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A minimal meaningful piece of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Lexeme {
    Operator(Operator),
    /// A numeric literal or parameter name, left uninterpreted until
    /// evaluation.
    Operand(SmolStr),
}

impl Display for Lexeme {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Lexeme::Operator(op) => write!(f, "{}", op),
            Lexeme::Operand(text) => write!(f, "{}", text),
        }
    }
}

/// Split expression text into an ordered lexeme sequence.
///
/// Consecutive letters, digits and decimal points accumulate into one
/// operand lexeme; whitespace between lexemes is skipped; anything else
/// must be a parenthesis or one of `+ - * /`. A `-` becomes the
/// unary-minus marker exactly when the previous lexeme was an operator
/// or an open parenthesis, or there was no previous lexeme at all.
pub fn tokenize(text: &str) -> Result<Vec<Lexeme>, EvalError> {
    let mut lexemes = Vec::new();
    let mut pending = String::new();
    let mut next_minus_is_unary = true;

    for (index, c) in text.chars().enumerate() {
        if c.is_alphanumeric() || c == '.' {
            pending.push(c);
            continue;
        }

        if !pending.is_empty() {
            lexemes.push(Lexeme::Operand(SmolStr::new(&pending)));
            pending.clear();
            next_minus_is_unary = false;
        }

        if c.is_whitespace() {
            continue;
        }

        match Operator::from_char(c) {
            Some(Operator::OpenParen) => {
                lexemes.push(Lexeme::Operator(Operator::OpenParen));
                next_minus_is_unary = true;
            },
            Some(Operator::CloseParen) => {
                lexemes.push(Lexeme::Operator(Operator::CloseParen));
                next_minus_is_unary = false;
            },
            Some(Operator::Minus) if next_minus_is_unary => {
                lexemes.push(Lexeme::Operator(Operator::Negate));
                next_minus_is_unary = true;
            },
            Some(op) => {
                lexemes.push(Lexeme::Operator(op));
                next_minus_is_unary = true;
            },
            None => {
                return Err(EvalError::Lexical {
                    character: c,
                    position: index + 1,
                });
            },
        }
    }

    if !pending.is_empty() {
        lexemes.push(Lexeme::Operand(SmolStr::new(&pending)));
    }

    debug!("tokenized {:?} into {:?}", text, lexemes);

    Ok(lexemes)
}

/// Rearrange an infix lexeme sequence into reverse-Polish order.
///
/// One auxiliary operator stack; operands pass straight through. An
/// operator pops everything of greater or equal precedence before being
/// pushed, so a pushed unary minus (the highest precedence) is popped
/// only by another unary minus or by the final flush.
///
/// Only a close parenthesis that drains the stack is reported here; any
/// parenthesis that survives into the output is caught by the evaluator.
pub fn to_postfix(lexemes: Vec<Lexeme>) -> Result<Vec<Lexeme>, EvalError> {
    let mut output = Vec::with_capacity(lexemes.len());
    let mut stack: Vec<Operator> = Vec::new();

    for lexeme in lexemes {
        let op = match lexeme {
            Lexeme::Operand(_) => {
                output.push(lexeme);
                continue;
            },
            Lexeme::Operator(op) => op,
        };

        if stack.is_empty() || op == Operator::OpenParen {
            stack.push(op);
        } else if op == Operator::CloseParen {
            // pop everything back to the matching open parenthesis,
            // which is discarded rather than emitted
            loop {
                match stack.pop() {
                    Some(Operator::OpenParen) => break,
                    Some(top) => output.push(Lexeme::Operator(top)),
                    None => {
                        return Err(EvalError::Structural {
                            reason: "unbalanced parentheses",
                        });
                    },
                }
            }
        } else {
            while let Some(&top) = stack.last() {
                if op.precedence() > top.precedence() {
                    break;
                }
                stack.pop();
                output.push(Lexeme::Operator(top));
            }
            stack.push(op);
        }
    }

    while let Some(op) = stack.pop() {
        output.push(Lexeme::Operator(op));
    }

    debug!("postfix order: {:?}", output);

    Ok(output)
}

#[cfg(test)]
mod tokenizer_tests {
    use super::*;

    macro_rules! tokenize_test {
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let got = tokenize($src).unwrap();
                let got: Vec<String> =
                    got.iter().map(ToString::to_string).collect();

                assert_eq!(got, $should_be);
            }
        };
    }

    tokenize_test!(open_paren, "(", vec!["("]);
    tokenize_test!(close_paren, ")", vec![")"]);
    tokenize_test!(plus, "+", vec!["+"]);
    tokenize_test!(times, "*", vec!["*"]);
    tokenize_test!(divide, "/", vec!["/"]);
    tokenize_test!(single_digit_integer, "3", vec!["3"]);
    tokenize_test!(simple_decimal, "3.14", vec!["3.14"]);
    tokenize_test!(simple_identifier, "x", vec!["x"]);
    tokenize_test!(longer_identifier, "hello", vec!["hello"]);
    tokenize_test!(whitespace_is_skipped, " 1 +  2 ", vec!["1", "+", "2"]);
    tokenize_test!(
        identifier_ends_at_operator,
        "var5*2",
        vec!["var5", "*", "2"]
    );

    tokenize_test!(leading_minus_is_unary, "-1", vec!["~", "1"]);
    tokenize_test!(minus_after_operand_is_binary, "1-2", vec!["1", "-", "2"]);
    tokenize_test!(
        minus_after_operator_is_unary,
        "x * -1",
        vec!["x", "*", "~", "1"]
    );
    tokenize_test!(
        minus_after_open_paren_is_unary,
        "(-x)",
        vec!["(", "~", "x", ")"]
    );
    tokenize_test!(
        minus_after_close_paren_is_binary,
        "(1)-2",
        vec!["(", "1", ")", "-", "2"]
    );
    tokenize_test!(
        doubled_unary_minus,
        "-(-x + 2)",
        vec!["~", "(", "~", "x", "+", "2", ")"]
    );

    #[test]
    fn rejects_characters_outside_the_grammar() {
        let got = tokenize("1 + 2 ^ 3").unwrap_err();

        assert_eq!(
            got,
            EvalError::Lexical {
                character: '^',
                position: 7,
            }
        );
    }

    #[test]
    fn empty_text_has_no_lexemes() {
        assert!(tokenize("").unwrap().is_empty());
    }
}
