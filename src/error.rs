//! The error taxonomy shared by the whole expression pipeline.

use smol_str::SmolStr;
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Why a piece of equation text could not be evaluated.
///
/// Each variant is one machine-readable kind; the payload carries what a
/// caller needs to build its own message. The description produced by
/// [`Display`] is never localized here.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A character outside the grammar's alphabet, with its 1-based
    /// position in the expression text.
    Lexical { character: char, position: usize },
    /// Unbalanced parentheses, or a postfix sequence that doesn't reduce
    /// to exactly one value.
    Structural { reason: &'static str },
    /// Blank equation text, not exactly one `=`, or a blank side.
    Grammar { reason: &'static str },
    /// An operand that is neither a bound parameter nor a parseable
    /// number.
    Operand { lexeme: SmolStr },
}

impl Display for EvalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Lexical {
                character,
                position,
            } => write!(
                f,
                "unexpected character {:?} at position {}",
                character, position
            ),
            EvalError::Structural { reason } => {
                write!(f, "malformed expression: {}", reason)
            },
            EvalError::Grammar { reason } => {
                write!(f, "malformed equation: {}", reason)
            },
            EvalError::Operand { lexeme } => write!(
                f,
                "operand \"{}\" is neither a known parameter nor a number",
                lexeme
            ),
        }
    }
}

impl Error for EvalError {}
