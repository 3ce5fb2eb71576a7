//! A console math helper that checks candidate roots of algebraic
//! equations.
//!
//! The core is a small expression engine: [`tokenize`] splits equation
//! text into lexemes, [`to_postfix`] rearranges them into
//! reverse-Polish order, and [`evaluate`] reduces that to a number
//! under a set of parameter bindings. [`check_equation_equality`] and
//! [`validate_equation_syntax`] are the contract everything else calls.
//!
//! Around the core sit an equation/root store ([`JsonStore`]) and the
//! interactive [`Console`] the binary runs.

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod config;
mod console;
mod equation;
mod error;
mod eval;
mod parse;
mod store;

pub use config::{Config, ConfigError, CONFIG_ENV_VAR};
pub use console::Console;
pub use equation::{
    check_equation_equality, check_equation_equality_with_epsilon,
    evaluate_expression, validate_equation_syntax, DEFAULT_EPSILON,
    DEFAULT_ROOT_NAME,
};
pub use error::EvalError;
pub use eval::evaluate;
pub use parse::{to_postfix, tokenize, Lexeme, Operator};
pub use store::{
    EquationRecord, EquationRepository, JsonStore, RootRecord, StoreError,
};
