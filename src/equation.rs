//! Equation-level checks built on the expression pipeline.
//!
//! An equation is two expressions joined by a single `=`. Checking a
//! candidate root means evaluating both sides under the same bindings
//! and comparing the results within a tolerance; validating syntax means
//! running the same check with throwaway placeholder bindings and only
//! caring whether anything raised.

use crate::{error::EvalError, eval, parse};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Largest absolute difference between the two sides that still counts
/// as equality.
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// The parameter name a single-unknown equation is written in.
pub const DEFAULT_ROOT_NAME: &str = "x";

/// Evaluate a single expression (no `=`) under the given bindings.
pub fn evaluate_expression(
    text: &str,
    bindings: &HashMap<String, f64>,
) -> Result<f64, EvalError> {
    evaluate_one_side(text, bindings, false)
}

/// Check an equation for equality within [`DEFAULT_EPSILON`].
pub fn check_equation_equality(
    text: &str,
    bindings: &HashMap<String, f64>,
) -> Result<bool, EvalError> {
    check_equality(text, bindings, DEFAULT_EPSILON, false)
}

/// Check an equation for equality within a caller-chosen `epsilon`.
pub fn check_equation_equality_with_epsilon(
    text: &str,
    bindings: &HashMap<String, f64>,
    epsilon: f64,
) -> Result<bool, EvalError> {
    check_equality(text, bindings, epsilon, false)
}

/// Confirm an equation is grammatically well-formed before any real root
/// is known.
///
/// Every name in `parameter_names` is bound to a placeholder `1.0` and
/// the equality check runs in dry-run mode, so a division that would hit
/// zero under the placeholders can't manufacture a spurious infinity.
/// The boolean outcome is meaningless and discarded; only a raised error
/// matters.
pub fn validate_equation_syntax(
    text: &str,
    parameter_names: &HashSet<String>,
) -> Result<(), EvalError> {
    let placeholders: HashMap<String, f64> = parameter_names
        .iter()
        .map(|name| (name.clone(), 1.0))
        .collect();

    check_equality(text, &placeholders, DEFAULT_EPSILON, true).map(|_| ())
}

fn check_equality(
    text: &str,
    bindings: &HashMap<String, f64>,
    epsilon: f64,
    dry_run: bool,
) -> Result<bool, EvalError> {
    debug!(
        "checking {:?} with bindings {:?} and epsilon {}",
        text, bindings, epsilon
    );

    if text.trim().is_empty() {
        return Err(EvalError::Grammar {
            reason: "the equation text is blank",
        });
    }

    // keep empty leading/trailing parts, so "1=1=" splits into three
    let sides: Vec<&str> = text.split('=').collect();
    if sides.len() != 2 {
        return Err(EvalError::Grammar {
            reason: "an equation needs exactly one \"=\"",
        });
    }
    if sides[0].trim().is_empty() {
        return Err(EvalError::Grammar {
            reason: "the left side of the equation is blank",
        });
    }
    if sides[1].trim().is_empty() {
        return Err(EvalError::Grammar {
            reason: "the right side of the equation is blank",
        });
    }

    let left = evaluate_one_side(sides[0], bindings, dry_run)?;
    let right = evaluate_one_side(sides[1], bindings, dry_run)?;
    debug!("left side = {}, right side = {}", left, right);

    Ok((left - right).abs() < epsilon)
}

fn evaluate_one_side(
    text: &str,
    bindings: &HashMap<String, f64>,
    dry_run: bool,
) -> Result<f64, EvalError> {
    let lexemes = parse::tokenize(text)?;
    let postfix = parse::to_postfix(lexemes)?;

    eval::evaluate(&postfix, bindings, dry_run)
}
