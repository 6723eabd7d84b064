//! Rule and fact validation (C5), per spec.md §4.5.
//!
//! Generalizes the teacher's `Rule::is_safe` (which only checks head
//! variables against positive body variables) to the full range-restriction
//! invariant I2: every variable in the head, in a negated body literal, or
//! in a built-in body literal must also appear in some positive,
//! non-built-in body literal.

use crate::error::{DatalogError, DatalogResult};
use crate::rule::Rule;
use crate::term::Expr;

/// Validate a fact: must be ground and non-negated (I1).
pub fn validate_fact(fact: &Expr) -> DatalogResult<()> {
    if fact.is_builtin() {
        return Err(DatalogError::ValidationError(format!(
            "fact predicate cannot be a built-in: {}",
            fact.predicate
        )));
    }
    if fact.negated {
        return Err(DatalogError::ValidationError(format!(
            "fact cannot be negated: {}",
            fact.display_string()
        )));
    }
    if !fact.is_ground() {
        return Err(DatalogError::ValidationError(format!(
            "fact must be ground: {}",
            fact.display_string()
        )));
    }
    Ok(())
}

/// Validate a rule: non-negated/non-built-in head, non-empty body, and
/// range-restriction (I2).
pub fn validate_rule(rule: &Rule) -> DatalogResult<()> {
    if rule.head.negated {
        return Err(DatalogError::ValidationError(format!(
            "rule head cannot be negated: {}",
            rule.head.display_string()
        )));
    }
    if rule.head.is_builtin() {
        return Err(DatalogError::ValidationError(format!(
            "rule head cannot be a built-in predicate: {}",
            rule.head.display_string()
        )));
    }
    if rule.body.is_empty() {
        return Err(DatalogError::ValidationError(format!(
            "rule body must be non-empty: {}",
            rule.head.display_string()
        )));
    }

    let safe_vars = rule.positive_body_variables();

    for v in rule.head.variables() {
        if !safe_vars.contains(v) {
            return Err(DatalogError::ValidationError(format!(
                "rule not range-restricted: head variable {v} does not appear in a positive body literal"
            )));
        }
    }
    for lit in &rule.body {
        if lit.negated || lit.is_builtin() {
            for v in lit.variables() {
                if !safe_vars.contains(v) {
                    return Err(DatalogError::ValidationError(format!(
                        "rule not range-restricted: variable {v} in {} does not appear in a positive body literal",
                        lit.display_string()
                    )));
                }
            }
        }
    }
    Ok(())
}
