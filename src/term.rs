//! Terms and expressions (literals) — the Datalog data model.
//!
//! A [`Term`] is a bare string; whether it denotes a variable or a
//! constant is determined structurally from its first character, never
//! tagged separately. An [`Expr`] (expression / literal) pairs a predicate
//! name with an ordered sequence of terms and a negation flag.

use smallvec::SmallVec;
use std::fmt;

use crate::bindings::Bindings;
use crate::error::{DatalogError, DatalogResult};

/// Leading marker prepended to quoted string constants so that, e.g., the
/// bareword `foo` and the quoted `"foo"` never unify even though both are
/// constants. Stripped only by [`Term::display`].
pub const QUOTE_MARKER: char = '"';

/// A Datalog term: a variable or a constant, both represented as strings.
///
/// `Var` iff the first character is an ASCII upper-case letter.
pub type Term = String;

/// True iff `term` is a variable (first character is an ASCII upper-case
/// letter).
pub fn is_variable(term: &str) -> bool {
    term.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Canonical built-in predicate names.
pub const BUILTIN_PREDICATES: &[&str] = &["=", "<>", "<", "<=", ">", ">="];

/// True iff `predicate` names a built-in (its first character is neither a
/// letter, digit, nor quote).
pub fn is_builtin_predicate(predicate: &str) -> bool {
    match predicate.chars().next() {
        Some(c) => !c.is_alphanumeric() && c != QUOTE_MARKER,
        None => false,
    }
}

/// Normalize `!=` to `<>` at construction time, per spec.
fn normalize_predicate(predicate: &str) -> String {
    if predicate == "!=" {
        "<>".to_string()
    } else {
        predicate.to_string()
    }
}

/// A Datalog expression / literal: `predicate(t1, t2, ...)`, optionally
/// negated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Expr {
    pub predicate: String,
    pub terms: SmallVec<[Term; 4]>,
    pub negated: bool,
}

impl Expr {
    /// Construct a new expression. Normalizes `!=` to `<>`.
    pub fn new(predicate: impl Into<String>, terms: Vec<Term>, negated: bool) -> Self {
        Self {
            predicate: normalize_predicate(&predicate.into()),
            terms: SmallVec::from_vec(terms),
            negated,
        }
    }

    /// Positive (non-negated) constructor shorthand.
    pub fn pos(predicate: impl Into<String>, terms: Vec<Term>) -> Self {
        Self::new(predicate, terms, false)
    }

    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(|t| !is_variable(t))
    }

    pub fn is_builtin(&self) -> bool {
        is_builtin_predicate(&self.predicate)
    }

    /// Variables occurring anywhere in this expression, in first-occurrence
    /// order.
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut vars = Vec::new();
        for t in &self.terms {
            if is_variable(t) && seen.insert(t.as_str()) {
                vars.push(t.as_str());
            }
        }
        vars
    }

    /// A stable key for predicate-indexed lookups: `(predicate, arity)` so
    /// that predicates of distinct arities never collide (invariant I4).
    pub fn index_key(&self) -> (String, usize) {
        (self.predicate.clone(), self.arity())
    }

    /// Return a new expression with every bound variable replaced by its
    /// binding. Unbound variables and constants are left as-is. The
    /// negation flag is preserved.
    pub fn substitute(&self, bindings: &Bindings) -> Expr {
        let terms = self
            .terms
            .iter()
            .map(|t| {
                if is_variable(t) {
                    match bindings.get(t) {
                        Some(v) => v.to_string(),
                        None => t.clone(),
                    }
                } else {
                    t.clone()
                }
            })
            .collect::<Vec<_>>();
        Expr {
            predicate: self.predicate.clone(),
            terms: SmallVec::from_vec(terms),
            negated: self.negated,
        }
    }

    /// Render this expression the way the surface syntax would, stripping
    /// any internal quote-prefix marker from constants.
    pub fn display_string(&self) -> String {
        let terms: Vec<String> = self.terms.iter().map(|t| display_term(t)).collect();
        let mut s = String::new();
        if self.negated {
            s.push_str("not ");
        }
        s.push_str(&self.predicate);
        s.push('(');
        s.push_str(&terms.join(", "));
        s.push(')');
        s
    }
}

/// Strip the internal quote-prefix marker from a term for display, per the
/// Open Question decision recorded in DESIGN.md.
pub fn display_term(term: &str) -> String {
    match term.strip_prefix(QUOTE_MARKER) {
        Some(rest) => rest.to_string(),
        None => term.to_string(),
    }
}

/// Try to parse a term as a number, per spec.md §4.1's number syntax:
/// optional sign, digits, optional fraction, optional exponent.
pub fn parse_number(term: &str) -> Option<f64> {
    term.parse::<f64>().ok()
}

/// Format a number the way the printer does: integral doubles are printed
/// without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Evaluate a built-in literal (`expr.arity()` must be 2) under `bindings`,
/// returning whether it holds.
///
/// Resolves each operand through `bindings` if it is a bound variable
/// first, per spec.md §4.1.
pub fn eval_builtin(expr: &Expr, bindings: &Bindings) -> DatalogResult<bool> {
    debug_assert_eq!(expr.arity(), 2, "built-ins are strictly binary");

    let resolve = |t: &str| -> Term {
        if is_variable(t) {
            bindings.get(t).map(|v| v.to_string()).unwrap_or_else(|| t.to_string())
        } else {
            t.to_string()
        }
    };

    let lhs_raw = &expr.terms[0];
    let rhs_raw = &expr.terms[1];
    let lhs = resolve(lhs_raw);
    let rhs = resolve(rhs_raw);
    let lhs_is_var = is_variable(&lhs);
    let rhs_is_var = is_variable(&rhs);

    match expr.predicate.as_str() {
        "=" => {
            if lhs_is_var && rhs_is_var {
                return Err(DatalogError::UnboundBuiltin(format!(
                    "= with two unbound variables: {} = {}",
                    lhs_raw, rhs_raw
                )));
            }
            // Binding is performed by the caller (matcher), which needs to
            // know which side was the free variable; here we only report
            // truth for already-ground comparisons.
            if lhs_is_var || rhs_is_var {
                return Ok(true);
            }
            Ok(values_equal(&lhs, &rhs))
        }
        "<>" => {
            if lhs_is_var || rhs_is_var {
                return Err(DatalogError::UnboundBuiltin(format!(
                    "<> requires both operands bound: {} <> {}",
                    lhs_raw, rhs_raw
                )));
            }
            Ok(!values_equal(&lhs, &rhs))
        }
        "<" | "<=" | ">" | ">=" => {
            if lhs_is_var || rhs_is_var {
                return Err(DatalogError::UnboundBuiltin(format!(
                    "{} requires both operands bound: {} {} {}",
                    expr.predicate, lhs_raw, expr.predicate, rhs_raw
                )));
            }
            let l = parse_number(&lhs).unwrap_or(0.0);
            let r = parse_number(&rhs).unwrap_or(0.0);
            Ok(match expr.predicate.as_str() {
                "<" => l < r,
                "<=" => l <= r,
                ">" => l > r,
                ">=" => l >= r,
                _ => unreachable!(),
            })
        }
        other => Err(DatalogError::InternalInvariant(format!(
            "not a built-in predicate: {other}"
        ))),
    }
}

/// Numeric-if-possible, else string, equality comparison.
fn values_equal(lhs: &str, rhs: &str) -> bool {
    match (parse_number(lhs), parse_number(rhs)) {
        (Some(l), Some(r)) => l == r,
        _ => lhs == rhs,
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_string())
    }
}
