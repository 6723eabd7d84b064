//! Unifier and conjunctive goal matcher (C7), per spec.md §4.7.
//!
//! Grounded on the teacher's `unify`/`evaluate_literal` (positive join via
//! per-position equality-or-bind, negation-as-failure scan over the whole
//! candidate set), generalized here to scoped [`Bindings`] instead of a
//! cloned flat map, and extended with built-in literal dispatch (the
//! teacher's engine has no built-ins at all).

use crate::bindings::Bindings;
use crate::error::DatalogResult;
use crate::store::FactStore;
use crate::term::{eval_builtin, is_variable, Expr};

/// Unify `expr` against ground `fact` under `bindings`, extending
/// `bindings` in place on success. Returns `false` (and leaves `bindings`
/// untouched in all positions it didn't already commit to) on failure. The
/// caller is expected to operate on a fresh child scope so a failed
/// attempt can simply be discarded.
///
/// Predicates and arity must match (invariant I4); variables in `expr` not
/// yet bound in scope are bound to the fact's corresponding term, already
/// -bound variables must agree, and constants must match exactly.
pub fn unify(expr: &Expr, fact: &Expr, bindings: &mut Bindings) -> DatalogResult<bool> {
    if expr.predicate != fact.predicate || expr.arity() != fact.arity() {
        return Ok(false);
    }
    for (e_term, f_term) in expr.terms.iter().zip(fact.terms.iter()) {
        if is_variable(e_term) {
            match bindings.get(e_term) {
                Some(bound) => {
                    if bound != f_term.as_str() {
                        return Ok(false);
                    }
                }
                None => {
                    bindings.insert(e_term.clone(), f_term.clone())?;
                }
            }
        } else if e_term != f_term {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Reorder goals so positive non-built-in literals come first (stable
/// order preserved), then negated literals and non-`=` built-ins in
/// original order. `=` literals are left in their original position, since
/// `=` is the only built-in allowed to bind a variable and deferring it
/// too late would break safety for rules that rely on it to ground a
/// variable before a later literal consumes it.
pub fn reorder_goals(goals: &[Expr]) -> Vec<Expr> {
    let is_equals = |g: &Expr| g.is_builtin() && g.predicate == "=";

    // Stable partition of the non-`=` goals: positives first, then
    // negated literals and other built-ins, in original order.
    let mut positives = Vec::new();
    let mut rest = Vec::new();
    for g in goals.iter().filter(|g| !is_equals(g)) {
        if !g.negated && !g.is_builtin() {
            positives.push(g.clone());
        } else {
            rest.push(g.clone());
        }
    }
    let mut filler = positives.into_iter().chain(rest).collect::<Vec<_>>().into_iter();

    // Rebuild the full sequence, pinning each `=` literal at its original
    // absolute index and filling every other slot from `filler`.
    goals
        .iter()
        .map(|g| {
            if is_equals(g) {
                g.clone()
            } else {
                filler.next().expect("filler has one entry per non-= goal")
            }
        })
        .collect()
}

/// Recursively match a conjunctive goal list against `facts`, starting
/// from `bindings`, yielding one flattened [`Bindings`] per successful
/// derivation path.
pub fn match_goals(
    goals: &[Expr],
    facts: &dyn FactStore,
    bindings: &Bindings,
) -> DatalogResult<Vec<Bindings>> {
    let Some((first, tail)) = goals.split_first() else {
        return Ok(vec![bindings.clone()]);
    };

    if first.is_builtin() {
        let mut scope = bindings.child();
        let grounded = first.substitute(&scope);
        let mut holds = eval_builtin(&grounded, &scope)?;

        // `=` can bind a free variable rather than merely testing truth.
        if first.predicate == "=" && !first.negated {
            let lhs = &grounded.terms[0];
            let rhs = &grounded.terms[1];
            if is_variable(lhs) && !is_variable(rhs) {
                scope.insert(lhs.clone(), rhs.clone())?;
                holds = true;
            } else if is_variable(rhs) && !is_variable(lhs) {
                scope.insert(rhs.clone(), lhs.clone())?;
                holds = true;
            }
        }

        if holds != first.negated {
            return match_goals(tail, facts, &scope);
        }
        return Ok(vec![]);
    }

    if !first.negated {
        let mut results = Vec::new();
        for candidate in facts.get_facts(&first.predicate) {
            let mut scope = bindings.child();
            if unify(first, candidate, &mut scope)? {
                results.extend(match_goals(tail, facts, &scope)?);
            }
        }
        Ok(results)
    } else {
        // Negation-as-failure: ground the goal under current bindings,
        // then check no candidate fact unifies against a throwaway scope.
        let grounded = first.substitute(bindings);
        let mut any_match = false;
        for candidate in facts.get_facts(&grounded.predicate) {
            let mut scope = bindings.child();
            if unify(&grounded, candidate, &mut scope)? {
                any_match = true;
                break;
            }
        }
        if any_match {
            Ok(vec![])
        } else {
            match_goals(tail, facts, bindings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::IndexedFactStore;

    fn fact(p: &str, args: &[&str]) -> Expr {
        Expr::pos(p, args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn unify_binds_unbound_variable() {
        let mut b = Bindings::root();
        let e = Expr::pos("parent", vec!["X".into(), "b".into()]);
        let f = fact("parent", &["a", "b"]);
        assert!(unify(&e, &f, &mut b).unwrap());
        assert_eq!(b.get("X"), Some("a"));
    }

    #[test]
    fn unify_rejects_conflicting_binding() {
        let mut b = Bindings::root();
        b.insert("X".into(), "z".into()).unwrap();
        let e = Expr::pos("parent", vec!["X".into(), "b".into()]);
        let f = fact("parent", &["a", "b"]);
        assert!(!unify(&e, &f, &mut b).unwrap());
    }

    #[test]
    fn unify_rejects_arity_mismatch() {
        let mut b = Bindings::root();
        let e = Expr::pos("parent", vec!["X".into()]);
        let f = fact("parent", &["a", "b"]);
        assert!(!unify(&e, &f, &mut b).unwrap());
    }

    #[test]
    fn match_goals_conjunction_over_facts() {
        let mut store = IndexedFactStore::new();
        store.add(fact("parent", &["a", "b"]));
        store.add(fact("parent", &["b", "c"]));
        let goals = vec![
            Expr::pos("parent", vec!["X".into(), "Y".into()]),
            Expr::pos("parent", vec!["Y".into(), "Z".into()]),
        ];
        let results = match_goals(&goals, &store, &Bindings::root()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].get("X"), Some("a"));
        assert_eq!(results[0].get("Z"), Some("c"));
    }

    #[test]
    fn match_goals_negation_as_failure() {
        let mut store = IndexedFactStore::new();
        store.add(fact("bird", &["tweety"]));
        store.add(fact("bird", &["opus"]));
        store.add(fact("penguin", &["opus"]));
        let goals = vec![
            Expr::pos("bird", vec!["X".into()]),
            Expr::new("penguin", vec!["X".into()], true),
        ];
        let results = match_goals(&goals, &store, &Bindings::root()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].get("X"), Some("tweety"));
    }

    #[test]
    fn reorder_puts_positives_first_and_pins_equals() {
        let goals = vec![
            Expr::new("q", vec!["X".into()], true),
            Expr::pos("p", vec!["X".into(), "Y".into()]),
            Expr::pos("=", vec!["Y".into(), "1".into()]),
        ];
        let reordered = reorder_goals(&goals);
        assert_eq!(reordered[0].predicate, "p");
    }
}
