//! Semi-naive expander (C8): per-stratum fixed-point computation using
//! dependency-driven rule reactivation, per spec.md §4.8.
//!
//! Grounded on the teacher's `evaluate_stratum`/`evaluate_rule` general
//! engine path. The teacher's sparse-matrix fast path and its
//! truncate-and-warn safety guards are **not** carried forward: spec.md
//! excludes magic-sets/specialized rewriting (Non-goals, §1) and forbids
//! partial results from surviving silently (§7) — exceeding a configured
//! limit here is a hard [`DatalogError::InternalInvariant`], per
//! SPEC_FULL.md §4.13.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::bindings::Bindings;
use crate::error::{DatalogError, DatalogResult};
use crate::rule::Rule;
use crate::store::{FactStore, IndexedFactStore};
use crate::unify::{match_goals, reorder_goals};

/// Safety-valve limits for the expander, grounded on the teacher's
/// `MAX_ITERATIONS`/`MAX_SUBSTITUTIONS` constants.
#[derive(Clone, Copy, Debug)]
pub struct EvalLimits {
    pub max_iterations: usize,
    pub max_join_rows: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            max_join_rows: 100_000,
        }
    }
}

/// Expand `store` in place by running each stratum of `rules` to its
/// fixed point, in order.
pub fn expand_all(
    strata: &[Vec<Rule>],
    store: &mut IndexedFactStore,
    limits: EvalLimits,
) -> DatalogResult<()> {
    for (idx, stratum) in strata.iter().enumerate() {
        tracing::debug!(stratum = idx, rules = stratum.len(), "expanding stratum");
        expand_stratum(stratum, store, limits)?;
    }
    Ok(())
}

/// Run one stratum to its fixed point using semi-naive dependency-driven
/// rule reactivation (spec.md §4.8 steps 1–3).
fn expand_stratum(
    rules: &[Rule],
    store: &mut IndexedFactStore,
    limits: EvalLimits,
) -> DatalogResult<()> {
    if rules.is_empty() {
        return Ok(());
    }

    // Step 1: dependency index — which rules must be reconsidered when a
    // given predicate gains new facts.
    let mut rules_by_body_pred: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    for (i, rule) in rules.iter().enumerate() {
        for lit in &rule.body {
            rules_by_body_pred
                .entry(lit.predicate.clone())
                .or_default()
                .push(i);
        }
    }

    // Step 2: initial active set is every rule in the stratum.
    let mut active: FxHashSet<usize> = (0..rules.len()).collect();
    let mut iteration = 0usize;

    loop {
        iteration += 1;
        if iteration > limits.max_iterations {
            return Err(DatalogError::InternalInvariant(format!(
                "semi-naive expansion exceeded {} iterations without reaching a fixed point",
                limits.max_iterations
            )));
        }

        let mut newly_touched_predicates: FxHashSet<String> = FxHashSet::default();
        let mut produced_any = false;

        let mut to_add: Vec<crate::term::Expr> = Vec::new();
        for &rule_idx in &active {
            let rule = &rules[rule_idx];
            // Goals must be reordered the same way the query driver does
            // (query.rs): range-restriction (I2) only guarantees a body
            // variable appears *somewhere* in a positive literal, not that
            // it appears before a negated/built-in literal using it, so an
            // as-written rule body is not safe to feed straight to
            // match_goals.
            let reordered_body = reorder_goals(&rule.body);
            let bindings_list = match_goals(&reordered_body, store, &Bindings::root())?;
            if bindings_list.len() > limits.max_join_rows {
                return Err(DatalogError::InternalInvariant(format!(
                    "rule body for {} produced more than {} candidate bindings",
                    rule.head.predicate, limits.max_join_rows
                )));
            }
            for b in bindings_list {
                let head = rule.head.substitute(&b);
                if !head.is_ground() {
                    return Err(DatalogError::InternalInvariant(format!(
                        "rule head did not fully ground: {}",
                        head.display_string()
                    )));
                }
                if !store.get_facts(&head.predicate).contains(&&head) {
                    to_add.push(head);
                }
            }
        }

        for fact in to_add {
            if store.add(fact.clone()) {
                produced_any = true;
                newly_touched_predicates.insert(fact.predicate.clone());
            }
        }

        // Step 3b: no new facts -> fixed point reached.
        if !produced_any {
            tracing::debug!(iterations = iteration, "stratum reached fixed point");
            break;
        }

        // Step 3d: reactivate exactly the rules registered under the
        // predicate hashes of the newly added facts.
        let mut next_active = FxHashSet::default();
        for pred in &newly_touched_predicates {
            if let Some(rule_ixs) = rules_by_body_pred.get(pred) {
                next_active.extend(rule_ixs.iter().copied());
            }
        }
        tracing::trace!(
            iteration,
            new_predicates = newly_touched_predicates.len(),
            reactivated = next_active.len(),
            "semi-naive iteration"
        );
        active = next_active;
        if active.is_empty() {
            break;
        }
    }

    Ok(())
}
