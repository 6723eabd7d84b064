//! Query and deletion driver (C9), per spec.md §4.9.
//!
//! Grounded on the teacher's `evaluate()` (stratum-ordered execution),
//! composed here with a relevance-pruning pass before evaluation — no
//! workspace crate prunes by relevance; this is new, grounded directly on
//! spec.md §4.9 step 1's fixed-point closure algorithm.

use rustc_hash::FxHashSet;

use crate::bindings::Bindings;
use crate::error::DatalogResult;
use crate::expand::{expand_all, EvalLimits};
use crate::rule::Rule;
use crate::store::{FactStore, IndexedFactStore};
use crate::stratify::stratify;
use crate::term::Expr;
use crate::unify::{match_goals, reorder_goals};

/// A single query answer: a flattened, detached variable-binding map.
pub type Answer = rustc_hash::FxHashMap<String, String>;

/// Compute the relevant predicate set by closure (spec.md §4.9 step 1):
/// start with the goal predicates, then for each rule whose head predicate
/// is already relevant, add every body literal's predicate, to a fixed
/// point.
fn relevant_predicates(goals: &[Expr], rules: &[Rule]) -> FxHashSet<String> {
    let mut relevant: FxHashSet<String> = goals.iter().map(|g| g.predicate.clone()).collect();
    loop {
        let mut added = false;
        for rule in rules {
            if relevant.contains(&rule.head.predicate) {
                for lit in &rule.body {
                    if relevant.insert(lit.predicate.clone()) {
                        added = true;
                    }
                }
            }
        }
        if !added {
            break;
        }
    }
    relevant
}

/// Run a query: build a relevance-pruned scratch store, expand it, match
/// the reordered goal list, and return one flattened answer per successful
/// derivation.
pub fn run_query(
    goals: &[Expr],
    initial: &Bindings,
    edb: &IndexedFactStore,
    rules: &[Rule],
    limits: EvalLimits,
) -> DatalogResult<Vec<Answer>> {
    let relevant = relevant_predicates(goals, rules);
    tracing::debug!(relevant = relevant.len(), "computed relevant predicate set");

    let selected_rules: Vec<Rule> = rules
        .iter()
        .filter(|r| relevant.contains(&r.head.predicate))
        .cloned()
        .collect();

    let mut scratch = IndexedFactStore::new();
    for fact in edb.all_facts() {
        if relevant.contains(&fact.predicate) {
            scratch.add(fact.clone());
        }
    }

    let strata = stratify(&selected_rules)?;
    expand_all(&strata.strata, &mut scratch, limits)?;

    let reordered = reorder_goals(goals);
    let results = match_goals(&reordered, &scratch, initial)?;

    let answers: Vec<Answer> = results
        .into_iter()
        .map(|b| {
            let flat = b.flatten();
            let mut answer = Answer::default();
            for (k, v) in flat.iter() {
                answer.insert(k, crate::term::display_term(&v));
            }
            tracing::trace!(?answer, "query answer");
            answer
        })
        .collect();
    Ok(answers)
}

/// Delete the ground facts matching any answer to `goals` under `bindings`
/// from `edb`. Semantics: the conjunction of goals acts as a filter — for
/// every successful answer, every goal literal is grounded by substitution
/// and the resulting fact is removed.
pub fn run_delete(
    goals: &[Expr],
    initial: &Bindings,
    edb: &mut IndexedFactStore,
    rules: &[Rule],
    limits: EvalLimits,
) -> DatalogResult<usize> {
    let relevant = relevant_predicates(goals, rules);
    let selected_rules: Vec<Rule> = rules
        .iter()
        .filter(|r| relevant.contains(&r.head.predicate))
        .cloned()
        .collect();

    let mut scratch = IndexedFactStore::new();
    for fact in edb.all_facts() {
        if relevant.contains(&fact.predicate) {
            scratch.add(fact.clone());
        }
    }
    let strata = stratify(&selected_rules)?;
    expand_all(&strata.strata, &mut scratch, limits)?;

    let reordered = reorder_goals(goals);
    let results = match_goals(&reordered, &scratch, initial)?;

    let mut removed = 0usize;
    for b in &results {
        let flat = b.flatten();
        for goal in goals {
            let grounded = goal.substitute(&flat);
            if grounded.is_ground() && edb.remove(&grounded) {
                removed += 1;
            }
        }
    }
    Ok(removed)
}
