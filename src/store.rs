//! Indexed fact store (C2): a set of ground [`Expr`]s indexed by predicate
//! for O(1) predicate lookup, per spec.md §4.2.
//!
//! [`FactStore`] is the abstract EDB-provider contract named in spec.md
//! §6 (`getFacts`/`allFacts`/`add`/`remove`); [`IndexedFactStore`] is the
//! crate's own in-memory implementation, generalized from the teacher's
//! `Relation`/`DatalogProgram::edb` (which only stores flat constant
//! tuples) to full ground `Expr`s so the negation flag and arbitrary arity
//! survive structural equality (invariant I1).

use rustc_hash::FxHashMap;

use crate::term::Expr;

/// Abstract fact-store contract (spec.md §6). An external caller could
/// supply their own implementation without touching the evaluator core.
pub trait FactStore {
    /// All facts for a given predicate name, regardless of arity.
    fn get_facts(&self, predicate: &str) -> Vec<&Expr>;
    /// Every fact in the store.
    fn all_facts(&self) -> Vec<&Expr>;
    /// Insert `fact`; returns `true` if it was new (idempotent under
    /// structural equality).
    fn add(&mut self, fact: Expr) -> bool;
    /// Remove `fact` by structural equality; returns `true` if it was
    /// present.
    fn remove(&mut self, fact: &Expr) -> bool;
}

/// An in-memory fact store keyed by predicate name, generalizing the
/// teacher's per-predicate `Relation` map.
#[derive(Clone, Debug, Default)]
pub struct IndexedFactStore {
    by_predicate: FxHashMap<String, Vec<Expr>>,
}

impl IndexedFactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predicate names currently present in the index.
    pub fn indexes(&self) -> impl Iterator<Item = &str> {
        self.by_predicate.keys().map(|s| s.as_str())
    }

    /// Insert every fact of `other`; returns whether anything new was
    /// added (C2's `addAll` contract).
    pub fn add_all(&mut self, facts: impl IntoIterator<Item = Expr>) -> bool {
        let mut added = false;
        for f in facts {
            if self.add(f) {
                added = true;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.by_predicate.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FactStore for IndexedFactStore {
    fn get_facts(&self, predicate: &str) -> Vec<&Expr> {
        self.by_predicate
            .get(predicate)
            .map(|v| v.iter().collect())
            .unwrap_or_default()
    }

    fn all_facts(&self) -> Vec<&Expr> {
        self.by_predicate.values().flatten().collect()
    }

    fn add(&mut self, fact: Expr) -> bool {
        let bucket = self.by_predicate.entry(fact.predicate.clone()).or_default();
        if bucket.contains(&fact) {
            false
        } else {
            bucket.push(fact);
            true
        }
    }

    fn remove(&mut self, fact: &Expr) -> bool {
        if let Some(bucket) = self.by_predicate.get_mut(&fact.predicate) {
            let before = bucket.len();
            bucket.retain(|f| f != fact);
            let changed = bucket.len() != before;
            if bucket.is_empty() {
                self.by_predicate.remove(&fact.predicate);
            }
            return changed;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(p: &str, args: &[&str]) -> Expr {
        Expr::pos(p, args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn add_is_idempotent() {
        let mut s = IndexedFactStore::new();
        assert!(s.add(fact("parent", &["a", "b"])));
        assert!(!s.add(fact("parent", &["a", "b"])));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn get_facts_filters_by_predicate() {
        let mut s = IndexedFactStore::new();
        s.add(fact("parent", &["a", "b"]));
        s.add(fact("sibling", &["a", "c"]));
        assert_eq!(s.get_facts("parent").len(), 1);
        assert_eq!(s.get_facts("sibling").len(), 1);
        assert_eq!(s.get_facts("nonexistent").len(), 0);
    }

    #[test]
    fn remove_deletes_by_structural_equality() {
        let mut s = IndexedFactStore::new();
        s.add(fact("parent", &["a", "b"]));
        assert!(s.remove(&fact("parent", &["a", "b"])));
        assert_eq!(s.len(), 0);
        assert!(!s.remove(&fact("parent", &["a", "b"])));
    }

    #[test]
    fn distinct_arities_do_not_collide() {
        let mut s = IndexedFactStore::new();
        s.add(Expr::pos("p", vec!["a".into()]));
        s.add(Expr::pos("p", vec!["a".into(), "b".into()]));
        assert_eq!(s.get_facts("p").len(), 2);
    }

    #[test]
    fn add_all_reports_whether_anything_new() {
        let mut s = IndexedFactStore::new();
        assert!(s.add_all(vec![fact("p", &["a"]), fact("p", &["b"])]));
        assert!(!s.add_all(vec![fact("p", &["a"])]));
    }
}
