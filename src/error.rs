//! Error kinds for the core engine, per spec.md §7.
//!
//! Mirrors the shape of `StorageError`/`StorageResult` in the teacher
//! workspace's `storage` crate: one `thiserror`-derived enum, one result
//! alias, every fallible public entry point returns it. Nothing here is
//! ever logged-and-swallowed; propagation is the caller's job.

/// Result alias for all fallible operations in this crate.
pub type DatalogResult<T> = Result<T, DatalogError>;

/// Errors produced by the parser, validator, stratifier, and evaluator.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DatalogError {
    /// Malformed surface syntax. Carries the 1-based line number.
    #[error("parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// A fact is not ground/non-negated, or a rule fails range-restriction
    /// (I2), or has a built-in/negated head, or an empty body.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Stratification detected a negative recursive cycle.
    #[error("negative recursion through: {}", trail.join(" -> "))]
    NegativeRecursion { trail: Vec<String> },

    /// A built-in predicate was evaluated with insufficiently-bound
    /// operands; the validator should have prevented this.
    #[error("unbound built-in: {0}")]
    UnboundBuiltin(String),

    /// A structural invariant was violated — a programming bug, not user
    /// error.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}
