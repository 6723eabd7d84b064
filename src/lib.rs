//! In-memory deductive database: a safe, stratified, negation-capable
//! dialect of Datalog with equality and comparison built-ins.
//!
//! Users load ground facts (the EDB), declarative rules (the IDB), and
//! issue conjunctive queries or deletions; derived facts are materialized
//! bottom-up via stratified semi-naive evaluation. See [`Database`] for
//! the programmatic entry point and [`parser::parse_program`] for the
//! textual surface syntax.

mod bindings;
mod database;
mod error;
mod expand;
mod lexer;
mod parser;
mod query;
mod rule;
mod statement;
mod store;
mod stratify;
mod term;
mod unify;
mod validate;

pub use bindings::Bindings;
pub use database::Database;
pub use error::{DatalogError, DatalogResult};
pub use expand::EvalLimits;
pub use parser::{parse_program, parse_statement};
pub use query::Answer;
pub use rule::Rule;
pub use statement::Statement;
pub use store::{FactStore, IndexedFactStore};
pub use stratify::Stratification;
pub use term::{eval_builtin, is_variable, Expr, Term};
