//! Statement façade (C10): parsed-statement objects dispatched against a
//! database, per spec.md §4.10.
//!
//! Grounded on the teacher's closed `QueryResult`/operation-kind enums —
//! a tagged sum type, not an open trait hierarchy, per spec.md §9
//! "Sum-typed statements".

use crate::database::Database;
use crate::bindings::Bindings;
use crate::error::DatalogResult;
use crate::query::Answer;
use crate::rule::Rule;
use crate::term::Expr;

/// A parsed, not-yet-executed statement.
#[derive(Clone, Debug)]
pub enum Statement {
    InsertFact(Expr),
    InsertRule(Rule),
    Query(Vec<Expr>),
    Delete(Vec<Expr>),
}

impl Statement {
    /// Execute this statement against `database`. Insertions validate and
    /// mutate the EDB/IDB, returning no answers. `Query` returns the
    /// matcher's projected answers. `Delete` removes matching facts and
    /// returns no answers.
    pub fn execute(&self, database: &mut Database, bindings: Bindings) -> DatalogResult<Vec<Answer>> {
        match self {
            Statement::InsertFact(fact) => {
                database.insert_fact(fact.clone())?;
                Ok(Vec::new())
            }
            Statement::InsertRule(rule) => {
                database.insert_rule(rule.clone())?;
                Ok(Vec::new())
            }
            Statement::Query(goals) => database.query_with(goals, bindings),
            Statement::Delete(goals) => {
                database.delete_with(goals, bindings)?;
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_fact_then_query_round_trip() {
        let mut db = Database::new();
        let fact_stmt = Statement::InsertFact(Expr::pos("foo", vec!["bar".into()]));
        fact_stmt.execute(&mut db, Bindings::root()).unwrap();

        let query_stmt = Statement::Query(vec![Expr::pos("foo", vec!["bar".into()])]);
        let answers = query_stmt.execute(&mut db, Bindings::root()).unwrap();
        assert_eq!(answers.len(), 1);
    }
}
