//! Façade and programmatic API, per spec.md §6 and SPEC_FULL.md §4.13.
//!
//! Grounded on the teacher's top-level `KnowledgeGraph`/`Store` façade
//! shape (own the EDB, own the rule set, expose a small owning API over
//! both) — generalized to Datalog's query/delete/validate surface instead
//! of RDF triple insertion.

use std::cell::RefCell;

use crate::bindings::Bindings;
use crate::error::DatalogResult;
use crate::expand::EvalLimits;
use crate::parser::{parse_program, parse_statement};
use crate::query::{run_delete, run_query, Answer};
use crate::rule::Rule;
use crate::statement::Statement;
use crate::store::{FactStore, IndexedFactStore};
use crate::stratify::{stratify, Stratification};
use crate::term::Expr;
use crate::validate::{validate_fact, validate_rule};

/// The in-memory deductive database: an EDB, an IDB, and the safety-valve
/// limits the expander enforces.
pub struct Database {
    edb: IndexedFactStore,
    rules: Vec<Rule>,
    limits: EvalLimits,
    // Invalidated by rule insertion and deletion (spec.md §4.10). Only
    // `validate` populates it; query/delete compute their own
    // relevance-pruned stratification per call and do not consult it.
    cached_stratification: RefCell<Option<Stratification>>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Self {
        Self::with_limits(EvalLimits::default())
    }

    pub fn with_limits(limits: EvalLimits) -> Self {
        Self {
            edb: IndexedFactStore::new(),
            rules: Vec::new(),
            limits,
            cached_stratification: RefCell::new(None),
        }
    }

    /// Assert a ground fact built from string arguments.
    pub fn fact(&mut self, predicate: &str, args: &[&str]) -> DatalogResult<()> {
        let expr = Expr::pos(predicate, args.iter().map(|s| s.to_string()).collect());
        self.insert_fact(expr)
    }

    pub(crate) fn insert_fact(&mut self, fact: Expr) -> DatalogResult<()> {
        validate_fact(&fact)?;
        self.edb.add(fact);
        Ok(())
    }

    /// Add a rule.
    pub fn rule(&mut self, head: Expr, body: Vec<Expr>) -> DatalogResult<()> {
        self.insert_rule(Rule::new(head, body))
    }

    pub(crate) fn insert_rule(&mut self, rule: Rule) -> DatalogResult<()> {
        validate_rule(&rule)?;
        self.rules.push(rule);
        *self.cached_stratification.borrow_mut() = None;
        Ok(())
    }

    /// Parse and execute every statement in `source` in order, collecting
    /// every query's answers.
    pub fn execute_all(&mut self, source: &str) -> DatalogResult<Vec<Answer>> {
        let statements = parse_program(source)?;
        let mut answers = Vec::new();
        for statement in statements {
            answers.extend(statement.execute(self, Bindings::root())?);
        }
        Ok(answers)
    }

    /// Run a query with no initial bindings.
    pub fn query(&self, goals: &[Expr]) -> DatalogResult<Vec<Answer>> {
        self.query_with(goals, Bindings::root())
    }

    /// Run a query starting from `bindings` (spec.md's "prepared
    /// bindings", scenario S5).
    pub fn query_with(&self, goals: &[Expr], bindings: Bindings) -> DatalogResult<Vec<Answer>> {
        run_query(goals, &bindings, &self.edb, &self.rules, self.limits)
    }

    /// Delete every fact matching an answer to `goals` with no initial
    /// bindings.
    pub fn delete(&mut self, goals: &[Expr]) -> DatalogResult<()> {
        self.delete_with(goals, Bindings::root())
    }

    pub(crate) fn delete_with(&mut self, goals: &[Expr], bindings: Bindings) -> DatalogResult<()> {
        run_delete(goals, &bindings, &mut self.edb, &self.rules, self.limits)?;
        *self.cached_stratification.borrow_mut() = None;
        Ok(())
    }

    /// Re-validate every stored fact and rule, and stratify the full rule
    /// set — catches `NegativeRecursion` even for predicates a query
    /// never happens to touch (spec.md scenario S6).
    pub fn validate(&self) -> DatalogResult<()> {
        for fact in self.edb.all_facts() {
            validate_fact(fact)?;
        }
        for rule in &self.rules {
            validate_rule(rule)?;
        }
        let stratification = stratify(&self.rules)?;
        *self.cached_stratification.borrow_mut() = Some(stratification);
        Ok(())
    }

    /// Parse `source` as a single statement without executing it.
    pub fn prepare_statement(&self, source: &str) -> DatalogResult<Statement> {
        parse_statement(source)
    }

    /// Build a root [`Bindings`] scope from `(variable, value)` pairs.
    pub fn make_bindings(&self, pairs: &[(&str, &str)]) -> Bindings {
        Bindings::from_pairs(pairs)
    }

    pub fn fact_count(&self) -> usize {
        self.edb.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
