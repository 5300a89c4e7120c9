//! The expression AST this crate evaluates, plus the per-evaluation
//! context a caller supplies alongside it.
//!
//! `Expression` keeps one shape for every regular and special operator
//! (`OperatorExpression`), following the unified `OperatorSymbol`
//! alphabet of `operator.rs`: the tree evaluator (`eval.rs`) decides
//! whether to route to `registry::dispatch` or `special_forms` purely by
//! `OperatorSymbol::is_special`, rather than by matching on distinct AST
//! variants per operator the way `spargebra::algebra::Expression` does.

use crate::error::EvalError;
use crate::operator::OperatorSymbol;
use oxrdf::{NamedNode, Term, Variable};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// A solution mapping: the binding of variables to RDF terms a `FILTER`,
/// `BIND`, or `ORDER BY` expression is evaluated against. Grounded on
/// `spareval`'s own `QueryableDataset::Tuple` convention of keying
/// bindings with `rustc_hash::FxHashMap` for lookup speed over a
/// std `HashMap`.
pub type Mapping = FxHashMap<Variable, Term>;

/// One node of the expression tree.
#[derive(Debug, Clone)]
pub enum Expression {
    /// A bare variable reference; fails with `UnboundVariable` if absent
    /// from the mapping at evaluation time (§4.1).
    Variable(Variable),
    /// A constant RDF term (IRI, blank node, or literal).
    Term(Term),
    /// `operator(args...)`, covering both regular (§4.2) and special
    /// (§4.3) forms; which one applies is `operator.is_special()`.
    Operator(OperatorSymbol, Vec<Expression>),
    /// A call to an extension function the host registered by IRI.
    Named(NamedNode, Vec<Expression>),
    /// `EXISTS { pattern }` / `NOT EXISTS { pattern }`, with the pattern
    /// already compiled down to a closure over a solution mapping by the
    /// surrounding query engine: this crate never sees, and does not
    /// need to understand, graph-pattern algebra.
    Exists(ExistenceExpression),
    /// An aggregate (`COUNT`, `SUM`, ...) placeholder. Aggregates are
    /// resolved to their scalar result by the surrounding query engine
    /// before the expression tree reaches this crate; one reaching
    /// `evaluate` is a caller error (`UnexpectedAggregate`).
    Aggregate,
}

/// `EXISTS`/`NOT EXISTS`, represented as an opaque predicate over a
/// solution mapping rather than any concrete graph-pattern algebra type,
/// so this crate stays usable against any query engine's own algebra.
#[derive(Clone)]
pub struct ExistenceExpression {
    pub negated: bool,
    pub test: Arc<dyn Fn(&Mapping) -> Result<bool, EvalError> + Send + Sync>,
}

impl fmt::Debug for ExistenceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExistenceExpression")
            .field("negated", &self.negated)
            .finish_non_exhaustive()
    }
}

/// Extension functions the host registers by IRI, dispatched from a
/// [`Expression::Named`] node. Mirrors `spareval`'s
/// `CustomFunctionRegistry = HashMap<NamedNode, Arc<dyn Fn(&[Term]) ->
/// Option<Term> + Send + Sync>>`, generalized to return a typed error
/// instead of erasing failure to `None`.
pub type ExtensionFunctions =
    FxHashMap<NamedNode, Arc<dyn Fn(&[Term]) -> Result<Term, EvalError> + Send + Sync>>;
