//! Exhaustive `||`/`&&` truth tables (§8 "Short-circuit truth tables").
//!
//! Each cell is driven through the public `evaluate` entry point with
//! operands that are literally `true`, literally `false`, or guaranteed to
//! raise (an unbound variable), so the three-valued table in the
//! specification can be checked directly rather than inferred from the
//! short-circuit logic's implementation.

use oxrdf::{Literal, Term, Variable};
use oxsdatatypes::DateTime;
use sparql_expr_eval::{evaluate, EvalContext, Expression, FunctionContext, Mapping, OperatorSymbol};

fn ctx() -> EvalContext {
    EvalContext::new(FunctionContext {
        now: DateTime::now(),
        base_iri: None,
    })
}

#[derive(Clone, Copy, Debug)]
enum Cell {
    True,
    False,
    Error,
}

fn expr_for(cell: Cell) -> Expression {
    match cell {
        Cell::True => Expression::Term(Term::from(Literal::from(true))),
        Cell::False => Expression::Term(Term::from(Literal::from(false))),
        Cell::Error => Expression::Variable(Variable::new_unchecked("unbound")),
    }
}

fn eval_or(a: Cell, b: Cell) -> Result<bool, ()> {
    let expr = Expression::Operator(OperatorSymbol::Or, vec![expr_for(a), expr_for(b)]);
    match evaluate(&expr, &Mapping::default(), &ctx()) {
        Ok(t) => Ok(t == Term::from(Literal::from(true))),
        Err(_) => Err(()),
    }
}

fn eval_and(a: Cell, b: Cell) -> Result<bool, ()> {
    let expr = Expression::Operator(OperatorSymbol::And, vec![expr_for(a), expr_for(b)]);
    match evaluate(&expr, &Mapping::default(), &ctx()) {
        Ok(t) => Ok(t == Term::from(Literal::from(true))),
        Err(_) => Err(()),
    }
}

#[test]
fn or_truth_table() {
    use Cell::*;
    assert_eq!(eval_or(True, True), Ok(true));
    assert_eq!(eval_or(True, False), Ok(true));
    assert_eq!(eval_or(True, Error), Ok(true));
    assert_eq!(eval_or(False, True), Ok(true));
    assert_eq!(eval_or(False, False), Ok(false));
    assert_eq!(eval_or(False, Error), Err(()));
    assert_eq!(eval_or(Error, True), Ok(true));
    assert_eq!(eval_or(Error, False), Err(()));
    assert_eq!(eval_or(Error, Error), Err(()));
}

#[test]
fn and_truth_table() {
    use Cell::*;
    assert_eq!(eval_and(True, True), Ok(true));
    assert_eq!(eval_and(True, False), Ok(false));
    assert_eq!(eval_and(True, Error), Err(()));
    assert_eq!(eval_and(False, True), Ok(false));
    assert_eq!(eval_and(False, False), Ok(false));
    assert_eq!(eval_and(False, Error), Ok(false));
    assert_eq!(eval_and(Error, True), Err(()));
    assert_eq!(eval_and(Error, False), Ok(false));
    assert_eq!(eval_and(Error, Error), Err(()));
}
