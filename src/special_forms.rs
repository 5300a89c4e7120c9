//! Special forms: operators whose arguments are evaluated lazily,
//! conditionally, or not at all, so they live outside the regular
//! overload table (§4.3).
//!
//! `||` and `&&` are grounded on `spareval::expression`'s
//! `Expression::Or`/`Expression::And` evaluators: short-circuit on the
//! dominant value even if an earlier sibling errored, and only surface
//! that error once every sibling has been tried and none produced the
//! dominant value. `IF` and `COALESCE` mirror that file's
//! `Expression::If`/`Expression::Coalesce` directly. `IN`/`NOT IN` has no
//! evaluator-level counterpart there (the algebra lowers it away before
//! the expression tree reaches this layer) and is implemented here
//! straight from SPARQL 1.1's `=`-membership semantics, kept in the same
//! accumulate-errors-unless-a-match-short-circuits shape as `||`/`&&`.

use crate::error::EvalError;
use crate::eval::eval as evaluate;
use crate::expr::{Expression, Mapping};
use crate::hooks::EvalContext;
use crate::operator::OperatorSymbol;
use crate::value::{self, EvalTerm};

pub fn dispatch(
    operator: OperatorSymbol,
    args: &[Expression],
    mapping: &Mapping,
    ctx: &EvalContext,
) -> Result<EvalTerm, EvalError> {
    match operator {
        OperatorSymbol::Or => or(args, mapping, ctx),
        OperatorSymbol::And => and(args, mapping, ctx),
        OperatorSymbol::If => if_then_else(args, mapping, ctx),
        OperatorSymbol::Coalesce => coalesce(args, mapping, ctx),
        OperatorSymbol::Bound => bound(args, mapping),
        OperatorSymbol::SameTerm => same_term(args, mapping, ctx),
        OperatorSymbol::In => in_list(args, mapping, ctx).map(EvalTerm::Boolean),
        OperatorSymbol::NotIn => in_list(args, mapping, ctx).map(|found| EvalTerm::Boolean(!found)),
        _ => unreachable!("{operator:?} is not a special form"),
    }
}

fn or(args: &[Expression], mapping: &Mapping, ctx: &EvalContext) -> Result<EvalTerm, EvalError> {
    let mut error = None;
    for child in args {
        match evaluate(child, mapping, ctx).and_then(|t| t.effective_boolean_value()) {
            Ok(true) => return Ok(EvalTerm::Boolean(true)),
            Ok(false) => {}
            Err(e) => error = Some(e),
        }
    }
    match error {
        Some(e) => Err(e),
        None => Ok(EvalTerm::Boolean(false)),
    }
}

fn and(args: &[Expression], mapping: &Mapping, ctx: &EvalContext) -> Result<EvalTerm, EvalError> {
    let mut error = None;
    for child in args {
        match evaluate(child, mapping, ctx).and_then(|t| t.effective_boolean_value()) {
            Ok(false) => return Ok(EvalTerm::Boolean(false)),
            Ok(true) => {}
            Err(e) => error = Some(e),
        }
    }
    match error {
        Some(e) => Err(e),
        None => Ok(EvalTerm::Boolean(true)),
    }
}

fn if_then_else(
    args: &[Expression],
    mapping: &Mapping,
    ctx: &EvalContext,
) -> Result<EvalTerm, EvalError> {
    let condition = evaluate(&args[0], mapping, ctx)?.effective_boolean_value()?;
    if condition {
        evaluate(&args[1], mapping, ctx)
    } else {
        evaluate(&args[2], mapping, ctx)
    }
}

fn coalesce(
    args: &[Expression],
    mapping: &Mapping,
    ctx: &EvalContext,
) -> Result<EvalTerm, EvalError> {
    let mut errors = Vec::new();
    for branch in args {
        match evaluate(branch, mapping, ctx) {
            Ok(term) => return Ok(term),
            Err(e) => errors.push(e),
        }
    }
    Err(EvalError::Coalesce(errors))
}

/// `BOUND` never evaluates its argument as a general expression: it is
/// always a bare variable reference tested against the mapping directly,
/// and it never itself errors.
fn bound(args: &[Expression], mapping: &Mapping) -> Result<EvalTerm, EvalError> {
    let Expression::Variable(v) = &args[0] else {
        return Err(EvalError::InvalidArgumentTypes {
            operator: OperatorSymbol::Bound,
            operand_types: Vec::new(),
        });
    };
    Ok(EvalTerm::Boolean(mapping.contains_key(v)))
}

fn same_term(
    args: &[Expression],
    mapping: &Mapping,
    ctx: &EvalContext,
) -> Result<EvalTerm, EvalError> {
    let a = evaluate(&args[0], mapping, ctx)?;
    let b = evaluate(&args[1], mapping, ctx)?;
    Ok(EvalTerm::Boolean(value::same_term(&a, &b)))
}

/// Shared by `IN` and `NOT IN`: evaluate the left side once, then test it
/// against each list member by SPARQL value equality, short-circuiting
/// `true` on the first match. A member whose comparison errors (an
/// incomparable pair, a non-lexical literal) does not abort the search;
/// only if no match turns up does an accumulated error surface.
fn in_list(args: &[Expression], mapping: &Mapping, ctx: &EvalContext) -> Result<bool, EvalError> {
    let lhs = evaluate(&args[0], mapping, ctx)?;
    let mut errors = Vec::new();
    for item in &args[1..] {
        match evaluate(item, mapping, ctx).and_then(|rhs| value::value_equals(&lhs, &rhs)) {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            Err(e) => errors.push(e),
        }
    }
    if errors.is_empty() {
        Ok(false)
    } else {
        Err(EvalError::In(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FunctionContext;
    use oxrdf::{Literal, Term, Variable};
    use oxsdatatypes::DateTime;

    fn ctx() -> EvalContext {
        EvalContext::new(FunctionContext {
            now: DateTime::now(),
            base_iri: None,
        })
    }

    fn term_expr(t: impl Into<Term>) -> Expression {
        Expression::Term(t.into())
    }

    #[test]
    fn or_short_circuits_true_past_an_earlier_error() {
        let undefined = Expression::Variable(Variable::new_unchecked("x"));
        let args = vec![undefined, term_expr(Literal::from(true))];
        let result = or(&args, &Mapping::default(), &ctx()).unwrap();
        assert!(matches!(result, EvalTerm::Boolean(true)));
    }

    #[test]
    fn and_short_circuits_false_past_an_earlier_error() {
        let undefined = Expression::Variable(Variable::new_unchecked("x"));
        let args = vec![undefined, term_expr(Literal::from(false))];
        let result = and(&args, &Mapping::default(), &ctx()).unwrap();
        assert!(matches!(result, EvalTerm::Boolean(false)));
    }

    #[test]
    fn and_with_no_dominant_value_surfaces_the_error() {
        let undefined = Expression::Variable(Variable::new_unchecked("x"));
        let args = vec![undefined, term_expr(Literal::from(true))];
        assert!(and(&args, &Mapping::default(), &ctx()).is_err());
    }

    #[test]
    fn coalesce_returns_first_success() {
        let undefined = Expression::Variable(Variable::new_unchecked("x"));
        let args = vec![undefined, term_expr(Literal::from(1))];
        let result = coalesce(&args, &Mapping::default(), &ctx()).unwrap();
        assert!(matches!(result, EvalTerm::Integer(_)));
    }

    #[test]
    fn bound_checks_mapping_membership_without_evaluating() {
        let v = Variable::new_unchecked("x");
        let args = vec![Expression::Variable(v)];
        let result = bound(&args, &Mapping::default()).unwrap();
        assert!(matches!(result, EvalTerm::Boolean(false)));
    }

    #[test]
    fn in_list_short_circuits_on_match_despite_other_errors() {
        let lhs = term_expr(Literal::from(1));
        let incomparable = term_expr(Literal::new_simple_literal("x"));
        let matching = term_expr(Literal::from(1));
        let args = vec![lhs, incomparable, matching];
        assert!(in_list(&args, &Mapping::default(), &ctx()).unwrap());
    }
}
