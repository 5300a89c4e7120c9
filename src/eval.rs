//! The tree evaluator (§4.4): recursive descent over [`Expression`] nodes.
//!
//! This is the one entry point the rest of the crate exists to support.
//! It does no work itself beyond routing: variable lookup, constant
//! unwrapping, `EXISTS` delegation, and choosing between the regular
//! dispatcher (`registry::dispatch`, for operators where
//! `OperatorSymbol::is_special()` is false) and the special-form evaluator
//! (`special_forms::dispatch`, which receives the unevaluated argument
//! list so it can short-circuit per §4.3).

use crate::error::{ArityRequirement, EvalError};
use crate::expr::{Expression, Mapping};
use crate::hooks::EvalContext;
use crate::registry;
use crate::special_forms;
use crate::value::EvalTerm;
use oxrdf::Term;

/// Evaluates `expr` against `mapping`, returning the denoted [`Term`] or a
/// typed [`EvalError`] (§7). This is the crate's single public operation.
pub fn evaluate(expr: &Expression, mapping: &Mapping, ctx: &EvalContext) -> Result<Term, EvalError> {
    Ok(eval(expr, mapping, ctx)?.into_term())
}

/// Internal recursion step operating on the typed-value view directly, so
/// sibling calls (e.g. inside `registry::dispatch`) do not round-trip
/// through `oxrdf::Term` on every node.
pub(crate) fn eval(
    expr: &Expression,
    mapping: &Mapping,
    ctx: &EvalContext,
) -> Result<EvalTerm, EvalError> {
    ctx.check_cancelled()?;
    match expr {
        Expression::Variable(v) => mapping
            .get(v)
            .cloned()
            .map(EvalTerm::from)
            .ok_or_else(|| EvalError::UnboundVariable(v.clone())),
        Expression::Term(t) => Ok(EvalTerm::from(t.clone())),
        Expression::Operator(operator, args) => {
            if operator.is_special() {
                check_arity(*operator, args.len())?;
                return special_forms::dispatch(*operator, args, mapping, ctx);
            }
            check_arity(*operator, args.len())?;
            let evaluated = args
                .iter()
                .map(|arg| eval(arg, mapping, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            registry::dispatch(*operator, &ctx.functions, &evaluated)
        }
        Expression::Named(iri, args) => {
            let implementation = ctx
                .extensions
                .get(iri)
                .ok_or_else(|| EvalError::UnknownNamedOperator(iri.clone()))?;
            let evaluated = args
                .iter()
                .map(|arg| evaluate(arg, mapping, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            implementation(&evaluated).map(EvalTerm::from)
        }
        Expression::Exists(existence) => {
            let found = (existence.test)(mapping)?;
            Ok(EvalTerm::Boolean(if existence.negated {
                !found
            } else {
                found
            }))
        }
        Expression::Aggregate => Err(EvalError::UnexpectedAggregate),
    }
}

fn check_arity(
    operator: crate::operator::OperatorSymbol,
    actual: usize,
) -> Result<(), EvalError> {
    let expected = registry::arity(operator);
    let ok = match expected {
        ArityRequirement::Exact(n) => actual == n,
        ArityRequirement::AtLeast(n) => actual >= n,
        ArityRequirement::Range(lo, hi) => (lo..=hi).contains(&actual),
    };
    if ok {
        Ok(())
    } else {
        Err(EvalError::InvalidArity {
            operator,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::OperatorSymbol;
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
    fn variable_lookup_succeeds_when_bound() {
        let v = Variable::new_unchecked("x");
        let mut mapping = Mapping::default();
        mapping.insert(v.clone(), Term::from(Literal::from(1)));
        let result = evaluate(&Expression::Variable(v), &mapping, &ctx()).unwrap();
        assert_eq!(result, Term::from(Literal::from(1)));
    }

    #[test]
    fn unbound_variable_fails() {
        let v = Variable::new_unchecked("x");
        let err = evaluate(&Expression::Variable(v), &Mapping::default(), &ctx()).unwrap_err();
        assert!(matches!(err, EvalError::UnboundVariable(_)));
    }

    #[test]
    fn wrong_arity_reports_invalid_arity_before_dispatch() {
        let expr = Expression::Operator(
            OperatorSymbol::Add,
            vec![term_expr(Literal::from(1))],
        );
        let err = evaluate(&expr, &Mapping::default(), &ctx()).unwrap_err();
        assert!(matches!(err, EvalError::InvalidArity { .. }));
    }

    #[test]
    fn coalesce_with_no_arguments_reports_invalid_arity() {
        let expr = Expression::Operator(OperatorSymbol::Coalesce, vec![]);
        let err = evaluate(&expr, &Mapping::default(), &ctx()).unwrap_err();
        assert!(matches!(err, EvalError::InvalidArity { .. }));
    }

    #[test]
    fn aggregate_node_is_rejected() {
        let err = evaluate(&Expression::Aggregate, &Mapping::default(), &ctx()).unwrap_err();
        assert!(matches!(err, EvalError::UnexpectedAggregate));
    }

    #[test]
    fn exists_hook_is_negated_for_not_exists() {
        use crate::expr::ExistenceExpression;
        use std::sync::Arc;

        let expr = Expression::Exists(ExistenceExpression {
            negated: true,
            test: Arc::new(|_| Ok(true)),
        });
        let result = evaluate(&expr, &Mapping::default(), &ctx()).unwrap();
        assert_eq!(result, Term::from(Literal::from(false)));
    }

    #[test]
    fn unknown_named_operator_fails() {
        let iri = oxrdf::NamedNode::new_unchecked("http://example.com/ext");
        let expr = Expression::Named(iri, vec![]);
        let err = evaluate(&expr, &Mapping::default(), &ctx()).unwrap_err();
        assert!(matches!(err, EvalError::UnknownNamedOperator(_)));
    }
}
