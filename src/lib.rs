#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]

mod error;
mod eval;
mod expr;
mod functions;
mod hooks;
mod operator;
mod registry;
mod special_forms;
mod value;

pub use crate::error::{ArityRequirement, EvalError};
pub use crate::eval::evaluate;
pub use crate::expr::{Expression, ExistenceExpression, ExtensionFunctions, Mapping};
pub use crate::hooks::EvalContext;
pub use crate::operator::{OperatorSymbol, XsdCastTarget};
pub use crate::registry::FunctionContext;
pub use crate::value::{EvalTerm, TypeTag};

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, Term, Variable};
    use oxsdatatypes::DateTime;

    fn ctx() -> EvalContext {
        EvalContext::new(FunctionContext {
            now: DateTime::now(),
            base_iri: None,
        })
    }

    // End-to-end scenarios from §8 of the specification this crate
    // implements, exercised through the public `evaluate` entry point
    // rather than any internal module.

    #[test]
    fn string_equality_and_ordering() {
        let a = Expression::Term(Term::from(Literal::new_simple_literal("aaa")));
        let b = Expression::Term(Term::from(Literal::new_simple_literal("bbb")));
        let eq = Expression::Operator(OperatorSymbol::Equal, vec![a.clone(), a.clone()]);
        assert_eq!(
            evaluate(&eq, &Mapping::default(), &ctx()).unwrap(),
            Term::from(Literal::from(true))
        );
        let lt = Expression::Operator(OperatorSymbol::Less, vec![a, b]);
        assert_eq!(
            evaluate(&lt, &Mapping::default(), &ctx()).unwrap(),
            Term::from(Literal::from(true))
        );
    }

    #[test]
    fn if_never_evaluates_the_untaken_branch() {
        let cond = Expression::Term(Term::from(Literal::from(true)));
        let then_branch = Expression::Term(Term::from(Literal::from(1)));
        let else_branch = Expression::Operator(
            OperatorSymbol::Divide,
            vec![
                Expression::Term(Term::from(Literal::from(1))),
                Expression::Term(Term::from(Literal::from(0))),
            ],
        );
        let expr = Expression::Operator(
            OperatorSymbol::If,
            vec![cond, then_branch, else_branch],
        );
        assert_eq!(
            evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
            Term::from(Literal::from(1))
        );
    }

    #[test]
    fn coalesce_skips_unbound_variable() {
        let unbound = Expression::Variable(Variable::new_unchecked("x"));
        let fallback = Expression::Term(Term::from(Literal::new_simple_literal("fallback")));
        let expr = Expression::Operator(OperatorSymbol::Coalesce, vec![unbound, fallback]);
        assert_eq!(
            evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
            Term::from(Literal::new_simple_literal("fallback"))
        );
    }

    #[test]
    fn bound_reflects_mapping_membership() {
        let v = Variable::new_unchecked("x");
        let expr = Expression::Operator(OperatorSymbol::Bound, vec![Expression::Variable(v.clone())]);
        assert_eq!(
            evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
            Term::from(Literal::from(false))
        );
        let mut mapping = Mapping::default();
        mapping.insert(v.clone(), Term::from(Literal::new_simple_literal("a")));
        let expr = Expression::Operator(OperatorSymbol::Bound, vec![Expression::Variable(v)]);
        assert_eq!(
            evaluate(&expr, &mapping, &ctx()).unwrap(),
            Term::from(Literal::from(true))
        );
    }

    #[test]
    fn integer_plus_decimal_promotes_to_decimal() {
        let expr = Expression::Operator(
            OperatorSymbol::Add,
            vec![
                Expression::Term(Term::from(Literal::from(1))),
                Expression::Term(Term::from(Literal::new_typed_literal("1.5", oxrdf::vocab::xsd::DECIMAL))),
            ],
        );
        assert_eq!(
            evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
            Term::from(Literal::new_typed_literal("2.5", oxrdf::vocab::xsd::DECIMAL))
        );
    }

    #[test]
    fn same_term_distinguishes_integer_from_decimal_but_value_equal_does_not() {
        let int_lit = Expression::Term(Term::from(Literal::from(1)));
        let dec_lit = Expression::Term(Term::from(Literal::new_typed_literal(
            "1.0",
            oxrdf::vocab::xsd::DECIMAL,
        )));
        let same = Expression::Operator(
            OperatorSymbol::SameTerm,
            vec![int_lit.clone(), dec_lit.clone()],
        );
        assert_eq!(
            evaluate(&same, &Mapping::default(), &ctx()).unwrap(),
            Term::from(Literal::from(false))
        );
        let eq = Expression::Operator(OperatorSymbol::Equal, vec![int_lit, dec_lit]);
        assert_eq!(
            evaluate(&eq, &Mapping::default(), &ctx()).unwrap(),
            Term::from(Literal::from(true))
        );
    }
}
