//! Coverage for the SPARQL 1.1 function-library entries this crate adds
//! beyond the distilled specification's core catalogue (SPEC_FULL.md §4.2):
//! string functions, hashing, casts, and date/time field accessors.

use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode, Term};
use oxsdatatypes::DateTime;
use sparql_expr_eval::{
    evaluate, EvalContext, EvalError, Expression, FunctionContext, Mapping, OperatorSymbol,
    XsdCastTarget,
};

fn ctx() -> EvalContext {
    EvalContext::new(FunctionContext {
        now: DateTime::now(),
        base_iri: None,
    })
}

fn term(t: impl Into<Term>) -> Expression {
    Expression::Term(t.into())
}

fn str_lit(s: &str) -> Expression {
    term(Literal::new_simple_literal(s))
}

fn eval1(operator: OperatorSymbol, a: Expression) -> Term {
    evaluate(
        &Expression::Operator(operator, vec![a]),
        &Mapping::default(),
        &ctx(),
    )
    .unwrap()
}

fn eval2(operator: OperatorSymbol, a: Expression, b: Expression) -> Term {
    evaluate(
        &Expression::Operator(operator, vec![a, b]),
        &Mapping::default(),
        &ctx(),
    )
    .unwrap()
}

#[test]
fn strlen_counts_unicode_scalar_values() {
    assert_eq!(
        eval1(OperatorSymbol::StrLen, str_lit("caf\u{e9}")),
        Term::from(Literal::from(4))
    );
}

#[test]
fn substr_is_one_based_and_character_indexed() {
    let expr = Expression::Operator(
        OperatorSymbol::SubStr,
        vec![str_lit("foobar"), term(Literal::from(4))],
    );
    assert_eq!(
        evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
        Term::from(Literal::new_simple_literal("bar"))
    );
}

#[test]
fn substr_with_length_stops_early() {
    let expr = Expression::Operator(
        OperatorSymbol::SubStr,
        vec![str_lit("foobar"), term(Literal::from(1)), term(Literal::from(3))],
    );
    assert_eq!(
        evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
        Term::from(Literal::new_simple_literal("foo"))
    );
}

#[test]
fn ucase_and_lcase_preserve_language_tag() {
    let tagged = term(Literal::new_language_tagged_literal_unchecked("Hello", "en"));
    assert_eq!(
        eval1(OperatorSymbol::LCase, tagged.clone()),
        Term::from(Literal::new_language_tagged_literal_unchecked("hello", "en"))
    );
    assert_eq!(
        eval1(OperatorSymbol::UCase, tagged),
        Term::from(Literal::new_language_tagged_literal_unchecked("HELLO", "en"))
    );
}

#[test]
fn contains_and_str_starts_and_ends() {
    assert_eq!(
        eval2(OperatorSymbol::Contains, str_lit("foobar"), str_lit("oob")),
        Term::from(Literal::from(true))
    );
    assert_eq!(
        eval2(OperatorSymbol::StrStarts, str_lit("foobar"), str_lit("foo")),
        Term::from(Literal::from(true))
    );
    assert_eq!(
        eval2(OperatorSymbol::StrEnds, str_lit("foobar"), str_lit("bar")),
        Term::from(Literal::from(true))
    );
}

#[test]
fn strbefore_and_strafter_empty_on_no_match() {
    assert_eq!(
        eval2(OperatorSymbol::StrBefore, str_lit("abc"), str_lit("z")),
        Term::from(Literal::new_simple_literal(""))
    );
    assert_eq!(
        eval2(OperatorSymbol::StrAfter, str_lit("abc"), str_lit("b")),
        Term::from(Literal::new_simple_literal("c"))
    );
}

#[test]
fn concat_drops_a_conflicting_language_tag() {
    let a = term(Literal::new_language_tagged_literal_unchecked("foo", "en"));
    let b = term(Literal::new_language_tagged_literal_unchecked("bar", "fr"));
    let expr = Expression::Operator(OperatorSymbol::Concat, vec![a, b]);
    assert_eq!(
        evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
        Term::from(Literal::new_simple_literal("foobar"))
    );
}

#[test]
fn regex_matches_with_case_insensitive_flag() {
    let expr = Expression::Operator(
        OperatorSymbol::Regex,
        vec![str_lit("Hello"), str_lit("^hello$"), str_lit("i")],
    );
    assert_eq!(
        evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
        Term::from(Literal::from(true))
    );
}

#[test]
fn replace_substitutes_every_match() {
    let expr = Expression::Operator(
        OperatorSymbol::Replace,
        vec![str_lit("abcabc"), str_lit("a"), str_lit("X")],
    );
    assert_eq!(
        evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
        Term::from(Literal::new_simple_literal("XbcXbc"))
    );
}

#[test]
fn encode_for_uri_percent_encodes_reserved_bytes() {
    assert_eq!(
        eval1(OperatorSymbol::EncodeForUri, str_lit("a b")),
        Term::from(Literal::new_simple_literal("a%20b"))
    );
}

#[test]
fn md5_matches_the_well_known_test_vector() {
    assert_eq!(
        eval1(OperatorSymbol::Md5, str_lit("abc")),
        Term::from(Literal::new_simple_literal("900150983cd24fb0d6963f7d28e17f72"))
    );
}

#[test]
fn sha256_matches_the_well_known_test_vector() {
    assert_eq!(
        eval1(OperatorSymbol::Sha256, str_lit("abc")),
        Term::from(Literal::new_simple_literal(
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        ))
    );
}

#[test]
fn cast_string_to_integer_round_trips() {
    let expr = Expression::Operator(
        OperatorSymbol::Cast(XsdCastTarget::Integer),
        vec![str_lit("42")],
    );
    assert_eq!(
        evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
        Term::from(Literal::new_typed_literal("42", xsd::INTEGER))
    );
}

#[test]
fn cast_non_numeric_string_to_integer_fails() {
    let expr = Expression::Operator(
        OperatorSymbol::Cast(XsdCastTarget::Integer),
        vec![str_lit("not a number")],
    );
    let err = evaluate(&expr, &Mapping::default(), &ctx()).unwrap_err();
    assert!(matches!(err, EvalError::Cast { .. }));
}

#[test]
fn cast_boolean_to_string() {
    let expr = Expression::Operator(
        OperatorSymbol::Cast(XsdCastTarget::String),
        vec![term(Literal::from(true))],
    );
    assert_eq!(
        evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
        Term::from(Literal::new_simple_literal("true"))
    );
}

#[test]
fn date_time_field_accessors() {
    let dt = term(Literal::new_typed_literal(
        "2024-03-05T13:45:30Z",
        xsd::DATE_TIME,
    ));
    assert_eq!(
        eval1(OperatorSymbol::Year, dt.clone()),
        Term::from(Literal::from(2024))
    );
    assert_eq!(
        eval1(OperatorSymbol::Month, dt.clone()),
        Term::from(Literal::from(3))
    );
    assert_eq!(
        eval1(OperatorSymbol::Day, dt.clone()),
        Term::from(Literal::from(5))
    );
    assert_eq!(
        eval1(OperatorSymbol::Hours, dt.clone()),
        Term::from(Literal::from(13))
    );
    assert_eq!(
        eval1(OperatorSymbol::Minutes, dt),
        Term::from(Literal::from(45))
    );
}

#[test]
fn str_on_iri_and_literal() {
    let iri = term(NamedNode::new_unchecked("http://example.com/"));
    assert_eq!(
        eval1(OperatorSymbol::Str, iri),
        Term::from(Literal::new_simple_literal("http://example.com/"))
    );
}

#[test]
fn is_numeric_and_is_iri_predicates() {
    assert_eq!(
        eval1(OperatorSymbol::IsNumeric, term(Literal::from(1))),
        Term::from(Literal::from(true))
    );
    assert_eq!(
        eval1(
            OperatorSymbol::IsIri,
            term(NamedNode::new_unchecked("http://example.com/"))
        ),
        Term::from(Literal::from(true))
    );
    assert_eq!(
        eval1(OperatorSymbol::IsIri, str_lit("not an iri term")),
        Term::from(Literal::from(false))
    );
}

fn non_lexical_integer(lexical: &str) -> Expression {
    term(Literal::new_typed_literal(lexical, xsd::INTEGER))
}

#[test]
fn in_operator_short_circuits_on_match_despite_other_errors() {
    let expr = Expression::Operator(
        OperatorSymbol::In,
        vec![term(Literal::from(1)), non_lexical_integer("007"), term(Literal::from(1))],
    );
    assert_eq!(
        evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
        Term::from(Literal::from(true))
    );
}

#[test]
fn not_in_negates_in() {
    let expr = Expression::Operator(
        OperatorSymbol::NotIn,
        vec![term(Literal::from(2)), term(Literal::from(1))],
    );
    assert_eq!(
        evaluate(&expr, &Mapping::default(), &ctx()).unwrap(),
        Term::from(Literal::from(true))
    );
}

#[test]
fn in_operator_reports_accumulated_errors_when_no_match() {
    let expr = Expression::Operator(
        OperatorSymbol::In,
        vec![term(Literal::from(1)), non_lexical_integer("007")],
    );
    let err = evaluate(&expr, &Mapping::default(), &ctx()).unwrap_err();
    assert!(matches!(err, EvalError::In(_)));
}
