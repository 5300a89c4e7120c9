//! Overload dispatch: `(operator, operand type tuple) -> implementation`.
//!
//! Regular operators are resolved the way the distilled spec's §4.2
//! describes it and the way `spareval`'s `build_expression_evaluator`
//! match arms behave in practice: try an exact match on the operands'
//! `TypeTag`s first; for the four arithmetic/numeric operators, if no
//! exact entry exists, promote the operand pair to their join numeric
//! type (§3's lattice) and retry once. A handful of operators never
//! need a table at all because one Rust `match` already covers every
//! operand shape uniformly (comparisons, `NOT`, the `isFOO` predicates,
//! `CONCAT`'s variable arity); those are special-cased in [`dispatch`]
//! ahead of the table lookup, mirroring how `spareval` special-cases
//! `Function::Concat`'s variadic parameter list before its `match`.

use crate::error::{ArityRequirement, EvalError};
use crate::functions as f;
use crate::operator::OperatorSymbol;
use crate::value::{EvalTerm, NumericTag, TypeTag};
use oxiri::Iri;
use oxsdatatypes::DateTime;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// Per-call context threaded through to the handful of operators that are
/// not pure functions of their arguments: `NOW`, `IRI` (relative resolution).
/// `RAND`, `UUID`, `STRUUID`, and zero-arg `BNODE` draw straight from
/// `rand::random` and do not need anything here, but keep the same function
/// pointer signature as everything else for a uniform registry value type.
#[derive(Debug, Clone)]
pub struct FunctionContext {
    pub now: DateTime,
    pub base_iri: Option<Iri<String>>,
}

type Impl = fn(&FunctionContext, &[EvalTerm]) -> Result<EvalTerm, EvalError>;

static REGISTRY: LazyLock<FxHashMap<(OperatorSymbol, Vec<TypeTag>), Impl>> =
    LazyLock::new(build_registry);

/// Evaluates a regular (non-special-form) operator over already-evaluated
/// operands. Callers (`eval.rs`) are responsible for routing special forms
/// (`OperatorSymbol::is_special`) to `special_forms.rs` instead.
pub fn dispatch(
    operator: OperatorSymbol,
    ctx: &FunctionContext,
    args: &[EvalTerm],
) -> Result<EvalTerm, EvalError> {
    debug_assert!(!operator.is_special());
    match operator {
        OperatorSymbol::Equal => return f::equal(args),
        OperatorSymbol::NotEqual => return f::not_equal(args),
        OperatorSymbol::Less => return f::less(args),
        OperatorSymbol::Greater => return f::greater(args),
        OperatorSymbol::LessOrEqual => return f::less_or_equal(args),
        OperatorSymbol::GreaterOrEqual => return f::greater_or_equal(args),
        OperatorSymbol::Not => return f::not(args),
        OperatorSymbol::IsIri => return f::is_iri(args),
        OperatorSymbol::IsBlank => return f::is_blank(args),
        OperatorSymbol::IsLiteral => return f::is_literal(args),
        OperatorSymbol::IsNumeric => return f::is_numeric(args),
        OperatorSymbol::Concat => return f::concat(ctx, args),
        OperatorSymbol::Cast(target) => return f::cast(target, ctx, args),
        OperatorSymbol::Rand => return f::rand(ctx, args),
        OperatorSymbol::Now => return f::now(ctx, args),
        OperatorSymbol::Uuid => return f::uuid(ctx, args),
        OperatorSymbol::StrUuid => return f::str_uuid(ctx, args),
        OperatorSymbol::BNode if args.is_empty() => return f::bnode_nullary(ctx, args),
        _ => {}
    }

    let operand_types: Vec<TypeTag> = args.iter().map(EvalTerm::type_tag).collect();
    if let Some(imp) = REGISTRY.get(&(operator, operand_types.clone())) {
        return imp(ctx, args);
    }

    if args.len() == 2 {
        if let (Some(a), Some(b)) = (NumericTag::of(operand_types[0]), NumericTag::of(operand_types[1])) {
            let joined = a.join(b);
            let promoted_key = (operator, vec![joined.type_tag(), joined.type_tag()]);
            if let Some(imp) = REGISTRY.get(&promoted_key) {
                return imp(ctx, args);
            }
        }
    }

    Err(EvalError::InvalidArgumentTypes {
        operator,
        operand_types,
    })
}

/// Numeric promotion is attempted for exactly the arity-2 numeric
/// operators (arithmetic); every other operator's table rows are
/// registered directly against the concrete type tags they accept, so a
/// promotion retry for them would only ever miss again.
const ARITHMETIC: [OperatorSymbol; 4] = [
    OperatorSymbol::Add,
    OperatorSymbol::Subtract,
    OperatorSymbol::Multiply,
    OperatorSymbol::Divide,
];

const NUMERIC_TAGS: [TypeTag; 4] = [
    TypeTag::Integer,
    TypeTag::Decimal,
    TypeTag::Float,
    TypeTag::Double,
];

const STRING_LIKE_TAGS: [TypeTag; 2] = [TypeTag::String, TypeTag::LangString];

fn build_registry() -> FxHashMap<(OperatorSymbol, Vec<TypeTag>), Impl> {
    let mut m: FxHashMap<(OperatorSymbol, Vec<TypeTag>), Impl> = FxHashMap::default();

    let arithmetic_impls: [Impl; 4] = [f::add, f::subtract, f::multiply, f::divide];
    for (op, imp) in ARITHMETIC.into_iter().zip(arithmetic_impls) {
        for tag in NUMERIC_TAGS {
            m.insert((op, vec![tag, tag]), imp);
        }
    }

    for tag in NUMERIC_TAGS {
        m.insert((OperatorSymbol::UnaryPlus, vec![tag]), f::unary_plus as Impl);
        m.insert((OperatorSymbol::UnaryMinus, vec![tag]), f::unary_minus as Impl);
        m.insert((OperatorSymbol::Abs, vec![tag]), f::abs as Impl);
        m.insert((OperatorSymbol::Ceil, vec![tag]), f::ceil as Impl);
        m.insert((OperatorSymbol::Floor, vec![tag]), f::floor as Impl);
        m.insert((OperatorSymbol::Round, vec![tag]), f::round as Impl);
    }

    // STR/LANG/DATATYPE: every literal shape, never blank nodes; STR
    // additionally accepts IRIs (handled by its own per-tag row below).
    const LITERAL_TAGS: [TypeTag; 8] = [
        TypeTag::String,
        TypeTag::LangString,
        TypeTag::Boolean,
        TypeTag::Integer,
        TypeTag::Decimal,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::DateTime,
    ];
    for tag in LITERAL_TAGS.into_iter().chain([TypeTag::NonLexical, TypeTag::Other]) {
        m.insert((OperatorSymbol::Str, vec![tag]), f::str_fn as Impl);
        m.insert((OperatorSymbol::Lang, vec![tag]), f::lang as Impl);
        m.insert((OperatorSymbol::Datatype, vec![tag]), f::datatype as Impl);
    }
    m.insert((OperatorSymbol::Str, vec![TypeTag::NamedNode]), f::str_fn as Impl);

    m.insert((OperatorSymbol::LangMatches, vec![TypeTag::String, TypeTag::String]), f::lang_matches as Impl);
    m.insert(
        (OperatorSymbol::LangMatches, vec![TypeTag::LangString, TypeTag::String]),
        f::lang_matches as Impl,
    );

    m.insert((OperatorSymbol::Iri, vec![TypeTag::NamedNode]), f::iri as Impl);
    m.insert((OperatorSymbol::Iri, vec![TypeTag::String]), f::iri as Impl);

    m.insert((OperatorSymbol::BNode, vec![TypeTag::String]), f::bnode_unary as Impl);

    m.insert(
        (OperatorSymbol::StrDt, vec![TypeTag::String, TypeTag::NamedNode]),
        f::str_dt as Impl,
    );
    m.insert(
        (OperatorSymbol::StrLang, vec![TypeTag::String, TypeTag::String]),
        f::str_lang as Impl,
    );

    for tag in STRING_LIKE_TAGS {
        m.insert((OperatorSymbol::StrLen, vec![tag]), f::str_len as Impl);
        m.insert((OperatorSymbol::UCase, vec![tag]), f::ucase as Impl);
        m.insert((OperatorSymbol::LCase, vec![tag]), f::lcase as Impl);
        m.insert((OperatorSymbol::EncodeForUri, vec![tag]), f::encode_for_uri as Impl);

        m.insert((OperatorSymbol::SubStr, vec![tag, TypeTag::Integer]), f::substr2 as Impl);
        m.insert(
            (OperatorSymbol::SubStr, vec![tag, TypeTag::Integer, TypeTag::Integer]),
            f::substr3 as Impl,
        );

        m.insert((OperatorSymbol::Regex, vec![tag, TypeTag::String]), f::regex2 as Impl);
        m.insert(
            (OperatorSymbol::Regex, vec![tag, TypeTag::String, TypeTag::String]),
            f::regex3 as Impl,
        );
        m.insert(
            (OperatorSymbol::Replace, vec![tag, TypeTag::String, TypeTag::String]),
            f::replace3 as Impl,
        );
        m.insert(
            (OperatorSymbol::Replace, vec![tag, TypeTag::String, TypeTag::String, TypeTag::String]),
            f::replace4 as Impl,
        );

        for other in STRING_LIKE_TAGS {
            m.insert((OperatorSymbol::StrStarts, vec![tag, other]), f::str_starts as Impl);
            m.insert((OperatorSymbol::StrEnds, vec![tag, other]), f::str_ends as Impl);
            m.insert((OperatorSymbol::Contains, vec![tag, other]), f::contains as Impl);
            m.insert((OperatorSymbol::StrBefore, vec![tag, other]), f::str_before as Impl);
            m.insert((OperatorSymbol::StrAfter, vec![tag, other]), f::str_after as Impl);
        }
    }

    for tag in [TypeTag::DateTime] {
        m.insert((OperatorSymbol::Year, vec![tag]), f::year as Impl);
        m.insert((OperatorSymbol::Month, vec![tag]), f::month as Impl);
        m.insert((OperatorSymbol::Day, vec![tag]), f::day as Impl);
        m.insert((OperatorSymbol::Hours, vec![tag]), f::hours as Impl);
        m.insert((OperatorSymbol::Minutes, vec![tag]), f::minutes as Impl);
        m.insert((OperatorSymbol::Seconds, vec![tag]), f::seconds as Impl);
        m.insert((OperatorSymbol::Timezone, vec![tag]), f::timezone as Impl);
        m.insert((OperatorSymbol::Tz, vec![tag]), f::tz as Impl);
    }

    for tag in STRING_LIKE_TAGS {
        m.insert((OperatorSymbol::Md5, vec![tag]), f::md5_fn as Impl);
        m.insert((OperatorSymbol::Sha1, vec![tag]), f::sha1_fn as Impl);
        m.insert((OperatorSymbol::Sha256, vec![tag]), f::sha256_fn as Impl);
        m.insert((OperatorSymbol::Sha384, vec![tag]), f::sha384_fn as Impl);
        m.insert((OperatorSymbol::Sha512, vec![tag]), f::sha512_fn as Impl);
    }

    m
}

/// Expected arity of a named/operator function, used by `eval.rs` before
/// calling [`dispatch`] so a mis-arity call fails with `InvalidArity`
/// rather than a confusing `InvalidArgumentTypes`.
pub fn arity(operator: OperatorSymbol) -> ArityRequirement {
    use ArityRequirement::{AtLeast, Exact, Range};
    use OperatorSymbol::*;
    match operator {
        Equal | NotEqual | Less | Greater | LessOrEqual | GreaterOrEqual | Add | Subtract
        | Multiply | Divide | LangMatches | StrDt | StrLang | StrStarts | StrEnds | Contains
        | StrBefore | StrAfter | Or | And | SameTerm => Exact(2),
        UnaryPlus | UnaryMinus | Not | Str | Lang | Datatype | IsIri | IsBlank | IsLiteral
        | IsNumeric | StrLen | UCase | LCase | EncodeForUri | Abs | Round | Ceil | Floor | Year
        | Month | Day | Hours | Minutes | Seconds | Timezone | Tz | Md5 | Sha1 | Sha256
        | Sha384 | Sha512 | Cast(_) | Iri | Bound => Exact(1),
        Rand | Now | Uuid | StrUuid => Exact(0),
        BNode => Range(0, 1),
        SubStr | Regex => Range(2, 3),
        Replace => Range(3, 4),
        If => Exact(3),
        Concat => AtLeast(0),
        Coalesce => AtLeast(1),
        In | NotIn => AtLeast(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn ctx() -> FunctionContext {
        FunctionContext {
            now: DateTime::now(),
            base_iri: None,
        }
    }

    #[test]
    fn adds_two_integers() {
        let result = dispatch(
            OperatorSymbol::Add,
            &ctx(),
            &[EvalTerm::Integer(BigInt::from(2)), EvalTerm::Integer(BigInt::from(3))],
        )
        .unwrap();
        assert_eq!(result, EvalTerm::Integer(BigInt::from(5)));
    }

    #[test]
    fn promotes_integer_and_decimal_for_addition() {
        let result = dispatch(
            OperatorSymbol::Add,
            &ctx(),
            &[
                EvalTerm::Integer(BigInt::from(2)),
                EvalTerm::Decimal("1.5".parse().unwrap()),
            ],
        )
        .unwrap();
        assert_eq!(result, EvalTerm::Decimal("3.5".parse().unwrap()));
    }

    #[test]
    fn unknown_overload_is_an_error() {
        let err = dispatch(
            OperatorSymbol::Add,
            &ctx(),
            &[EvalTerm::String("a".into()), EvalTerm::String("b".into())],
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::InvalidArgumentTypes { .. }));
    }

    #[test]
    fn coalesce_requires_at_least_one_argument() {
        assert_eq!(arity(OperatorSymbol::Coalesce), ArityRequirement::AtLeast(1));
        assert_eq!(arity(OperatorSymbol::Concat), ArityRequirement::AtLeast(0));
    }
}
