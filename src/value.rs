//! The typed-value view over RDF terms: classification, numeric promotion,
//! Effective Boolean Value, structural/value equality, and the total order
//! used by `ORDER BY` and the `<`/`>` family.
//!
//! Grounded on `spareval`'s `ExpressionTerm` (`dataset.rs`) and its
//! `equals`/`partial_cmp` free functions (`expression.rs`), adapted to use
//! arbitrary-precision `integer`/`decimal` storage (see `SPEC_FULL.md` §3)
//! and to return `Result` instead of `Option` so evaluation errors carry a
//! taxonomy value instead of being erased.

use crate::error::EvalError;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, Literal, NamedNode, NamedNodeRef, Term};
use oxsdatatypes::{DateTime, Double, Float};
use std::cmp::Ordering;
use std::str::FromStr;

/// The type tag a literal (or non-literal term) is classified under, used
/// as the dispatch key for overload resolution (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    NamedNode,
    BlankNode,
    String,
    LangString,
    Boolean,
    Integer,
    Decimal,
    Float,
    Double,
    DateTime,
    NonLexical,
    Other,
}

impl TypeTag {
    /// Numerics participate in the promotion lattice of §3.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Decimal | Self::Float | Self::Double
        )
    }
}

/// A term lifted into its typed-value view, the representation the
/// evaluator actually computes with. Converts losslessly back into an
/// `oxrdf::Term` via `EvalTerm::into_term`.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalTerm {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    String(String),
    LangString { value: String, language: String },
    Boolean(bool),
    Integer(BigInt),
    Decimal(BigDecimal),
    Float(Float),
    Double(Double),
    DateTime(DateTime),
    /// A literal whose datatype is one of the recognised ones but whose
    /// lexical form does not parse under that datatype's grammar (I1).
    NonLexical { lexical: String, datatype: NamedNode },
    /// A literal with any other datatype IRI, or a datatype we do not model.
    Other { lexical: String, datatype: NamedNode },
}

impl EvalTerm {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::NamedNode(_) => TypeTag::NamedNode,
            Self::BlankNode(_) => TypeTag::BlankNode,
            Self::String(_) => TypeTag::String,
            Self::LangString { .. } => TypeTag::LangString,
            Self::Boolean(_) => TypeTag::Boolean,
            Self::Integer(_) => TypeTag::Integer,
            Self::Decimal(_) => TypeTag::Decimal,
            Self::Float(_) => TypeTag::Float,
            Self::Double(_) => TypeTag::Double,
            Self::DateTime(_) => TypeTag::DateTime,
            Self::NonLexical { .. } => TypeTag::NonLexical,
            Self::Other { .. } => TypeTag::Other,
        }
    }

    /// Effective Boolean Value (§4.1).
    pub fn effective_boolean_value(&self) -> Result<bool, EvalError> {
        match self {
            Self::Boolean(v) => Ok(*v),
            Self::String(v) => Ok(!v.is_empty()),
            Self::LangString { value, .. } => Ok(!value.is_empty()),
            Self::Integer(v) => Ok(!v.is_zero()),
            Self::Decimal(v) => Ok(!v.is_zero()),
            Self::Float(v) => Ok(!(*v == Float::from(0.0f32) || v.is_nan())),
            Self::Double(v) => Ok(!(*v == Double::from(0.) || v.is_nan())),
            Self::NonLexical { .. } => Err(EvalError::Ebv),
            Self::NamedNode(_) | Self::BlankNode(_) | Self::DateTime(_) | Self::Other { .. } => {
                Err(EvalError::Ebv)
            }
        }
    }

    pub fn into_term(self) -> Term {
        match self {
            Self::NamedNode(n) => n.into(),
            Self::BlankNode(n) => n.into(),
            Self::String(v) => Literal::new_simple_literal(v).into(),
            Self::LangString { value, language } => {
                Literal::new_language_tagged_literal_unchecked(value, language).into()
            }
            Self::Boolean(v) => Literal::new_typed_literal(
                if v { "true" } else { "false" },
                xsd::BOOLEAN,
            )
            .into(),
            Self::Integer(v) => Literal::new_typed_literal(v.to_string(), xsd::INTEGER).into(),
            Self::Decimal(v) => {
                Literal::new_typed_literal(format_decimal(&v), xsd::DECIMAL).into()
            }
            Self::Float(v) => Literal::new_typed_literal(v.to_string(), xsd::FLOAT).into(),
            Self::Double(v) => Literal::new_typed_literal(v.to_string(), xsd::DOUBLE).into(),
            Self::DateTime(v) => Literal::new_typed_literal(v.to_string(), xsd::DATE_TIME).into(),
            Self::NonLexical { lexical, datatype } | Self::Other { lexical, datatype } => {
                Literal::new_typed_literal(lexical, datatype).into()
            }
        }
    }

    pub fn datatype_iri(&self) -> NamedNode {
        match self {
            Self::NamedNode(_) | Self::BlankNode(_) => {
                // Not a literal; callers check this before asking for a datatype.
                xsd::STRING.into_owned()
            }
            Self::String(_) => xsd::STRING.into_owned(),
            Self::LangString { .. } => rdf::LANG_STRING.into_owned(),
            Self::Boolean(_) => xsd::BOOLEAN.into_owned(),
            Self::Integer(_) => xsd::INTEGER.into_owned(),
            Self::Decimal(_) => xsd::DECIMAL.into_owned(),
            Self::Float(_) => xsd::FLOAT.into_owned(),
            Self::Double(_) => xsd::DOUBLE.into_owned(),
            Self::DateTime(_) => xsd::DATE_TIME.into_owned(),
            Self::NonLexical { datatype, .. } | Self::Other { datatype, .. } => datatype.clone(),
        }
    }
}

impl From<bool> for EvalTerm {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<Term> for EvalTerm {
    fn from(term: Term) -> Self {
        match term {
            Term::NamedNode(n) => Self::NamedNode(n),
            Term::BlankNode(n) => Self::BlankNode(n),
            Term::Literal(lit) => {
                let (value, datatype, language) = lit.destruct();
                if let Some(language) = language {
                    return Self::LangString { value, language };
                }
                let datatype = datatype.unwrap_or_else(|| xsd::STRING.into_owned());
                classify_literal(&value, datatype)
            }
        }
    }
}

fn classify_literal(value: &str, datatype: NamedNode) -> EvalTerm {
    let dt: NamedNodeRef<'_> = datatype.as_ref();
    if dt == xsd::STRING {
        return EvalTerm::String(value.to_owned());
    }
    if dt == xsd::BOOLEAN {
        return parse_boolean(value)
            .map(EvalTerm::Boolean)
            .unwrap_or_else(|| non_lexical(value, datatype));
    }
    if is_integer_datatype(dt) {
        return parse_xsd_integer(value)
            .map(EvalTerm::Integer)
            .unwrap_or_else(|| non_lexical(value, datatype));
    }
    if dt == xsd::DECIMAL {
        return parse_xsd_decimal(value)
            .map(EvalTerm::Decimal)
            .unwrap_or_else(|| non_lexical(value, datatype));
    }
    if dt == xsd::FLOAT {
        return Float::from_str(value)
            .map(EvalTerm::Float)
            .unwrap_or_else(|_| non_lexical(value, datatype));
    }
    if dt == xsd::DOUBLE {
        return Double::from_str(value)
            .map(EvalTerm::Double)
            .unwrap_or_else(|_| non_lexical(value, datatype));
    }
    if dt == xsd::DATE_TIME {
        return DateTime::from_str(value)
            .map(EvalTerm::DateTime)
            .unwrap_or_else(|_| non_lexical(value, datatype));
    }
    EvalTerm::Other {
        lexical: value.to_owned(),
        datatype,
    }
}

fn non_lexical(value: &str, datatype: NamedNode) -> EvalTerm {
    EvalTerm::NonLexical {
        lexical: value.to_owned(),
        datatype,
    }
}

fn parse_boolean(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn is_integer_datatype(dt: NamedNodeRef<'_>) -> bool {
    dt == xsd::INTEGER
        || dt == xsd::BYTE
        || dt == xsd::SHORT
        || dt == xsd::INT
        || dt == xsd::LONG
        || dt == xsd::UNSIGNED_BYTE
        || dt == xsd::UNSIGNED_SHORT
        || dt == xsd::UNSIGNED_INT
        || dt == xsd::UNSIGNED_LONG
        || dt == xsd::POSITIVE_INTEGER
        || dt == xsd::NEGATIVE_INTEGER
        || dt == xsd::NON_POSITIVE_INTEGER
        || dt == xsd::NON_NEGATIVE_INTEGER
}

/// `xsd:integer` lexical grammar: an optional sign, then one or more ASCII
/// digits, with no leading zero unless the whole value is `"0"`.
pub fn parse_xsd_integer(value: &str) -> Option<BigInt> {
    let (sign, digits) = split_sign(value)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    let mut n = BigInt::from_str(digits).ok()?;
    if sign == Sign::Minus {
        n = -n;
    }
    Some(n)
}

/// `xsd:decimal` lexical grammar: `xsd:integer`'s sign/digit prefix, an
/// optional `.`, then a fractional digit run (also digits-only).
pub fn parse_xsd_decimal(value: &str) -> Option<BigDecimal> {
    let (sign, rest) = split_sign(value)?;
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };
    if int_part.is_empty() && frac_part.map(str::is_empty).unwrap_or(true) {
        return None;
    }
    if !int_part.is_empty() {
        if !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if int_part.len() > 1 && int_part.starts_with('0') {
            return None;
        }
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    let canonical = format!(
        "{}{}{}",
        if sign == Sign::Minus { "-" } else { "" },
        if int_part.is_empty() { "0" } else { int_part },
        frac_part.map(|f| format!(".{f}")).unwrap_or_default()
    );
    BigDecimal::from_str(&canonical).ok()
}

#[derive(PartialEq, Eq)]
enum Sign {
    Plus,
    Minus,
}

fn split_sign(value: &str) -> Option<(Sign, &str)> {
    match value.as_bytes().first() {
        Some(b'+') => Some((Sign::Plus, &value[1..])),
        Some(b'-') => Some((Sign::Minus, &value[1..])),
        Some(_) => Some((Sign::Plus, value)),
        None => None,
    }
}

pub fn format_decimal(v: &BigDecimal) -> String {
    let normalized = v.normalized();
    let s = normalized.to_string();
    // BigDecimal's Display never adds a redundant leading `+`; XSD canonical
    // form requires at least one fractional digit for values without one.
    if s.contains('.') { s } else { format!("{s}.0") }
}

/// The numeric promotion lattice of §3: `integer < decimal < float < double`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NumericTag {
    Integer,
    Decimal,
    Float,
    Double,
}

impl NumericTag {
    pub fn of(tag: TypeTag) -> Option<Self> {
        match tag {
            TypeTag::Integer => Some(Self::Integer),
            TypeTag::Decimal => Some(Self::Decimal),
            TypeTag::Float => Some(Self::Float),
            TypeTag::Double => Some(Self::Double),
            _ => None,
        }
    }

    pub fn join(self, other: Self) -> Self {
        self.max(other)
    }

    pub fn type_tag(self) -> TypeTag {
        match self {
            Self::Integer => TypeTag::Integer,
            Self::Decimal => TypeTag::Decimal,
            Self::Float => TypeTag::Float,
            Self::Double => TypeTag::Double,
        }
    }
}

/// A pair of operands promoted to a common numeric representation, ready
/// for the registry's numeric-promotion retry (§4.2 step 3).
pub enum NumericPair {
    Integer(BigInt, BigInt),
    Decimal(BigDecimal, BigDecimal),
    Float(Float, Float),
    Double(Double, Double),
}

impl NumericPair {
    pub fn new(
        operator: crate::operator::OperatorSymbol,
        a: &EvalTerm,
        b: &EvalTerm,
    ) -> Result<Self, EvalError> {
        let (Some(ta), Some(tb)) = (NumericTag::of(a.type_tag()), NumericTag::of(b.type_tag()))
        else {
            return Err(EvalError::InvalidArgumentTypes {
                operator,
                operand_types: vec![a.type_tag(), b.type_tag()],
            });
        };
        let join = ta.join(tb);
        Ok(match join {
            NumericTag::Integer => Self::Integer(to_integer(operator, a)?, to_integer(operator, b)?),
            NumericTag::Decimal => Self::Decimal(to_decimal(operator, a)?, to_decimal(operator, b)?),
            NumericTag::Float => Self::Float(to_float(operator, a)?, to_float(operator, b)?),
            NumericTag::Double => Self::Double(to_double(operator, a)?, to_double(operator, b)?),
        })
    }
}

fn to_integer(operator: crate::operator::OperatorSymbol, t: &EvalTerm) -> Result<BigInt, EvalError> {
    match t {
        EvalTerm::Integer(v) => Ok(v.clone()),
        _ => Err(promotion_error(operator, t)),
    }
}

fn to_decimal(operator: crate::operator::OperatorSymbol, t: &EvalTerm) -> Result<BigDecimal, EvalError> {
    match t {
        EvalTerm::Integer(v) => Ok(BigDecimal::from(v.clone())),
        EvalTerm::Decimal(v) => Ok(v.clone()),
        _ => Err(promotion_error(operator, t)),
    }
}

fn to_float(operator: crate::operator::OperatorSymbol, t: &EvalTerm) -> Result<Float, EvalError> {
    match t {
        EvalTerm::Integer(v) => Ok(Float::from(v.to_f32().unwrap_or(f32::NAN))),
        EvalTerm::Decimal(v) => Ok(Float::from(v.to_f32().unwrap_or(f32::NAN))),
        EvalTerm::Float(v) => Ok(*v),
        _ => Err(promotion_error(operator, t)),
    }
}

fn to_double(operator: crate::operator::OperatorSymbol, t: &EvalTerm) -> Result<Double, EvalError> {
    match t {
        EvalTerm::Integer(v) => Ok(Double::from(v.to_f64().unwrap_or(f64::NAN))),
        EvalTerm::Decimal(v) => Ok(Double::from(v.to_f64().unwrap_or(f64::NAN))),
        EvalTerm::Float(v) => Ok(Double::from(*v)),
        EvalTerm::Double(v) => Ok(*v),
        _ => Err(promotion_error(operator, t)),
    }
}

fn promotion_error(operator: crate::operator::OperatorSymbol, t: &EvalTerm) -> EvalError {
    if let EvalTerm::NonLexical { datatype, .. } = t {
        EvalError::InvalidLexicalForm {
            datatype: datatype.clone(),
        }
    } else {
        EvalError::InvalidArgumentTypes {
            operator,
            operand_types: vec![t.type_tag()],
        }
    }
}

/// SPARQL value equality (`=`), distinct from `sameTerm` (I3).
pub fn value_equals(a: &EvalTerm, b: &EvalTerm) -> Result<bool, EvalError> {
    use EvalTerm::*;
    Ok(match (a, b) {
        (NamedNode(_), NamedNode(_)) | (BlankNode(_), BlankNode(_)) => same_term(a, b),
        (String(x), String(y)) => x == y,
        (LangString { value: x, language: lx }, LangString { value: y, language: ly }) => {
            lx == ly && x == y
        }
        (Boolean(x), Boolean(y)) => x == y,
        (DateTime(x), DateTime(y)) => x == y,
        _ if a.type_tag().is_numeric() && b.type_tag().is_numeric() => {
            numeric_eq(&NumericPair::new(crate::operator::OperatorSymbol::Equal, a, b)?)
        }
        (NonLexical { datatype, .. }, _) | (_, NonLexical { datatype, .. }) => {
            return Err(EvalError::InvalidLexicalForm {
                datatype: datatype.clone(),
            })
        }
        // Two literals of the same unrecognized datatype are equal by
        // sameTerm (identical lexical form); any other pairing involving
        // an `Other`-typed literal may or may not denote the same value,
        // which this evaluator cannot know, so `=` raises rather than
        // guessing `false`.
        (Other { .. }, Other { .. }) => {
            if same_term(a, b) {
                true
            } else {
                return Err(incomparable(a, b));
            }
        }
        (String(_) | LangString { .. } | Boolean(_) | DateTime(_), Other { .. })
        | (Other { .. }, String(_) | LangString { .. } | Boolean(_) | DateTime(_)) => {
            return Err(incomparable(a, b))
        }
        _ if (a.type_tag().is_numeric() && matches!(b, Other { .. }))
            || (matches!(a, Other { .. }) && b.type_tag().is_numeric()) =>
        {
            return Err(incomparable(a, b))
        }
        _ => false,
    })
}

fn numeric_eq(pair: &NumericPair) -> bool {
    match pair {
        NumericPair::Integer(x, y) => x == y,
        NumericPair::Decimal(x, y) => x == y,
        NumericPair::Float(x, y) => x == y,
        NumericPair::Double(x, y) => x == y,
    }
}

/// `sameTerm`: structural equality on (variant, iri/label/lexical/datatype/language) (I3).
pub fn same_term(a: &EvalTerm, b: &EvalTerm) -> bool {
    use EvalTerm::*;
    match (a, b) {
        (NamedNode(x), NamedNode(y)) => x == y,
        (BlankNode(x), BlankNode(y)) => x == y,
        (String(x), String(y)) => x == y,
        (LangString { value: x, language: lx }, LangString { value: y, language: ly }) => {
            x == y && lx == ly
        }
        (Boolean(x), Boolean(y)) => x == y,
        (Integer(x), Integer(y)) => x == y,
        (Decimal(x), Decimal(y)) => x == y,
        (Float(x), Float(y)) => x.is_identical_with(*y),
        (Double(x), Double(y)) => x.is_identical_with(*y),
        (DateTime(x), DateTime(y)) => x == y,
        (NonLexical { lexical: lx, datatype: dx }, NonLexical { lexical: ly, datatype: dy })
        | (Other { lexical: lx, datatype: dx }, Other { lexical: ly, datatype: dy }) => {
            lx == ly && dx == dy
        }
        _ => false,
    }
}

fn incomparable(a: &EvalTerm, b: &EvalTerm) -> EvalError {
    EvalError::InvalidCompare {
        left: a.type_tag(),
        right: b.type_tag(),
    }
}

/// The total order used by `ORDER BY` and by `<`/`>`/`<=`/`>=` when both
/// sides fall in the same comparison category (§4.1).
pub fn compare(a: &EvalTerm, b: &EvalTerm) -> Result<Ordering, EvalError> {
    use EvalTerm::*;
    match (a, b) {
        (BlankNode(x), BlankNode(y)) => Ok(x.as_str().cmp(y.as_str())),
        (NamedNode(x), NamedNode(y)) => Ok(x.as_str().cmp(y.as_str())),
        (BlankNode(_), _) => Ok(Ordering::Less),
        (_, BlankNode(_)) => Ok(Ordering::Greater),
        (NamedNode(_), _) => Ok(Ordering::Less),
        (_, NamedNode(_)) => Ok(Ordering::Greater),
        _ if a.type_tag().is_numeric() && b.type_tag().is_numeric() => {
            numeric_cmp(&NumericPair::new(crate::operator::OperatorSymbol::Less, a, b)?)
        }
        (String(x), String(y)) => Ok(x.cmp(y)),
        (LangString { value: x, language: lx }, LangString { value: y, language: ly }) => {
            Ok((lx, x).cmp(&(ly, y)))
        }
        (DateTime(x), DateTime(y)) => {
            x.partial_cmp(y).ok_or_else(|| incomparable(a, b))
        }
        (NonLexical { datatype, .. }, _) | (_, NonLexical { datatype, .. }) => {
            Err(EvalError::InvalidLexicalForm {
                datatype: datatype.clone(),
            })
        }
        _ => Err(incomparable(a, b)),
    }
}

fn numeric_cmp(pair: &NumericPair) -> Result<Ordering, EvalError> {
    match pair {
        NumericPair::Integer(x, y) => Ok(x.cmp(y)),
        NumericPair::Decimal(x, y) => Ok(x.cmp(y)),
        NumericPair::Float(x, y) => x.partial_cmp(y).ok_or(EvalError::InvalidCompare {
            left: TypeTag::Float,
            right: TypeTag::Float,
        }),
        NumericPair::Double(x, y) => x.partial_cmp(y).ok_or(EvalError::InvalidCompare {
            left: TypeTag::Double,
            right: TypeTag::Double,
        }),
    }
}
