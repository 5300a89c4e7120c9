//! The operator symbol alphabet shared by `OperatorExpression` nodes.
//!
//! A single AST variant (`Expression::Operator`) carries one of these
//! symbols plus an ordered argument list; the tree evaluator (§4.4) decides
//! whether to route to the regular dispatcher (§4.2, `registry.rs`) or to
//! the special-form evaluator (§4.3, `special_forms.rs`) purely by asking
//! [`OperatorSymbol::is_special`]. This mirrors the distilled spec's design
//! note (§9) that special forms are "a distinct sum-variant... the regular
//! dispatcher never sees them," implemented here as a predicate over one
//! flat enum rather than two separate enums, so the AST keeps a single
//! `OperatorExpression` shape as §3 specifies.

use crate::value::TypeTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorSymbol {
    // Comparison
    Equal,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    UnaryPlus,
    UnaryMinus,
    // Unary logical
    Not,
    // Term inspection / construction
    Str,
    Lang,
    LangMatches,
    Datatype,
    IsIri,
    IsBlank,
    IsLiteral,
    IsNumeric,
    Iri,
    BNode,
    StrDt,
    StrLang,
    Uuid,
    StrUuid,
    // Strings
    StrLen,
    SubStr,
    UCase,
    LCase,
    StrStarts,
    StrEnds,
    Contains,
    StrBefore,
    StrAfter,
    Concat,
    EncodeForUri,
    Replace,
    Regex,
    // Numeric functions
    Abs,
    Round,
    Ceil,
    Floor,
    Rand,
    // Date/time
    Now,
    Year,
    Month,
    Day,
    Hours,
    Minutes,
    Seconds,
    Timezone,
    Tz,
    // Hashing
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    // Casts (xsd:string(x), xsd:integer(x), ...)
    Cast(XsdCastTarget),

    // Special forms (§4.3) -- unevaluated-argument functional forms.
    Or,
    And,
    SameTerm,
    Bound,
    If,
    Coalesce,
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XsdCastTarget {
    String,
    Boolean,
    Integer,
    Decimal,
    Float,
    Double,
    DateTime,
}

impl OperatorSymbol {
    /// Special forms receive their arguments unevaluated; see §4.3.
    pub fn is_special(self) -> bool {
        matches!(
            self,
            Self::Or
                | Self::And
                | Self::SameTerm
                | Self::Bound
                | Self::If
                | Self::Coalesce
                | Self::In
                | Self::NotIn
        )
    }
}

/// An operand typed-value tuple used both as the registry's lookup key
/// fragment and in `InvalidArgumentTypesError` diagnostics.
pub type TypeTuple = Vec<TypeTag>;
