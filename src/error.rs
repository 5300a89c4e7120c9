use crate::operator::OperatorSymbol;
use crate::value::TypeTag;
use oxrdf::{NamedNode, Variable};

/// An error raised while evaluating a SPARQL expression.
///
/// Errors are values, not panics: the tree evaluator never swallows one
/// silently except where §4.3's special forms explicitly catch and
/// recombine sub-errors (`COALESCE`, `IN`/`NOT IN`, `||`, `&&`).
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum EvalError {
    /// A `VariableExpression` looked up a name absent from the mapping.
    #[error("variable {0} is not bound in the current solution mapping")]
    UnboundVariable(Variable),

    /// Overload dispatch found no table entry for `operator` over `operand_types`,
    /// and numeric promotion (if attempted) did not rescue it.
    #[error("no overload of {operator:?} for operand types {operand_types:?}")]
    InvalidArgumentTypes {
        operator: OperatorSymbol,
        operand_types: Vec<TypeTag>,
    },

    /// An operator or named function was applied to the wrong number of operands.
    #[error("{operator:?} expects {expected} argument(s), got {actual}")]
    InvalidArity {
        operator: OperatorSymbol,
        expected: ArityRequirement,
        actual: usize,
    },

    /// A `nonLexical` literal reached an operation that requires a valid typed value.
    #[error("literal with datatype {datatype} has an invalid lexical form for that datatype")]
    InvalidLexicalForm { datatype: NamedNode },

    /// `<` `>` `<=` `>=` compared two literals from incomparable categories.
    #[error("values of type {left:?} and {right:?} are not ordered")]
    InvalidCompare { left: TypeTag, right: TypeTag },

    /// Effective Boolean Value coercion failed for a non-coercible term.
    #[error("term cannot be coerced to an effective boolean value")]
    Ebv,

    /// Every branch of a `COALESCE` failed.
    #[error("all {} COALESCE branches failed", .0.len())]
    Coalesce(Vec<EvalError>),

    /// `IN`/`NOT IN` exhausted its list without a match, but saw errors along the way.
    #[error("IN found no match and {} member(s) raised an error", .0.len())]
    In(Vec<EvalError>),

    /// A `NamedExpression` referenced an IRI absent from the extension registry.
    #[error("no extension function is registered for {0}")]
    UnknownNamedOperator(NamedNode),

    /// An `AggregateExpression` reached the evaluator; aggregates must be
    /// resolved by the surrounding query engine before evaluation.
    #[error("aggregate expressions cannot be evaluated directly")]
    UnexpectedAggregate,

    /// The host signalled cancellation.
    #[error("evaluation was cancelled")]
    Cancelled,

    /// An `xsd:*` cast function was given a value it cannot convert.
    #[error("cannot cast {lexical:?} (of type {from:?}) to {to}")]
    Cast {
        lexical: String,
        from: TypeTag,
        to: NamedNode,
    },

    /// An `EXISTS`/`NOT EXISTS` or extension-function hook reported its own error.
    #[error(transparent)]
    Hook(#[from] std::sync::Arc<dyn std::error::Error + Send + Sync>),
}

/// How many operands an operator or special form declares, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityRequirement {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl std::fmt::Display for ArityRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "exactly {n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
            Self::Range(lo, hi) => write!(f, "between {lo} and {hi}"),
        }
    }
}
