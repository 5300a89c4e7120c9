//! The context a host supplies for one evaluation run: the numeric/
//! extension-function context regular operators see (`FunctionContext`),
//! the extension-function registry special `NamedExpression` calls
//! dispatch through, and an optional cancellation check.
//!
//! Grounded on `spareval::eval::SimpleEvaluator`, which bundles the same
//! kind of per-query state (`base_iri`, `now`, a custom-function map) into
//! one struct built once per query rather than threaded as loose
//! arguments through every evaluator call.

use crate::error::EvalError;
use crate::expr::ExtensionFunctions;
use crate::registry::FunctionContext;
use std::sync::Arc;

/// Everything `evaluate` needs beyond the expression tree and the
/// solution mapping.
#[derive(Clone)]
pub struct EvalContext {
    pub functions: FunctionContext,
    pub extensions: Arc<ExtensionFunctions>,
    /// Polled before descending into each subexpression; lets a host
    /// abort a runaway evaluation (deeply nested `COALESCE`/`IN`, a
    /// pathological regex) without unsafe interruption.
    pub cancelled: Option<Arc<dyn Fn() -> bool + Send + Sync>>,
}

impl EvalContext {
    pub fn new(functions: FunctionContext) -> Self {
        Self {
            functions,
            extensions: Arc::new(ExtensionFunctions::default()),
            cancelled: None,
        }
    }

    pub fn with_extensions(mut self, extensions: Arc<ExtensionFunctions>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_cancellation(mut self, check: Arc<dyn Fn() -> bool + Send + Sync>) -> Self {
        self.cancelled = Some(check);
        self
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), EvalError> {
        if self.cancelled.as_ref().is_some_and(|check| check()) {
            return Err(EvalError::Cancelled);
        }
        Ok(())
    }
}
