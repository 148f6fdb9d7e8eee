//! Answers: what a stubbed call does.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::invocation::Invocation;
use crate::value::{Thrown, render_value};

/// Function answer, computed from the invocation being answered.
pub type AnswerFn = Arc<dyn Fn(&Invocation) -> Result<Value, Thrown> + Send + Sync>;

/// Behaviour executed once per matching call.
#[derive(Clone)]
pub enum Answer {
    Return(Value),
    Throw(Thrown),
    /// Delegate to the mock's real implementation.
    CallRealMethod,
    /// Explicit do-nothing, only valid for unit methods.
    NoOp,
    Computed(AnswerFn),
}

impl Answer {
    pub fn computed(
        f: impl Fn(&Invocation) -> Result<Value, Thrown> + Send + Sync + 'static,
    ) -> Self {
        Answer::Computed(Arc::new(f))
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Answer::Return(value) => format!("return {}", render_value(value)),
            Answer::Throw(thrown) => format!("throw {thrown}"),
            Answer::CallRealMethod => "call real method".to_string(),
            Answer::NoOp => "do nothing".to_string(),
            Answer::Computed(_) => "computed answer".to_string(),
        }
    }
}

impl fmt::Debug for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Return(value) => f.debug_tuple("Return").field(value).finish(),
            Answer::Throw(thrown) => f.debug_tuple("Throw").field(thrown).finish(),
            Answer::CallRealMethod => f.write_str("CallRealMethod"),
            Answer::NoOp => f.write_str("NoOp"),
            Answer::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}
