//! Recorded calls.

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;
use serde_json::Value;

use crate::ids::{MockId, Sequence};
use crate::signature::MethodSignature;
use crate::value::{Thrown, render_args};

/// What a recorded call actually did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// An explicit stub produced this value.
    Stubbed(Value),
    /// No stub matched; the return type's zero value was produced.
    Defaulted(Value),
    /// An explicit do-nothing answer ran.
    DidNothing,
    Threw(Thrown),
    /// The real implementation ran and produced this result.
    CalledReal(Result<Value, Thrown>),
}

impl Outcome {
    /// The result the caller observed.
    #[must_use]
    pub fn result(&self) -> Result<Value, Thrown> {
        match self {
            Outcome::Stubbed(value) | Outcome::Defaulted(value) => Ok(value.clone()),
            Outcome::DidNothing => Ok(Value::Null),
            Outcome::Threw(thrown) => Err(thrown.clone()),
            Outcome::CalledReal(result) => result.clone(),
        }
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Outcome::Defaulted(_))
    }
}

/// One call made through a mock.
///
/// Everything but the outcome is fixed at creation. The outcome is written
/// exactly once, after the answer ran, and never changes afterwards.
#[derive(Debug)]
pub struct Invocation {
    mock: MockId,
    mock_name: String,
    signature: MethodSignature,
    args: Vec<Value>,
    sequence: Sequence,
    mock_sequence: u64,
    outcome: OnceLock<Outcome>,
}

impl Invocation {
    pub fn new(
        mock: MockId,
        mock_name: impl Into<String>,
        signature: MethodSignature,
        args: Vec<Value>,
        sequence: Sequence,
        mock_sequence: u64,
    ) -> Self {
        Self {
            mock,
            mock_name: mock_name.into(),
            signature,
            args,
            sequence,
            mock_sequence,
            outcome: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn mock(&self) -> MockId {
        self.mock
    }

    #[must_use]
    pub fn mock_name(&self) -> &str {
        &self.mock_name
    }

    #[must_use]
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Context-wide position of this call.
    #[must_use]
    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    /// Position of this call among its own mock's calls, starting at 1.
    #[must_use]
    pub fn mock_sequence(&self) -> u64 {
        self.mock_sequence
    }

    /// `None` while the answer is still running.
    #[must_use]
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.get()
    }

    /// Store the outcome. A second attempt is refused and hands the value back.
    pub fn realize(&self, outcome: Outcome) -> Result<(), Outcome> {
        self.outcome.set(outcome)
    }

    #[must_use]
    pub fn summary(&self) -> InvocationSummary {
        InvocationSummary {
            mock: self.mock_name.clone(),
            call: self.to_string(),
            sequence: self.sequence,
            outcome: self.outcome().cloned(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({})",
            self.mock_name,
            self.signature.name(),
            render_args(&self.args)
        )
    }
}

/// Serializable snapshot of an invocation, carried in failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationSummary {
    pub mock: String,
    pub call: String,
    pub sequence: Sequence,
    pub outcome: Option<Outcome>,
}

impl fmt::Display for InvocationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.sequence, self.call)
    }
}
