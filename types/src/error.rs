//! Structured failures.
//!
//! Configuration errors (`NotAMock`, `StubConfiguration`, `NotInOrderSession`,
//! `EmptyInOrder`) mean the test itself is wrong and are raised as soon as
//! the misuse is seen. Verification errors are the expected way for a test
//! to fail and carry the wanted pattern plus the invocations that were
//! actually recorded.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::ids::Sequence;
use crate::invocation::InvocationSummary;
use crate::times::Times;
use crate::value::ReturnType;

/// Misconfigured stubbing, detected when the stub is registered.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StubConfigError {
    #[error("{method} takes {expected} argument(s) but {actual} matcher(s) were given")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },
    #[error("{mock} has no method {method}")]
    UnknownMethod { mock: String, method: String },
    #[error("no answers configured for {pattern}")]
    EmptyAnswers { pattern: String },
    #[error("{method} returns nothing and cannot be stubbed with a return value")]
    ReturnOnVoid { method: String },
    #[error("only unit methods can do nothing, {method} returns {returns}")]
    NoOpOnNonVoid { method: String, returns: ReturnType },
    #[error("{method} returns {expected}, which cannot hold {value}")]
    WrongReturnType {
        method: String,
        expected: ReturnType,
        value: Value,
    },
    #[error("{mock} has no real implementation to call for {method}")]
    NoRealMethods { mock: String, method: String },
    #[error("the stubbing closure did not call any mock")]
    NoCallCaptured,
    #[error("the closure called {actual} but {expected} was the target")]
    WrongMockCaptured { expected: String, actual: String },
    #[error("unfinished stubbing of {pattern}: no answer was given")]
    UnfinishedStubbing { pattern: String },
}

/// Coarse classification of a [`DoppelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotAMock,
    StubConfiguration,
    NotInOrderSession,
    EmptyInOrder,
    WantedButNotInvoked,
    TooManyInvocations,
    UnwantedInteraction,
    VerificationOrderFailure,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DoppelError {
    #[error("{target} is not a mock")]
    NotAMock { target: String },

    #[error(transparent)]
    StubConfiguration(#[from] StubConfigError),

    #[error("{mock} was not part of this in-order session")]
    NotInOrderSession { mock: String },

    #[error("in-order verification needs at least one mock")]
    EmptyInOrder,

    #[error("wanted but not invoked: {wanted} {cardinality}, but was invoked {actual} time(s)")]
    WantedButNotInvoked {
        wanted: String,
        cardinality: Times,
        actual: usize,
        /// Calls of the same method with other arguments.
        similar: Vec<InvocationSummary>,
        arguments_diff: Option<String>,
    },

    #[error("too many invocations: {wanted} {cardinality}, but was invoked {actual} time(s)")]
    TooManyInvocations {
        wanted: String,
        cardinality: Times,
        actual: usize,
        invocations: Vec<InvocationSummary>,
    },

    #[error("unwanted interactions on {mock}: {}", render_summaries(.invocations))]
    UnwantedInteractions {
        mock: String,
        invocations: Vec<InvocationSummary>,
    },

    #[error(
        "verification in order failed: {wanted} {cardinality}, found {actual} time(s) after the last verified call"
    )]
    VerificationOrderFailure {
        wanted: String,
        cardinality: Times,
        /// Matches strictly after the cursor.
        actual: usize,
        /// Sequence of the last call consumed in this session.
        cursor: Option<Sequence>,
        /// Matches at or before the cursor: happened, but out of order.
        earlier: Vec<InvocationSummary>,
    },
}

impl DoppelError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DoppelError::NotAMock { .. } => ErrorKind::NotAMock,
            DoppelError::StubConfiguration(_) => ErrorKind::StubConfiguration,
            DoppelError::NotInOrderSession { .. } => ErrorKind::NotInOrderSession,
            DoppelError::EmptyInOrder => ErrorKind::EmptyInOrder,
            DoppelError::WantedButNotInvoked { .. } => ErrorKind::WantedButNotInvoked,
            DoppelError::TooManyInvocations { .. } => ErrorKind::TooManyInvocations,
            DoppelError::UnwantedInteractions { .. } => ErrorKind::UnwantedInteraction,
            DoppelError::VerificationOrderFailure { .. } => ErrorKind::VerificationOrderFailure,
        }
    }

    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotAMock
                | ErrorKind::StubConfiguration
                | ErrorKind::NotInOrderSession
                | ErrorKind::EmptyInOrder
        )
    }

    #[must_use]
    pub fn is_verification(&self) -> bool {
        !self.is_configuration()
    }
}

fn render_summaries(invocations: &[InvocationSummary]) -> String {
    invocations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
