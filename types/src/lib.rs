//! Core data types for doppel.
//!
//! This crate contains the pure records the interception core passes around:
//! identities, values, method signatures, call patterns, answers, invocations
//! and the structured failures handed back to a test. Nothing here performs IO
//! or takes a lock; behaviour lives in `doppel-core`.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod answer;
mod error;
mod ids;
mod invocation;
mod matcher;
mod signature;
mod times;
mod value;

pub use answer::{Answer, AnswerFn};
pub use error::{DoppelError, ErrorKind, StubConfigError};
pub use ids::{MockId, Sequence};
pub use invocation::{Invocation, InvocationSummary, Outcome};
pub use matcher::{ArgPredicate, CallPattern, Matcher};
pub use serde_json::Value;
pub use signature::{MethodSignature, TypeDescriptor};
pub use times::Times;
pub use value::{ArgKind, ReturnType, Thrown, render_args, render_value};
