//! Interception, stubbing and verification core for doppel test doubles.
//!
//! A [`MockContext`] scopes one test. It creates [`Mock`]s, and every call
//! made through a mock is recorded with a context-wide sequence number before
//! it is answered. Stubbing and verification read like the test they belong
//! to:
//!
//! ```ignore
//! let ctx = MockContext::new();
//! let person = ctx.mock(person_type());
//!
//! given(&person, |p| p.call("ride", [json!("bike")]))?.will_return(true)?;
//! assert_eq!(person.call("ride", [json!("bike")]), Ok(json!(true)));
//!
//! then(&person)?.should().called(|p| p.call("ride", [json!("bike")]))?;
//! ```
//!
//! Hand-written substitutes implement [`MockTarget`] and route their methods
//! through an inner [`Mock`]; anything else passed to an entry point is
//! rejected with `NotAMock`.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::must_use_candidate)] // Builders are consumed by their terminal calls

mod bdd;
mod context;
mod dispatch;
pub mod matching;
mod mock;
mod ordering;
mod recorder;
mod stubbing;
mod verification;

pub use bdd::{
    OngoingStubbing, Stubber, given, will_answer, will_call_real_method, will_do_nothing,
    will_return, will_throw, will_throw_kind,
};
pub use context::MockContext;
pub use dispatch::{NO_SUCH_METHOD, WRONG_RETURN_TYPE};
pub use mock::{Mock, MockSettings, MockTarget, RealMethods};
pub use ordering::InOrder;
pub use verification::{Should, Then, then};

pub use doppel_config::{
    CONFIG_ENV_VAR, ConfigError, DefaultAnswer, DefaultCardinality, DoppelConfig,
};
pub use doppel_types::{
    Answer, ArgKind, ArgPredicate, CallPattern, DoppelError, ErrorKind, Invocation,
    InvocationSummary, Matcher, MethodSignature, MockId, Outcome, ReturnType, Sequence,
    StubConfigError, Thrown, Times, TypeDescriptor, Value,
};
