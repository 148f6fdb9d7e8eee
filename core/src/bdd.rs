//! BDD-style stubbing.
//!
//! Two orderings are supported. Configure-then-answer names the call first:
//!
//! ```ignore
//! given(&person, |p| p.ride("bike"))?.will_return(true)?;
//! ```
//!
//! Answer-then-configure starts from the behaviour, which reads better for
//! unit methods:
//!
//! ```ignore
//! will_throw_kind("IllegalStateException").given(&person, |p| p.reset())?;
//! ```
//!
//! Naming the call runs the closure in capture mode: the mock call inside it
//! becomes an exact-value pattern and is neither recorded nor answered.

use std::borrow::Cow;
use std::mem;
use std::thread;

use doppel_types::{
    Answer, CallPattern, DoppelError, Invocation, Matcher, StubConfigError, Thrown, Value,
};

use crate::context::{register_stub, register_validated};
use crate::mock::{Mock, MockTarget, resolve_target};
use crate::stubbing::validate_answer;

/// Run `call` against `target` in capture mode and turn the single mock call
/// it makes into an exact-value pattern.
pub(crate) fn capture_pattern<T, R>(
    mock: &Mock,
    target: &T,
    call: impl FnOnce(&T) -> R,
) -> Result<CallPattern, DoppelError>
where
    T: MockTarget + ?Sized,
{
    let captured = mock.ctx.capture(|| {
        let _ = call(target);
    })?;
    if captured.mock != mock.id() {
        return Err(StubConfigError::WrongMockCaptured {
            expected: format!("{}{}", mock.name(), mock.id()),
            actual: format!("{}{}", captured.mock_name, captured.mock),
        }
        .into());
    }
    Ok(CallPattern::exact(captured.signature, &captured.args)?)
}

/// Start stubbing the call `call` makes on `target`.
///
/// The rule becomes active when the returned builder is dropped. A builder
/// kept in a `let` binding does not answer calls until it goes out of scope,
/// so finish it with [`OngoingStubbing::mock`] or drop it explicitly first.
pub fn given<'a, T, R>(
    target: &'a T,
    call: impl FnOnce(&T) -> R,
) -> Result<OngoingStubbing<'a, T>, DoppelError>
where
    T: MockTarget + ?Sized,
{
    let mock = resolve_target(target)?;
    mock.ctx.check_unfinished()?;
    let pattern = capture_pattern(&mock, target, call)?;
    Ok(OngoingStubbing {
        target,
        mock,
        pattern,
        answers: Vec::new(),
        abandoned: false,
    })
}

/// A call pattern waiting for its answers.
///
/// Every `will_*` call appends one answer, validated on the spot. The rule is
/// registered when the builder is dropped; dropping it before any answer was
/// given leaves an unfinished stubbing that the next entry point reports.
pub struct OngoingStubbing<'a, T: MockTarget + ?Sized> {
    target: &'a T,
    mock: Mock,
    pattern: CallPattern,
    answers: Vec<Answer>,
    abandoned: bool,
}

impl<'a, T: MockTarget + ?Sized> OngoingStubbing<'a, T> {
    /// Replace the captured argument values with explicit matchers.
    pub fn matching(mut self, matchers: Vec<Matcher>) -> Result<Self, DoppelError> {
        match self.pattern.clone().with_matchers(matchers) {
            Ok(pattern) => {
                self.pattern = pattern;
                Ok(self)
            }
            Err(err) => {
                self.abandoned = true;
                Err(err.into())
            }
        }
    }

    pub fn will_return(self, value: impl Into<Value>) -> Result<Self, DoppelError> {
        self.push(Answer::Return(value.into()))
    }

    pub fn will_throw(self, thrown: Thrown) -> Result<Self, DoppelError> {
        self.push(Answer::Throw(thrown))
    }

    pub fn will_throw_kind(
        self,
        kind: impl Into<Cow<'static, str>>,
    ) -> Result<Self, DoppelError> {
        self.push(Answer::Throw(Thrown::of_kind(kind)))
    }

    pub fn will_answer(
        self,
        answer: impl Fn(&Invocation) -> Result<Value, Thrown> + Send + Sync + 'static,
    ) -> Result<Self, DoppelError> {
        self.push(Answer::computed(answer))
    }

    /// Alias of [`will_answer`](Self::will_answer).
    pub fn will(
        self,
        answer: impl Fn(&Invocation) -> Result<Value, Thrown> + Send + Sync + 'static,
    ) -> Result<Self, DoppelError> {
        self.will_answer(answer)
    }

    pub fn will_call_real_method(self) -> Result<Self, DoppelError> {
        self.push(Answer::CallRealMethod)
    }

    pub fn will_do_nothing(self) -> Result<Self, DoppelError> {
        self.push(Answer::NoOp)
    }

    /// Finish the stubbing and hand back the stubbed target.
    pub fn mock(self) -> &'a T {
        self.target
    }

    fn push(mut self, answer: Answer) -> Result<Self, DoppelError> {
        if let Err(err) = validate_answer(
            self.mock.name(),
            self.mock.has_real_methods(),
            self.pattern.signature(),
            &answer,
        ) {
            self.abandoned = true;
            return Err(err.into());
        }
        self.answers.push(answer);
        Ok(self)
    }
}

impl<T: MockTarget + ?Sized> Drop for OngoingStubbing<'_, T> {
    fn drop(&mut self) {
        if self.abandoned || thread::panicking() {
            return;
        }
        if self.answers.is_empty() {
            self.mock
                .ctx
                .note_unfinished(format!("{}.{}", self.mock.name(), self.pattern));
            return;
        }
        let answers = mem::take(&mut self.answers);
        register_validated(&self.mock, self.pattern.clone(), answers);
    }
}

/// Answers collected before the call they apply to is known.
#[derive(Debug, Default, Clone)]
#[must_use = "a stubber does nothing until it is bound with `given`"]
pub struct Stubber {
    answers: Vec<Answer>,
}

impl Stubber {
    pub fn will_return(mut self, value: impl Into<Value>) -> Self {
        self.answers.push(Answer::Return(value.into()));
        self
    }

    pub fn will_throw(mut self, thrown: Thrown) -> Self {
        self.answers.push(Answer::Throw(thrown));
        self
    }

    pub fn will_throw_kind(mut self, kind: impl Into<Cow<'static, str>>) -> Self {
        self.answers.push(Answer::Throw(Thrown::of_kind(kind)));
        self
    }

    pub fn will_answer(
        mut self,
        answer: impl Fn(&Invocation) -> Result<Value, Thrown> + Send + Sync + 'static,
    ) -> Self {
        self.answers.push(Answer::computed(answer));
        self
    }

    pub fn will_do_nothing(mut self) -> Self {
        self.answers.push(Answer::NoOp);
        self
    }

    pub fn will_call_real_method(mut self) -> Self {
        self.answers.push(Answer::CallRealMethod);
        self
    }

    /// Bind the answers to the call `call` makes on `target`.
    pub fn given<T, R>(self, target: &T, call: impl FnOnce(&T) -> R) -> Result<(), DoppelError>
    where
        T: MockTarget + ?Sized,
    {
        let mock = resolve_target(target)?;
        mock.ctx.check_unfinished()?;
        let pattern = capture_pattern(&mock, target, call)?;
        register_stub(&mock, pattern, self.answers)
    }

    /// Bind the answers to an explicit pattern.
    pub fn given_pattern(self, mock: &Mock, pattern: CallPattern) -> Result<(), DoppelError> {
        let mock = resolve_target(mock)?;
        mock.ctx.check_unfinished()?;
        register_stub(&mock, pattern, self.answers)
    }
}

pub fn will_return(value: impl Into<Value>) -> Stubber {
    Stubber::default().will_return(value)
}

pub fn will_throw(thrown: Thrown) -> Stubber {
    Stubber::default().will_throw(thrown)
}

pub fn will_throw_kind(kind: impl Into<Cow<'static, str>>) -> Stubber {
    Stubber::default().will_throw_kind(kind)
}

pub fn will_answer(
    answer: impl Fn(&Invocation) -> Result<Value, Thrown> + Send + Sync + 'static,
) -> Stubber {
    Stubber::default().will_answer(answer)
}

pub fn will_do_nothing() -> Stubber {
    Stubber::default().will_do_nothing()
}

pub fn will_call_real_method() -> Stubber {
    Stubber::default().will_call_real_method()
}
