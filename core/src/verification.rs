//! Verification: `then(&mock)?.should()...`.

use std::cmp::Reverse;
use std::sync::Arc;

use doppel_types::{
    CallPattern, DoppelError, Invocation, InvocationSummary, Matcher, Times, render_value,
};
use doppel_utils::format_argument_diff;

use crate::bdd::capture_pattern;
use crate::context::lock;
use crate::matching;
use crate::mock::{Mock, MockTarget, resolve_target};
use crate::ordering::InOrder;
use crate::stubbing::validate_pattern;

/// Start verifying interactions with `target`.
///
/// Fails with `NotAMock` before anything else is looked at.
pub fn then<T: MockTarget + ?Sized>(target: &T) -> Result<Then<'_, T>, DoppelError> {
    let mock = resolve_target(target)?;
    mock.ctx.check_unfinished()?;
    Ok(Then { target, mock })
}

#[derive(Debug)]
pub struct Then<'a, T: ?Sized> {
    target: &'a T,
    mock: Mock,
}

impl<'a, T: MockTarget + ?Sized> Then<'a, T> {
    /// Expect a call, by default with the context's default cardinality.
    pub fn should(self) -> Should<'a, 'static, T> {
        let times = self.mock.ctx.defaults.default_times;
        Should {
            target: self.target,
            mock: self.mock,
            times,
            matchers: None,
            session: None,
        }
    }

    /// The mock was never called.
    pub fn should_have_zero_interactions(self) -> Result<(), DoppelError> {
        let history = self.mock.invocations();
        if history.is_empty() {
            return Ok(());
        }
        Err(DoppelError::UnwantedInteractions {
            mock: self.mock.name().to_string(),
            invocations: summaries(&history),
        })
    }

    /// Every call on the mock was matched by a successful verification.
    pub fn should_have_no_more_interactions(self) -> Result<(), DoppelError> {
        let unverified = lock(&self.mock.ctx.recorder).unverified(self.mock.id());
        if unverified.is_empty() {
            return Ok(());
        }
        Err(DoppelError::UnwantedInteractions {
            mock: self.mock.name().to_string(),
            invocations: summaries(&unverified),
        })
    }
}

/// A pending call expectation.
#[derive(Debug)]
pub struct Should<'a, 'o, T: ?Sized> {
    target: &'a T,
    mock: Mock,
    times: Times,
    matchers: Option<Vec<Matcher>>,
    session: Option<&'o mut InOrder>,
}

impl<'a, 'o, T: MockTarget + ?Sized> Should<'a, 'o, T> {
    #[must_use]
    pub fn times(mut self, count: usize) -> Self {
        self.times = Times::Exactly(count);
        self
    }

    #[must_use]
    pub fn never(mut self) -> Self {
        self.times = Times::never();
        self
    }

    #[must_use]
    pub fn at_least(mut self, count: usize) -> Self {
        self.times = Times::AtLeast(count);
        self
    }

    #[must_use]
    pub fn at_most(mut self, count: usize) -> Self {
        self.times = Times::AtMost(count);
        self
    }

    #[must_use]
    pub fn cardinality(mut self, times: Times) -> Self {
        self.times = times;
        self
    }

    /// Replace the argument values named by `called` with matchers.
    #[must_use]
    pub fn with_matchers(mut self, matchers: Vec<Matcher>) -> Self {
        self.matchers = Some(matchers);
        self
    }

    /// Verify as part of an in-order session.
    pub fn in_order<'s>(self, session: &'s mut InOrder) -> Should<'a, 's, T> {
        Should {
            target: self.target,
            mock: self.mock,
            times: self.times,
            matchers: self.matchers,
            session: Some(session),
        }
    }

    /// Verify the call `call` makes on the target.
    pub fn called<R>(self, call: impl FnOnce(&T) -> R) -> Result<(), DoppelError> {
        let mut pattern = capture_pattern(&self.mock, self.target, call)?;
        if let Some(matchers) = self.matchers.clone() {
            pattern = pattern.with_matchers(matchers)?;
        }
        self.verify(&pattern)
    }

    /// Verify calls matching an explicit pattern.
    pub fn matching(self, pattern: CallPattern) -> Result<(), DoppelError> {
        validate_pattern(self.mock.name(), self.mock.descriptor(), &pattern)?;
        self.verify(&pattern)
    }

    fn verify(self, pattern: &CallPattern) -> Result<(), DoppelError> {
        match self.session {
            Some(session) => session.verify(&self.mock, pattern, self.times),
            None => verify_unordered(&self.mock, pattern, self.times),
        }
    }
}

fn verify_unordered(mock: &Mock, pattern: &CallPattern, times: Times) -> Result<(), DoppelError> {
    let history = mock.invocations();
    let (matched, others): (Vec<_>, Vec<_>) = history
        .into_iter()
        .partition(|inv| matching::matches_invocation(pattern, inv));
    let wanted = wanted(mock, pattern);

    if times.too_few(matched.len()) {
        return Err(wanted_but_not_invoked(
            wanted,
            pattern,
            times,
            matched.len(),
            &others,
        ));
    }
    if !times.satisfied_by(matched.len()) {
        return Err(DoppelError::TooManyInvocations {
            wanted,
            cardinality: times,
            actual: matched.len(),
            invocations: summaries(&matched),
        });
    }

    tracing::debug!(%wanted, cardinality = %times, actual = matched.len(), "Verified");
    lock(&mock.ctx.recorder).mark_verified(matched.iter().map(|inv| inv.sequence()));
    Ok(())
}

pub(crate) fn wanted(mock: &Mock, pattern: &CallPattern) -> String {
    format!("{}.{}", mock.name(), pattern)
}

/// Build the failure for a call that was not found often enough.
///
/// `candidates` are calls that did not match; those of the same method are
/// reported as similar, and the closest one is diffed against the pattern.
pub(crate) fn wanted_but_not_invoked(
    wanted: String,
    pattern: &CallPattern,
    times: Times,
    actual: usize,
    candidates: &[Arc<Invocation>],
) -> DoppelError {
    let similar: Vec<&Arc<Invocation>> = candidates
        .iter()
        .filter(|inv| inv.signature() == pattern.signature())
        .collect();
    let arguments_diff = similar
        .iter()
        .max_by_key(|inv| (agreeing_args(pattern, inv), Reverse(inv.sequence())))
        .map(|closest| {
            let wanted_args: Vec<String> =
                pattern.matchers().iter().map(ToString::to_string).collect();
            let actual_args: Vec<String> = closest.args().iter().map(render_value).collect();
            format_argument_diff(&wanted_args, &actual_args)
        })
        .filter(|diff| !diff.is_empty());

    DoppelError::WantedButNotInvoked {
        wanted,
        cardinality: times,
        actual,
        similar: similar.iter().map(|inv| inv.summary()).collect(),
        arguments_diff,
    }
}

fn agreeing_args(pattern: &CallPattern, invocation: &Invocation) -> usize {
    pattern
        .matchers()
        .iter()
        .zip(invocation.args())
        .filter(|(matcher, value)| matching::accepts(matcher, value))
        .count()
}

pub(crate) fn summaries(invocations: &[Arc<Invocation>]) -> Vec<InvocationSummary> {
    invocations.iter().map(|inv| inv.summary()).collect()
}
