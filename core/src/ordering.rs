//! In-order verification across one or more mocks.
//!
//! A session keeps a cursor into the merged history of its mocks. Each
//! successful verification consumes calls strictly after the cursor and moves
//! the cursor to the last one it consumed, so a call can never be claimed
//! twice and later verifications only ever look forward.

use std::fmt;
use std::sync::Arc;

use doppel_types::{CallPattern, DoppelError, Invocation, Sequence, Times};

use crate::context::{ContextShared, lock};
use crate::matching;
use crate::mock::Mock;
use crate::verification::{summaries, wanted, wanted_but_not_invoked};

/// An ordering session created by [`MockContext::in_order`](crate::MockContext::in_order).
pub struct InOrder {
    ctx: Arc<ContextShared>,
    mocks: Vec<Mock>,
    cursor: Option<Sequence>,
}

impl InOrder {
    pub(crate) fn new(ctx: Arc<ContextShared>, mocks: Vec<Mock>) -> Self {
        Self {
            ctx,
            mocks,
            cursor: None,
        }
    }

    /// Sequence number of the last call consumed so far.
    #[must_use]
    pub fn cursor(&self) -> Option<Sequence> {
        self.cursor
    }

    pub(crate) fn verify(
        &mut self,
        mock: &Mock,
        pattern: &CallPattern,
        times: Times,
    ) -> Result<(), DoppelError> {
        if !self.mocks.iter().any(|m| m.is_same(mock)) {
            return Err(DoppelError::NotInOrderSession {
                mock: mock.name().to_string(),
            });
        }

        let ids: Vec<_> = self.mocks.iter().map(Mock::id).collect();
        let history = lock(&self.ctx.recorder).all_history(&ids);
        let is_match =
            |inv: &Invocation| inv.mock() == mock.id() && matching::matches_invocation(pattern, inv);
        let cursor = self.cursor;
        let after_cursor = |inv: &Invocation| cursor.is_none_or(|c| inv.sequence() > c);

        let (before, after): (Vec<_>, Vec<_>) =
            history.into_iter().partition(|inv| !after_cursor(inv));
        let matches: Vec<Arc<Invocation>> = after.iter().filter(|inv| is_match(inv)).cloned().collect();
        let first_run: Vec<Arc<Invocation>> = after
            .iter()
            .skip_while(|inv| !is_match(inv))
            .take_while(|inv| is_match(inv))
            .cloned()
            .collect();

        let consumed = if (!first_run.is_empty() || matches.is_empty())
            && times.satisfied_by(first_run.len())
        {
            first_run
        } else if times.satisfied_by(matches.len()) {
            matches
        } else {
            let wanted = wanted(mock, pattern);
            let earlier: Vec<Arc<Invocation>> =
                before.into_iter().filter(|inv| is_match(inv)).collect();
            if matches.is_empty() && earlier.is_empty() {
                let candidates: Vec<Arc<Invocation>> =
                    after.into_iter().filter(|inv| inv.mock() == mock.id()).collect();
                return Err(wanted_but_not_invoked(wanted, pattern, times, 0, &candidates));
            }
            return Err(DoppelError::VerificationOrderFailure {
                wanted,
                cardinality: times,
                actual: matches.len(),
                cursor,
                earlier: summaries(&earlier),
            });
        };

        if let Some(last) = consumed.last() {
            self.cursor = Some(last.sequence());
        }
        tracing::debug!(
            wanted = %wanted(mock, pattern),
            cardinality = %times,
            consumed = consumed.len(),
            cursor = ?self.cursor,
            "Verified in order"
        );
        lock(&self.ctx.recorder).mark_verified(consumed.iter().map(|inv| inv.sequence()));
        Ok(())
    }
}

impl fmt::Debug for InOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InOrder")
            .field("mocks", &self.mocks.iter().map(Mock::name).collect::<Vec<_>>())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}
