//! Test-execution context.
//!
//! A context owns everything that must not leak between tests: the
//! context-wide call sequence, every mock's invocation log, the set of mocks
//! it created and the in-flight stubbing state. Create one per test.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::{fmt, ptr};

use doppel_config::{DefaultAnswer, DoppelConfig};
use doppel_types::{
    Answer, CallPattern, DoppelError, Invocation, MethodSignature, MockId, StubConfigError, Times,
    TypeDescriptor, Value,
};

use crate::mock::{Mock, MockSettings, MockState, MockTarget, RealMethods, resolve_target};
use crate::ordering::InOrder;
use crate::recorder::InvocationRecorder;
use crate::stubbing::{StubRegistry, validate_rule};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Defaults applied to every mock and verification of a context.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ContextDefaults {
    pub(crate) default_answer: DefaultAnswer,
    pub(crate) verbose_logging: bool,
    pub(crate) default_times: Times,
}

impl ContextDefaults {
    fn from_config(config: &DoppelConfig) -> Self {
        Self {
            default_answer: config.default_answer(),
            verbose_logging: config.verbose_logging(),
            default_times: config.default_times(),
        }
    }
}

/// A call seen while a stubbing or verification closure runs.
#[derive(Debug)]
pub(crate) struct CapturedCall {
    pub(crate) mock: MockId,
    pub(crate) mock_name: String,
    pub(crate) signature: MethodSignature,
    pub(crate) args: Vec<Value>,
}

#[derive(Debug)]
pub(crate) struct ContextShared {
    pub(crate) defaults: ContextDefaults,
    next_mock_id: AtomicU64,
    mocks: Mutex<Vec<Arc<MockState>>>,
    pub(crate) recorder: Mutex<InvocationRecorder>,
    /// Open captures, one per thread running a stubbing or verification
    /// closure. Calls from any other thread stay live.
    captures: Mutex<HashMap<ThreadId, Option<CapturedCall>>>,
    /// Pattern of a stubbing that was dropped without answers.
    unfinished: Mutex<Option<String>>,
}

impl ContextShared {
    pub(crate) fn is_tracked(&self, mock: &Mock) -> bool {
        ptr::eq(Arc::as_ptr(&mock.ctx), self)
            && lock(&self.mocks)
                .iter()
                .any(|state| Arc::ptr_eq(state, &mock.state))
    }

    /// Run `call` with the current thread's mock calls captured instead of
    /// dispatched.
    ///
    /// The last captured call wins. The capture is closed even if `call`
    /// panics.
    pub(crate) fn capture(&self, call: impl FnOnce()) -> Result<CapturedCall, StubConfigError> {
        struct Restore<'a> {
            captures: &'a Mutex<HashMap<ThreadId, Option<CapturedCall>>>,
            owner: ThreadId,
        }

        impl Drop for Restore<'_> {
            fn drop(&mut self) {
                lock(self.captures).remove(&self.owner);
            }
        }

        let owner = thread::current().id();
        lock(&self.captures).insert(owner, None);
        let restore = Restore {
            captures: &self.captures,
            owner,
        };
        call();
        let captured = lock(&self.captures).remove(&owner).flatten();
        drop(restore);
        captured.ok_or(StubConfigError::NoCallCaptured)
    }

    /// Hand the call to a capture opened by the calling thread. Returns false
    /// when the call is live.
    pub(crate) fn try_capture(
        &self,
        mock: &MockState,
        signature: &MethodSignature,
        args: &[Value],
    ) -> bool {
        let mut captures = lock(&self.captures);
        let Some(slot) = captures.get_mut(&thread::current().id()) else {
            return false;
        };
        *slot = Some(CapturedCall {
            mock: mock.id,
            mock_name: mock.name.clone(),
            signature: signature.clone(),
            args: args.to_vec(),
        });
        true
    }

    pub(crate) fn note_unfinished(&self, pattern: String) {
        tracing::warn!(%pattern, "Stubbing finished without an answer");
        *lock(&self.unfinished) = Some(pattern);
    }

    /// Report (once) a stubbing left without answers.
    pub(crate) fn check_unfinished(&self) -> Result<(), DoppelError> {
        match lock(&self.unfinished).take() {
            Some(pattern) => Err(StubConfigError::UnfinishedStubbing { pattern }.into()),
            None => Ok(()),
        }
    }
}

/// Scope of one test: creates mocks and owns their shared call order.
pub struct MockContext {
    shared: Arc<ContextShared>,
}

impl Default for MockContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockContext")
            .field("defaults", &self.shared.defaults)
            .field("mocks", &lock(&self.shared.mocks).len())
            .finish_non_exhaustive()
    }
}

impl MockContext {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&DoppelConfig::default())
    }

    #[must_use]
    pub fn with_config(config: &DoppelConfig) -> Self {
        Self {
            shared: Arc::new(ContextShared {
                defaults: ContextDefaults::from_config(config),
                next_mock_id: AtomicU64::new(1),
                mocks: Mutex::new(Vec::new()),
                recorder: Mutex::new(InvocationRecorder::default()),
                captures: Mutex::new(HashMap::new()),
                unfinished: Mutex::new(None),
            }),
        }
    }

    /// Load the user's config file and build a context from it.
    ///
    /// Falls back to defaults when there is no file or it cannot be read.
    #[must_use]
    pub fn from_environment() -> Self {
        match DoppelConfig::load() {
            Ok(Some(config)) => Self::with_config(&config),
            Ok(None) => Self::new(),
            Err(err) => {
                tracing::warn!(path = ?err.path(), "Ignoring doppel config: {err}");
                Self::new()
            }
        }
    }

    #[must_use]
    pub fn mock(&self, descriptor: TypeDescriptor) -> Mock {
        self.mock_with(descriptor, MockSettings::default())
    }

    #[must_use]
    pub fn mock_with(&self, descriptor: TypeDescriptor, settings: MockSettings) -> Mock {
        let defaults = self.shared.defaults;
        let id = MockId::new(self.shared.next_mock_id.fetch_add(1, Ordering::Relaxed));
        let name = settings
            .name
            .unwrap_or_else(|| descriptor.default_mock_name());
        let state = Arc::new(MockState {
            id,
            name,
            descriptor,
            default_answer: settings.default_answer.unwrap_or(defaults.default_answer),
            verbose_logging: settings.verbose_logging.unwrap_or(defaults.verbose_logging),
            real_methods: settings.real_methods,
            stubs: Mutex::new(StubRegistry::default()),
        });
        tracing::debug!(mock = %state.name, id = %id, type_name = state.descriptor.type_name(), "Created mock");
        lock(&self.shared.mocks).push(Arc::clone(&state));
        Mock {
            state,
            ctx: Arc::clone(&self.shared),
        }
    }

    /// A mock that calls the real implementation unless stubbed.
    #[must_use]
    pub fn spy(&self, descriptor: TypeDescriptor, real: Arc<dyn RealMethods>) -> Mock {
        self.mock_with(
            descriptor,
            MockSettings::new()
                .real_methods(real)
                .default_answer(DefaultAnswer::CallRealMethods),
        )
    }

    /// Whether `target` is a mock created by this context.
    #[must_use]
    pub fn is_mock(&self, target: &dyn MockTarget) -> bool {
        target
            .mock_handle()
            .is_some_and(|mock| Arc::ptr_eq(&mock.ctx, &self.shared) && self.shared.is_tracked(mock))
    }

    /// Register a stubbing rule directly.
    pub fn stub(
        &self,
        mock: &Mock,
        pattern: CallPattern,
        answers: Vec<Answer>,
    ) -> Result<(), DoppelError> {
        let mock = self.own(mock)?;
        self.shared.check_unfinished()?;
        register_stub(&mock, pattern, answers)
    }

    /// Start an in-order verification session over `targets`.
    pub fn in_order(&self, targets: &[&dyn MockTarget]) -> Result<InOrder, DoppelError> {
        if targets.is_empty() {
            return Err(DoppelError::EmptyInOrder);
        }
        let mut mocks = Vec::with_capacity(targets.len());
        for target in targets {
            let mock = resolve_target(*target)?;
            mocks.push(self.own(&mock)?);
        }
        self.shared.check_unfinished()?;
        Ok(InOrder::new(Arc::clone(&self.shared), mocks))
    }

    /// Every call recorded in this context, in call order.
    #[must_use]
    pub fn invocations(&self) -> Vec<Arc<Invocation>> {
        lock(&self.shared.recorder).everything()
    }

    /// Stubbing rules that never answered a call, as `mock.pattern` strings.
    #[must_use]
    pub fn unused_stubbings(&self) -> Vec<String> {
        let mocks = lock(&self.shared.mocks).clone();
        mocks
            .iter()
            .flat_map(|state| {
                lock(&state.stubs)
                    .unused()
                    .into_iter()
                    .map(|(_, pattern)| format!("{}.{}", state.name, pattern))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn own(&self, mock: &Mock) -> Result<Mock, DoppelError> {
        if Arc::ptr_eq(&mock.ctx, &self.shared) && self.shared.is_tracked(mock) {
            Ok(mock.clone())
        } else {
            Err(DoppelError::NotAMock {
                target: format!("{} (created by another context)", mock.name()),
            })
        }
    }
}

/// Validate and register a complete rule on `mock`.
pub(crate) fn register_stub(
    mock: &Mock,
    pattern: CallPattern,
    answers: Vec<Answer>,
) -> Result<(), DoppelError> {
    validate_rule(
        mock.name(),
        mock.descriptor(),
        mock.has_real_methods(),
        &pattern,
        &answers,
    )?;
    register_validated(mock, pattern, answers);
    Ok(())
}

pub(crate) fn register_validated(mock: &Mock, pattern: CallPattern, answers: Vec<Answer>) {
    tracing::debug!(
        mock = %mock.name(),
        %pattern,
        answers = ?answers.iter().map(Answer::label).collect::<Vec<_>>(),
        "Registered stubbing"
    );
    lock(&mock.state.stubs).register(pattern, answers);
}
