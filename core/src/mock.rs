//! Mock handles, per-mock settings and the proxy-side seams.

use std::any;
use std::fmt;
use std::sync::{Arc, Mutex};

use doppel_config::DefaultAnswer;
use doppel_types::{
    CallPattern, DoppelError, Invocation, Matcher, MethodSignature, MockId, StubConfigError,
    Thrown, TypeDescriptor, Value,
};

use crate::context::{ContextShared, lock};
use crate::stubbing::StubRegistry;

/// Access to the real implementation behind a mock.
///
/// The proxy side supplies this for spies and partial mocks; the core only
/// ever asks it to run one method with one set of arguments.
pub trait RealMethods: Send + Sync {
    fn call_real(&self, signature: &MethodSignature, args: &[Value]) -> Result<Value, Thrown>;
}

impl<F> RealMethods for F
where
    F: Fn(&MethodSignature, &[Value]) -> Result<Value, Thrown> + Send + Sync,
{
    fn call_real(&self, signature: &MethodSignature, args: &[Value]) -> Result<Value, Thrown> {
        self(signature, args)
    }
}

/// Anything that can be handed to a verification or stubbing entry point.
///
/// Hand-written substitutes implement this by returning the `Mock` they route
/// calls through. Everything else reports `None` and is rejected with
/// `NotAMock`.
pub trait MockTarget {
    fn mock_handle(&self) -> Option<&Mock> {
        None
    }

    /// How the target is named in a `NotAMock` failure.
    fn describe(&self) -> String {
        any::type_name_of_val(self).to_string()
    }
}

impl MockTarget for Mock {
    fn mock_handle(&self) -> Option<&Mock> {
        Some(self)
    }

    fn describe(&self) -> String {
        self.name().to_string()
    }
}

impl MockTarget for str {
    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

impl MockTarget for String {
    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

impl MockTarget for Value {
    fn describe(&self) -> String {
        self.to_string()
    }
}

impl<T: MockTarget + ?Sized> MockTarget for &T {
    fn mock_handle(&self) -> Option<&Mock> {
        (**self).mock_handle()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Options for a single mock. Unset options fall back to the context's
/// configuration.
#[derive(Clone, Default)]
pub struct MockSettings {
    pub(crate) name: Option<String>,
    pub(crate) default_answer: Option<DefaultAnswer>,
    pub(crate) verbose_logging: Option<bool>,
    pub(crate) real_methods: Option<Arc<dyn RealMethods>>,
}

impl MockSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn default_answer(mut self, answer: DefaultAnswer) -> Self {
        self.default_answer = Some(answer);
        self
    }

    #[must_use]
    pub fn verbose_logging(mut self, enabled: bool) -> Self {
        self.verbose_logging = Some(enabled);
        self
    }

    #[must_use]
    pub fn real_methods(mut self, real: Arc<dyn RealMethods>) -> Self {
        self.real_methods = Some(real);
        self
    }
}

impl fmt::Debug for MockSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSettings")
            .field("name", &self.name)
            .field("default_answer", &self.default_answer)
            .field("verbose_logging", &self.verbose_logging)
            .field("real_methods", &self.real_methods.is_some())
            .finish()
    }
}

pub(crate) struct MockState {
    pub(crate) id: MockId,
    pub(crate) name: String,
    pub(crate) descriptor: TypeDescriptor,
    pub(crate) default_answer: DefaultAnswer,
    pub(crate) verbose_logging: bool,
    pub(crate) real_methods: Option<Arc<dyn RealMethods>>,
    pub(crate) stubs: Mutex<StubRegistry>,
}

impl fmt::Debug for MockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockState")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.descriptor.type_name())
            .finish_non_exhaustive()
    }
}

/// Handle to one mock.
///
/// Cheap to clone; clones share the same stubs and history. Only a
/// [`MockContext`](crate::MockContext) can create one.
#[derive(Clone)]
pub struct Mock {
    pub(crate) state: Arc<MockState>,
    pub(crate) ctx: Arc<ContextShared>,
}

impl Mock {
    #[must_use]
    pub fn id(&self) -> MockId {
        self.state.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.state.name
    }

    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.state.descriptor
    }

    #[must_use]
    pub fn has_real_methods(&self) -> bool {
        self.state.real_methods.is_some()
    }

    /// Same mock, possibly through a different handle.
    #[must_use]
    pub fn is_same(&self, other: &Mock) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// This mock's recorded calls, oldest first.
    #[must_use]
    pub fn invocations(&self) -> Vec<Arc<Invocation>> {
        lock(&self.ctx.recorder).history(self.id())
    }

    /// Build a call pattern for one of this mock's methods, found by name and
    /// the number of matchers.
    pub fn pattern(
        &self,
        method: &str,
        matchers: Vec<Matcher>,
    ) -> Result<CallPattern, DoppelError> {
        let signature = self
            .descriptor()
            .find(method, matchers.len())
            .cloned()
            .ok_or_else(|| StubConfigError::UnknownMethod {
                mock: self.name().to_string(),
                method: format!("{method}/{}", matchers.len()),
            })?;
        Ok(CallPattern::new(signature, matchers)?)
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mock")
            .field("id", &self.state.id)
            .field("name", &self.state.name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Mock {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for Mock {}

/// Resolve a target to its mock, failing with `NotAMock`.
pub(crate) fn resolve_target<T: MockTarget + ?Sized>(target: &T) -> Result<Mock, DoppelError> {
    let mock = target
        .mock_handle()
        .filter(|mock| mock.ctx.is_tracked(mock))
        .cloned();
    mock.ok_or_else(|| DoppelError::NotAMock {
        target: target.describe(),
    })
}
