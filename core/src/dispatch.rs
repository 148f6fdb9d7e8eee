//! Call dispatch: record, resolve, answer.

use std::sync::Arc;

use doppel_config::DefaultAnswer;
use doppel_types::{Answer, Invocation, MethodSignature, Outcome, ReturnType, Thrown, Value};

use crate::context::lock;
use crate::mock::Mock;
use crate::stubbing::Resolution;

/// Kind of the [`Thrown`] produced for a call the mock's type does not
/// declare.
pub const NO_SUCH_METHOD: &str = "NoSuchMethod";

/// Kind of the [`Thrown`] produced when a computed answer or a real method
/// returns a value the method's return type cannot hold.
pub const WRONG_RETURN_TYPE: &str = "WrongReturnType";

impl Mock {
    /// Dispatch one call through the mock.
    ///
    /// The call is recorded before it is answered, so an answer that calls
    /// back into a mock sees its own call in the history. No lock is held
    /// while the answer runs.
    pub fn invoke(&self, signature: &MethodSignature, args: Vec<Value>) -> Result<Value, Thrown> {
        if !self.descriptor().contains(signature) || signature.arity() != args.len() {
            tracing::warn!(
                mock = %self.name(),
                method = %signature,
                args = args.len(),
                "Rejected call to undeclared method"
            );
            return Err(Thrown::new(
                NO_SUCH_METHOD,
                format!(
                    "{} has no method {} taking {} argument(s)",
                    self.descriptor().type_name(),
                    signature.name(),
                    args.len()
                ),
            ));
        }

        if self.ctx.try_capture(&self.state, signature, &args) {
            return Ok(signature.returns().zero_value());
        }

        let invocation =
            lock(&self.ctx.recorder).record(self.id(), self.name(), signature.clone(), args);
        let resolution = lock(&self.state.stubs).resolve(&invocation);
        let outcome = self.answer(&invocation, resolution);

        if self.state.verbose_logging {
            tracing::info!(sequence = %invocation.sequence(), outcome = ?outcome, "{invocation}");
        } else {
            tracing::debug!(sequence = %invocation.sequence(), outcome = ?outcome, "{invocation}");
        }

        let result = outcome.result();
        if let Err(previous) = invocation.realize(outcome) {
            tracing::warn!(%invocation, ?previous, "Invocation outcome was already set");
        }
        result
    }

    /// Dispatch a call by method name, picking the overload by argument count.
    pub fn call(
        &self,
        method: &str,
        args: impl IntoIterator<Item = Value>,
    ) -> Result<Value, Thrown> {
        let args: Vec<Value> = args.into_iter().collect();
        match self.descriptor().find(method, args.len()).cloned() {
            Some(signature) => self.invoke(&signature, args),
            None => {
                tracing::warn!(mock = %self.name(), method, args = args.len(), "Rejected call to undeclared method");
                Err(Thrown::new(
                    NO_SUCH_METHOD,
                    format!(
                        "{} has no method {method} taking {} argument(s)",
                        self.descriptor().type_name(),
                        args.len()
                    ),
                ))
            }
        }
    }

    fn answer(&self, invocation: &Arc<Invocation>, resolution: Resolution) -> Outcome {
        match resolution {
            Resolution::Stubbed(answer) => self.run_answer(invocation, answer),
            Resolution::Default => match (self.state.default_answer, &self.state.real_methods) {
                (DefaultAnswer::CallRealMethods, Some(real)) => Outcome::CalledReal(checked(
                    invocation.signature(),
                    real.call_real(invocation.signature(), invocation.args()),
                )),
                _ => Outcome::Defaulted(invocation.signature().returns().zero_value()),
            },
        }
    }

    fn run_answer(&self, invocation: &Invocation, answer: Answer) -> Outcome {
        match answer {
            Answer::Return(value) => Outcome::Stubbed(value),
            Answer::Throw(thrown) => Outcome::Threw(thrown),
            Answer::NoOp => Outcome::DidNothing,
            Answer::Computed(f) => match checked(invocation.signature(), f(invocation)) {
                Ok(value) => Outcome::Stubbed(value),
                Err(thrown) => Outcome::Threw(thrown),
            },
            Answer::CallRealMethod => match &self.state.real_methods {
                Some(real) => Outcome::CalledReal(checked(
                    invocation.signature(),
                    real.call_real(invocation.signature(), invocation.args()),
                )),
                // Registration rejects this, so it only happens if the
                // mock was built without an implementation after all.
                None => Outcome::Defaulted(invocation.signature().returns().zero_value()),
            },
        }
    }
}

/// Turn a value the caller could not receive into a [`Thrown`].
fn checked(signature: &MethodSignature, result: Result<Value, Thrown>) -> Result<Value, Thrown> {
    let value = result?;
    let fits = match signature.returns() {
        ReturnType::Unit => value.is_null(),
        returns => returns.accepts(&value),
    };
    if fits {
        return Ok(value);
    }
    tracing::warn!(method = %signature, %value, "Answer returned a value of the wrong type");
    Err(Thrown::new(
        WRONG_RETURN_TYPE,
        format!("{} returns {}, not {value}", signature.name(), signature.returns()),
    ))
}
