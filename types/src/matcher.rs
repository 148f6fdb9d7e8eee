//! Argument matchers and call patterns.
//!
//! A call pattern pairs a method signature with one matcher per parameter.
//! Arity is checked when the pattern is built, so a pattern that exists is
//! always well-formed.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::StubConfigError;
use crate::signature::MethodSignature;
use crate::value::{ArgKind, render_value};

/// A named predicate over one argument.
#[derive(Clone)]
pub struct ArgPredicate {
    description: String,
    test: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl ArgPredicate {
    pub fn new(
        description: impl Into<String>,
        test: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            test: Arc::new(test),
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn test(&self, value: &Value) -> bool {
        (self.test)(value)
    }
}

impl fmt::Debug for ArgPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgPredicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Predicate over a single argument position.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Value equality.
    Exact(Value),
    /// Any value of a compatible kind. Null only when `accepts_null` is set.
    Any { kind: ArgKind, accepts_null: bool },
    Custom(ArgPredicate),
}

impl Matcher {
    pub fn exact(value: impl Into<Value>) -> Self {
        Matcher::Exact(value.into())
    }

    /// Any non-null value.
    #[must_use]
    pub fn any() -> Self {
        Self::any_of(ArgKind::Any)
    }

    /// Any non-null value of `kind`.
    #[must_use]
    pub fn any_of(kind: ArgKind) -> Self {
        Matcher::Any {
            kind,
            accepts_null: false,
        }
    }

    /// Let an any-matcher accept null as well. Other matchers are unchanged.
    #[must_use]
    pub fn or_null(self) -> Self {
        match self {
            Matcher::Any { kind, .. } => Matcher::Any {
                kind,
                accepts_null: true,
            },
            other => other,
        }
    }

    pub fn custom(
        description: impl Into<String>,
        test: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Matcher::Custom(ArgPredicate::new(description, test))
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Exact(value) => f.write_str(&render_value(value)),
            Matcher::Any {
                kind: ArgKind::Any,
                accepts_null,
            } => {
                f.write_str("<any>")?;
                if *accepts_null {
                    f.write_str("?")?;
                }
                Ok(())
            }
            Matcher::Any { kind, accepts_null } => {
                write!(f, "<any {kind}>")?;
                if *accepts_null {
                    f.write_str("?")?;
                }
                Ok(())
            }
            Matcher::Custom(predicate) => write!(f, "<{}>", predicate.description()),
        }
    }
}

/// A method signature plus one matcher per parameter.
#[derive(Debug, Clone)]
pub struct CallPattern {
    signature: MethodSignature,
    matchers: Vec<Matcher>,
}

impl CallPattern {
    pub fn new(signature: MethodSignature, matchers: Vec<Matcher>) -> Result<Self, StubConfigError> {
        if matchers.len() != signature.arity() {
            return Err(StubConfigError::ArityMismatch {
                method: signature.name().to_string(),
                expected: signature.arity(),
                actual: matchers.len(),
            });
        }
        Ok(Self {
            signature,
            matchers,
        })
    }

    /// Pattern that matches exactly these argument values.
    pub fn exact(signature: MethodSignature, args: &[Value]) -> Result<Self, StubConfigError> {
        let matchers = args.iter().cloned().map(Matcher::Exact).collect();
        Self::new(signature, matchers)
    }

    /// Same method, different matchers.
    pub fn with_matchers(self, matchers: Vec<Matcher>) -> Result<Self, StubConfigError> {
        Self::new(self.signature, matchers)
    }

    #[must_use]
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    #[must_use]
    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }
}

impl fmt::Display for CallPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .matchers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({})", self.signature.name(), args)
    }
}
