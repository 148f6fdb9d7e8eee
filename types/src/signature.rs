//! Method signatures and the type descriptors a mock is created from.

use std::fmt;

use serde::Serialize;

use crate::value::{ArgKind, ReturnType};

/// Stable identifier of a mocked method.
///
/// Two signatures are the same method only if name, parameter kinds and
/// return type all agree, which keeps overloads apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MethodSignature {
    name: String,
    params: Vec<ArgKind>,
    returns: ReturnType,
}

impl MethodSignature {
    pub fn new(
        name: impl Into<String>,
        params: impl IntoIterator<Item = ArgKind>,
        returns: ReturnType,
    ) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
            returns,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn params(&self) -> &[ArgKind] {
        &self.params
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn returns(&self) -> ReturnType {
        self.returns
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({}) -> {}", self.name, params, self.returns)
    }
}

/// Description of the interface a mock stands in for.
///
/// This is what the proxy side hands over when it asks for a mock: the type
/// name (for diagnostics and default mock names) and the methods that may be
/// called through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    type_name: String,
    methods: Vec<MethodSignature>,
}

impl TypeDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn method(mut self, signature: MethodSignature) -> Self {
        if !self.methods.contains(&signature) {
            self.methods.push(signature);
        }
        self
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    #[must_use]
    pub fn contains(&self, signature: &MethodSignature) -> bool {
        self.methods.contains(signature)
    }

    /// Look up a method by name and argument count.
    #[must_use]
    pub fn find(&self, name: &str, arity: usize) -> Option<&MethodSignature> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.arity() == arity)
    }

    /// `Person` becomes `person`, `IMethods` becomes `iMethods`.
    #[must_use]
    pub fn default_mock_name(&self) -> String {
        let mut chars = self.type_name.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => "mock".to_string(),
        }
    }
}
