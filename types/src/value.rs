//! Value kinds, return types and thrown errors.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Kind of a single argument position.
///
/// Used in method signatures and by type-compatible matchers. Null is never
/// admitted by a kind; whether a matcher lets null through is decided by the
/// matcher itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    Any,
    Bool,
    /// JSON integers only.
    Integer,
    /// Any JSON number.
    Number,
    String,
    List,
    Map,
}

impl ArgKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ArgKind::Any => "any",
            ArgKind::Bool => "bool",
            ArgKind::Integer => "integer",
            ArgKind::Number => "number",
            ArgKind::String => "string",
            ArgKind::List => "list",
            ArgKind::Map => "map",
        }
    }

    #[must_use]
    pub fn admits(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => false,
            (ArgKind::Any, _) => true,
            (ArgKind::Bool, Value::Bool(_)) => true,
            (ArgKind::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (ArgKind::Number, Value::Number(_)) => true,
            (ArgKind::String, Value::String(_)) => true,
            (ArgKind::List, Value::Array(_)) => true,
            (ArgKind::Map, Value::Object(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared return type of a mocked method.
///
/// `Bool`, `Integer` and `Float` are primitives: they never return null.
/// `String`, `List`, `Map` and `Object` are object-typed and default to null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    Unit,
    Bool,
    Integer,
    Float,
    String,
    List,
    Map,
    Object,
}

impl ReturnType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnType::Unit => "unit",
            ReturnType::Bool => "bool",
            ReturnType::Integer => "integer",
            ReturnType::Float => "float",
            ReturnType::String => "string",
            ReturnType::List => "list",
            ReturnType::Map => "map",
            ReturnType::Object => "object",
        }
    }

    #[must_use]
    pub fn is_unit(self) -> bool {
        matches!(self, ReturnType::Unit)
    }

    /// The value an un-stubbed call returns.
    #[must_use]
    pub fn zero_value(self) -> Value {
        match self {
            ReturnType::Bool => Value::Bool(false),
            ReturnType::Integer => Value::from(0),
            ReturnType::Float => Value::from(0.0),
            ReturnType::Unit
            | ReturnType::String
            | ReturnType::List
            | ReturnType::Map
            | ReturnType::Object => Value::Null,
        }
    }

    /// Whether `value` may be returned from a method with this return type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (ReturnType::Unit, _) => false,
            (ReturnType::Object, _) => true,
            (ReturnType::Bool, Value::Bool(_)) => true,
            (ReturnType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (ReturnType::Float, Value::Number(_)) => true,
            (ReturnType::String | ReturnType::List | ReturnType::Map, Value::Null) => true,
            (ReturnType::String, Value::String(_)) => true,
            (ReturnType::List, Value::Array(_)) => true,
            (ReturnType::Map, Value::Object(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised through a mocked call.
///
/// This is what a `Throw` answer produces and what a real implementation
/// returns when it fails. The dispatcher hands it to the caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub struct Thrown {
    kind: Cow<'static, str>,
    message: Option<String>,
}

impl Thrown {
    /// A specific error instance.
    pub fn new(kind: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: Some(message.into()),
        }
    }

    /// An error identified only by its kind.
    pub fn of_kind(kind: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: kind.into(),
            message: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.kind, message),
            None => f.write_str(&self.kind),
        }
    }
}

#[must_use]
pub fn render_value(value: &Value) -> String {
    value.to_string()
}

#[must_use]
pub fn render_args(args: &[Value]) -> String {
    args.iter().map(render_value).collect::<Vec<_>>().join(", ")
}
