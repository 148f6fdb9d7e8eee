//! Shared test fixtures
//!
//! Hand-written substitutes standing in for generated proxies. Each one
//! routes its methods through an inner `Mock` and converts the returned
//! values back to Rust types.

#![allow(dead_code)]

use std::sync::Arc;

use doppel_core::{
    ArgKind, MethodSignature, Mock, MockContext, MockSettings, MockTarget, RealMethods,
    ReturnType, Thrown, TypeDescriptor, Value,
};
use serde_json::json;

fn string(value: Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// The usual grab-bag interface.
pub struct Methods {
    mock: Mock,
}

impl Methods {
    pub fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new("IMethods")
            .method(MethodSignature::new("simpleMethod", [], ReturnType::String))
            .method(MethodSignature::new(
                "simpleMethod",
                [ArgKind::String],
                ReturnType::String,
            ))
            .method(MethodSignature::new("voidMethod", [], ReturnType::Unit))
            .method(MethodSignature::new(
                "booleanObjectReturningMethod",
                [],
                ReturnType::Bool,
            ))
            .method(MethodSignature::new("arrayReturningMethod", [], ReturnType::List))
            .method(MethodSignature::new("intReturningMethod", [], ReturnType::Integer))
    }

    pub fn mock(ctx: &MockContext) -> Self {
        Self {
            mock: ctx.mock(Self::descriptor()),
        }
    }

    /// A mock whose type has real, do-nothing implementations.
    pub fn with_real_methods(ctx: &MockContext) -> Self {
        let real: Arc<dyn RealMethods> = Arc::new(real_methods);
        Self {
            mock: ctx.mock_with(Self::descriptor(), MockSettings::new().real_methods(real)),
        }
    }

    pub fn handle(&self) -> &Mock {
        &self.mock
    }

    pub fn simple_method(&self) -> Result<Option<String>, Thrown> {
        self.mock.call("simpleMethod", []).map(string)
    }

    pub fn simple_method_with(&self, arg: &str) -> Result<Option<String>, Thrown> {
        self.mock.call("simpleMethod", [json!(arg)]).map(string)
    }

    pub fn void_method(&self) -> Result<(), Thrown> {
        self.mock.call("voidMethod", []).map(drop)
    }

    pub fn boolean_object_returning_method(&self) -> Result<bool, Thrown> {
        self.mock
            .call("booleanObjectReturningMethod", [])
            .map(|v| v.as_bool().unwrap_or_default())
    }

    pub fn array_returning_method(&self) -> Result<Option<Vec<Value>>, Thrown> {
        self.mock
            .call("arrayReturningMethod", [])
            .map(|v| v.as_array().cloned())
    }

    pub fn int_returning_method(&self) -> Result<i64, Thrown> {
        self.mock
            .call("intReturningMethod", [])
            .map(|v| v.as_i64().unwrap_or_default())
    }
}

fn real_methods(_signature: &MethodSignature, _args: &[Value]) -> Result<Value, Thrown> {
    Ok(Value::Null)
}

impl MockTarget for Methods {
    fn mock_handle(&self) -> Option<&Mock> {
        Some(&self.mock)
    }
}

pub struct Bike;

impl Bike {
    pub fn value(&self) -> Value {
        json!({ "vehicle": "bike" })
    }
}

pub struct Car;

impl Car {
    pub fn value(&self) -> Value {
        json!({ "vehicle": "car" })
    }
}

pub struct Person {
    mock: Mock,
}

impl Person {
    pub fn mock(ctx: &MockContext) -> Self {
        let descriptor = TypeDescriptor::new("Person")
            .method(MethodSignature::new("ride", [ArgKind::Map], ReturnType::Unit))
            .method(MethodSignature::new("drive", [ArgKind::Map], ReturnType::Unit));
        Self {
            mock: ctx.mock(descriptor),
        }
    }

    pub fn ride(&self, bike: &Bike) -> Result<(), Thrown> {
        self.mock.call("ride", [bike.value()]).map(drop)
    }

    pub fn drive(&self, car: &Car) -> Result<(), Thrown> {
        self.mock.call("drive", [car.value()]).map(drop)
    }
}

impl MockTarget for Person {
    fn mock_handle(&self) -> Option<&Mock> {
        Some(&self.mock)
    }
}

pub struct Police {
    mock: Mock,
}

impl Police {
    pub fn mock(ctx: &MockContext) -> Self {
        let descriptor = TypeDescriptor::new("Police").method(MethodSignature::new(
            "chase",
            [ArgKind::Map],
            ReturnType::Unit,
        ));
        Self {
            mock: ctx.mock(descriptor),
        }
    }

    pub fn chase(&self, car: &Car) -> Result<(), Thrown> {
        self.mock.call("chase", [car.value()]).map(drop)
    }
}

impl MockTarget for Police {
    fn mock_handle(&self) -> Option<&Mock> {
        Some(&self.mock)
    }
}

/// A concrete class: mocking it keeps the real `bark` reachable.
pub struct Dog {
    mock: Mock,
}

impl Dog {
    pub fn mock(ctx: &MockContext) -> Self {
        let descriptor = TypeDescriptor::new("Dog").method(MethodSignature::new(
            "bark",
            [],
            ReturnType::String,
        ));
        let real: Arc<dyn RealMethods> = Arc::new(real_dog);
        Self {
            mock: ctx.mock_with(descriptor, MockSettings::new().real_methods(real)),
        }
    }

    pub fn spy(ctx: &MockContext) -> Self {
        let descriptor = TypeDescriptor::new("Dog").method(MethodSignature::new(
            "bark",
            [],
            ReturnType::String,
        ));
        Self {
            mock: ctx.spy(descriptor, Arc::new(real_dog)),
        }
    }

    pub fn bark(&self) -> Result<Option<String>, Thrown> {
        self.mock.call("bark", []).map(string)
    }
}

fn real_dog(signature: &MethodSignature, _args: &[Value]) -> Result<Value, Thrown> {
    match signature.name() {
        "bark" => Ok(json!("woof")),
        other => Err(Thrown::new("NoSuchMethod", other.to_string())),
    }
}

impl MockTarget for Dog {
    fn mock_handle(&self) -> Option<&Mock> {
        Some(&self.mock)
    }
}

/// A collection type, used to check that stubbing hands the mock back.
pub struct Set {
    mock: Mock,
}

impl Set {
    pub fn mock(ctx: &MockContext) -> Self {
        let descriptor = TypeDescriptor::new("Set").method(MethodSignature::new(
            "isEmpty",
            [],
            ReturnType::Bool,
        ));
        Self {
            mock: ctx.mock(descriptor),
        }
    }

    pub fn is_empty(&self) -> Result<bool, Thrown> {
        self.mock
            .call("isEmpty", [])
            .map(|v| v.as_bool().unwrap_or_default())
    }
}

impl MockTarget for Set {
    fn mock_handle(&self) -> Option<&Mock> {
        Some(&self.mock)
    }
}
