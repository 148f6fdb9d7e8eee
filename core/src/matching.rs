//! Argument matcher engine.

use doppel_types::{CallPattern, Invocation, Matcher, Value};

/// Whether a single matcher accepts `value`.
#[must_use]
pub fn accepts(matcher: &Matcher, value: &Value) -> bool {
    match matcher {
        Matcher::Exact(expected) => expected == value,
        Matcher::Any { kind, accepts_null } => {
            if value.is_null() {
                *accepts_null
            } else {
                kind.admits(value)
            }
        }
        Matcher::Custom(predicate) => predicate.test(value),
    }
}

/// True iff every positional matcher accepts the argument in its position.
///
/// Patterns are arity-checked when built, so a length difference here can
/// only come from a call that does not belong to the pattern's method; it
/// never matches.
#[must_use]
pub fn matches(pattern: &CallPattern, args: &[Value]) -> bool {
    let matchers = pattern.matchers();
    matchers.len() == args.len()
        && matchers
            .iter()
            .zip(args)
            .all(|(matcher, arg)| accepts(matcher, arg))
}

/// Same method and matching arguments.
#[must_use]
pub fn matches_invocation(pattern: &CallPattern, invocation: &Invocation) -> bool {
    pattern.signature() == invocation.signature() && matches(pattern, invocation.args())
}
