//! Stub registry and answer resolution.
//!
//! Rules are kept per method signature in registration order and scanned
//! newest-first, so re-stubbing an overlapping pattern overrides older rules.
//! Within a rule, answers are handed out in order and the last one repeats
//! once the others are used up.

use std::collections::HashMap;

use doppel_types::{
    Answer, CallPattern, Invocation, MethodSignature, StubConfigError, TypeDescriptor,
};

use crate::matching;

/// What the registry decided for one call.
#[derive(Debug, Clone)]
pub(crate) enum Resolution {
    Stubbed(Answer),
    /// No rule matched. Never confused with an explicit stub.
    Default,
}

#[derive(Debug)]
struct StubRule {
    pattern: CallPattern,
    answers: Vec<Answer>,
    cursor: usize,
    hits: usize,
    order: usize,
}

impl StubRule {
    fn next_answer(&mut self) -> Option<Answer> {
        let answer = self.answers.get(self.cursor).cloned()?;
        if self.cursor + 1 < self.answers.len() {
            self.cursor += 1;
        }
        self.hits += 1;
        Some(answer)
    }
}

#[derive(Debug, Default)]
pub(crate) struct StubRegistry {
    rules: HashMap<MethodSignature, Vec<StubRule>>,
    registered: usize,
}

impl StubRegistry {
    /// Insert an already validated rule.
    pub(crate) fn register(&mut self, pattern: CallPattern, answers: Vec<Answer>) {
        let order = self.registered;
        self.registered += 1;
        self.rules
            .entry(pattern.signature().clone())
            .or_default()
            .push(StubRule {
                pattern,
                answers,
                cursor: 0,
                hits: 0,
                order,
            });
    }

    pub(crate) fn resolve(&mut self, invocation: &Invocation) -> Resolution {
        self.rules
            .get_mut(invocation.signature())
            .and_then(|rules| {
                rules
                    .iter_mut()
                    .rev()
                    .find(|rule| matching::matches(&rule.pattern, invocation.args()))
            })
            .and_then(StubRule::next_answer)
            .map_or(Resolution::Default, Resolution::Stubbed)
    }

    /// Patterns of rules that never answered a call, oldest first.
    pub(crate) fn unused(&self) -> Vec<(usize, String)> {
        let mut unused: Vec<(usize, String)> = self
            .rules
            .values()
            .flatten()
            .filter(|rule| rule.hits == 0)
            .map(|rule| (rule.order, rule.pattern.to_string()))
            .collect();
        unused.sort_by_key(|(order, _)| *order);
        unused
    }
}

/// Check that `pattern` names a method of the mock's type.
pub(crate) fn validate_pattern(
    mock_name: &str,
    descriptor: &TypeDescriptor,
    pattern: &CallPattern,
) -> Result<(), StubConfigError> {
    if descriptor.contains(pattern.signature()) {
        Ok(())
    } else {
        Err(StubConfigError::UnknownMethod {
            mock: mock_name.to_string(),
            method: pattern.signature().to_string(),
        })
    }
}

/// Check one answer against the method it is attached to.
pub(crate) fn validate_answer(
    mock_name: &str,
    has_real_methods: bool,
    signature: &MethodSignature,
    answer: &Answer,
) -> Result<(), StubConfigError> {
    let returns = signature.returns();
    match answer {
        Answer::Return(_) if returns.is_unit() => Err(StubConfigError::ReturnOnVoid {
            method: signature.name().to_string(),
        }),
        Answer::Return(value) if !returns.accepts(value) => {
            Err(StubConfigError::WrongReturnType {
                method: signature.name().to_string(),
                expected: returns,
                value: value.clone(),
            })
        }
        Answer::NoOp if !returns.is_unit() => Err(StubConfigError::NoOpOnNonVoid {
            method: signature.name().to_string(),
            returns,
        }),
        Answer::CallRealMethod if !has_real_methods => Err(StubConfigError::NoRealMethods {
            mock: mock_name.to_string(),
            method: signature.name().to_string(),
        }),
        _ => Ok(()),
    }
}

/// Full registration-time check of a rule.
pub(crate) fn validate_rule(
    mock_name: &str,
    descriptor: &TypeDescriptor,
    has_real_methods: bool,
    pattern: &CallPattern,
    answers: &[Answer],
) -> Result<(), StubConfigError> {
    validate_pattern(mock_name, descriptor, pattern)?;
    if answers.is_empty() {
        return Err(StubConfigError::EmptyAnswers {
            pattern: pattern.to_string(),
        });
    }
    answers.iter().try_for_each(|answer| {
        validate_answer(mock_name, has_real_methods, pattern.signature(), answer)
    })
}
