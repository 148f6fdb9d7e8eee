//! Expected call cardinality.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "count", rename_all = "snake_case")]
pub enum Times {
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
}

impl Times {
    #[must_use]
    pub fn never() -> Self {
        Times::Exactly(0)
    }

    #[must_use]
    pub fn once() -> Self {
        Times::Exactly(1)
    }

    #[must_use]
    pub fn at_least_once() -> Self {
        Times::AtLeast(1)
    }

    #[must_use]
    pub fn min(self) -> usize {
        match self {
            Times::Exactly(n) | Times::AtLeast(n) => n,
            Times::AtMost(_) => 0,
        }
    }

    #[must_use]
    pub fn max(self) -> Option<usize> {
        match self {
            Times::Exactly(n) | Times::AtMost(n) => Some(n),
            Times::AtLeast(_) => None,
        }
    }

    #[must_use]
    pub fn satisfied_by(self, count: usize) -> bool {
        count >= self.min() && self.max().is_none_or(|max| count <= max)
    }

    #[must_use]
    pub fn too_few(self, count: usize) -> bool {
        count < self.min()
    }
}

impl Default for Times {
    fn default() -> Self {
        Times::at_least_once()
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Times::Exactly(0) => f.write_str("never"),
            Times::Exactly(1) => f.write_str("exactly once"),
            Times::Exactly(n) => write!(f, "exactly {n} times"),
            Times::AtLeast(1) => f.write_str("at least once"),
            Times::AtLeast(n) => write!(f, "at least {n} times"),
            Times::AtMost(n) => write!(f, "at most {n} times"),
        }
    }
}
