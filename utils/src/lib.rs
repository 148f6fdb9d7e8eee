//! Shared utilities for doppel.
//!
//! Helpers that more than one doppel crate needs but that don't belong in the
//! data-only `doppel-types` crate:
//!
//! - **`diff`**: Argument-by-argument diffs for verification failures

pub mod diff;

pub use diff::format_argument_diff;
