//! Argument diffs for verification failures.

use std::fmt::Write as _;

use similar::{ChangeTag, TextDiff};

/// Format a per-argument diff between wanted and actual arguments.
///
/// Each argument occupies one line, numbered by its position (1-based):
/// - unchanged arguments are printed with two spaces after the number
/// - `-` marks the wanted argument, `+` the one actually passed
///
/// Returns an empty string when both sides render identically.
#[must_use]
pub fn format_argument_diff(wanted: &[String], actual: &[String]) -> String {
    let old_text = to_lines(wanted);
    let new_text = to_lines(actual);

    let diff = TextDiff::from_lines(&old_text, &new_text);
    let changes: Vec<_> = diff.iter_all_changes().collect();
    if changes.iter().all(|c| c.tag() == ChangeTag::Equal) {
        return String::new();
    }

    let max_line = wanted.len().max(actual.len());
    let width = if max_line == 0 {
        1
    } else {
        ((max_line as f64).log10().floor() as usize) + 1
    };

    let mut out = String::new();
    for change in changes {
        let (index, marker) = match change.tag() {
            ChangeTag::Equal => (change.old_index(), ' '),
            ChangeTag::Delete => (change.old_index(), '-'),
            ChangeTag::Insert => (change.new_index(), '+'),
        };
        let position = index.map_or(0, |i| i + 1);
        let _ = write!(out, "{position:>width$} {marker}");
        out.push_str(change.value().trim_end_matches('\n'));
        out.push('\n');
    }
    out
}

fn to_lines(items: &[String]) -> String {
    let mut text = String::new();
    for item in items {
        // one argument per line; embedded newlines would split an argument
        text.push_str(&item.replace('\n', "\\n"));
        text.push('\n');
    }
    text
}
