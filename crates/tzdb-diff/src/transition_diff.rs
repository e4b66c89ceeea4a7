//! Transition diff: line-by-line comparison of two rendered rule sets.
//!
//! Each rule set is rendered as one line per historical transition followed
//! by one line per recurring rule, then compared with `similar` (Myers diff)
//! into hunks with context lines.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use tzdb_types::RuleSet;

/// Context lines kept around each change.
const CONTEXT_LINES: usize = 3;

/// The result of diffing two rendered rule sets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransitionDiff {
    pub hunks: Vec<DiffHunk>,
    /// Number of rendered lines on the left.
    pub left_lines: usize,
    /// Number of rendered lines on the right.
    pub right_lines: usize,
}

impl TransitionDiff {
    /// Returns `true` if both renderings are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Lines present only on the right.
    pub fn additions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    /// Lines present only on the left.
    pub fn deletions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }
}

/// A contiguous region of changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffHunk {
    /// First left line in this hunk (1-based).
    pub left_start: usize,
    pub left_count: usize,
    /// First right line in this hunk (1-based).
    pub right_start: usize,
    pub right_count: usize,
    pub lines: Vec<DiffLine>,
}

/// A single line in a hunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

/// Render a rule set as display lines: transitions, then recurring rules.
///
/// A fixed-offset zone renders as a single line naming its offset.
pub fn render_rules(rules: &RuleSet) -> Vec<String> {
    let mut lines: Vec<String> = rules
        .transitions()
        .iter()
        .map(ToString::to_string)
        .chain(rules.transition_rules().iter().map(ToString::to_string))
        .collect();
    if lines.is_empty() {
        lines.push(rules.to_string());
    }
    lines
}

/// Diff the rendered transition listings of two rule sets.
pub fn diff_transitions(left: &RuleSet, right: &RuleSet) -> TransitionDiff {
    diff_lines(&render_rules(left), &render_rules(right))
}

/// Diff two lists of lines.
pub fn diff_lines(left: &[String], right: &[String]) -> TransitionDiff {
    if left == right {
        return TransitionDiff {
            hunks: Vec::new(),
            left_lines: left.len(),
            right_lines: right.len(),
        };
    }

    let left_text = join_lines(left);
    let right_text = join_lines(right);
    let text_diff = TextDiff::from_lines(&left_text, &right_text);

    let mut hunks = Vec::new();
    for group in text_diff.grouped_ops(CONTEXT_LINES) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old = first.old_range().start..last.old_range().end;
        let new = first.new_range().start..last.new_range().end;
        let lines = group
            .iter()
            .flat_map(|op| text_diff.iter_changes(op))
            .map(|change| {
                let text = change.value().trim_end_matches('\n').to_string();
                match change.tag() {
                    ChangeTag::Equal => DiffLine::Context(text),
                    ChangeTag::Delete => DiffLine::Removed(text),
                    ChangeTag::Insert => DiffLine::Added(text),
                }
            })
            .collect();
        hunks.push(DiffHunk {
            left_start: old.start + 1,
            left_count: old.len(),
            right_start: new.start + 1,
            right_count: new.len(),
            lines,
        });
    }

    TransitionDiff {
        hunks,
        left_lines: left.len(),
        right_lines: right.len(),
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}
