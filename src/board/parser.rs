//! Bulk text parser: one multi-line blob → ordered task drafts.
//!
//! Line format: `title [- description segments ...] [- priority]`.
//! The trailing segment is treated as a priority only when it matches the
//! priority token set case-insensitively; otherwise it belongs to the
//! description. This is a best-effort heuristic, not a grammar — keep the
//! disambiguation rule exactly as documented.

use super::models::Priority;
use super::BoardError;
use serde::{Deserialize, Serialize};

/// Segment delimiter within a line.
const DELIMITER: char = '-';
/// Separator used when rejoining description segments that contained the
/// delimiter themselves.
const REJOIN: &str = " - ";

/// A parsed, not-yet-persisted task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
}

/// Parse a bulk text blob into an ordered list of task drafts.
///
/// Input line order is preserved. Lines that are blank after trimming are
/// discarded; lines whose title segment is empty (e.g. a bare `-`) are
/// skipped. Fails with [`BoardError::NoValidEntries`] when no draft
/// survives — both for all-blank input and for input made only of
/// separators.
pub fn parse_bulk_text(input: &str) -> Result<Vec<TaskDraft>, BoardError> {
    let lines: Vec<&str> = input.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return Err(BoardError::NoValidEntries);
    }

    let mut drafts = Vec::with_capacity(lines.len());
    for line in lines {
        if let Some(draft) = parse_line(line) {
            drafts.push(draft);
        }
    }

    if drafts.is_empty() {
        return Err(BoardError::NoValidEntries);
    }
    Ok(drafts)
}

/// Parse a single non-blank line. Returns `None` when the title segment is
/// empty.
fn parse_line(line: &str) -> Option<TaskDraft> {
    let parts: Vec<String> = line
        .split(DELIMITER)
        .map(|p| p.trim().to_string())
        .collect();

    let title = parts[0].clone();
    if title.is_empty() {
        return None;
    }

    let mut description: Option<String> = None;
    let mut priority = Priority::default();

    match parts.len() {
        1 => {}
        2 => {
            // Ambiguous: the second segment is a priority when it matches
            // the token set, a description otherwise.
            match Priority::parse_token(&parts[1]) {
                Some(p) => priority = p,
                None => description = Some(parts[1].clone()),
            }
        }
        _ => {
            let last = &parts[parts.len() - 1];
            match Priority::parse_token(last) {
                Some(p) => {
                    priority = p;
                    description = Some(parts[1..parts.len() - 1].join(REJOIN));
                }
                None => {
                    description = Some(parts[1..].join(REJOIN));
                }
            }
        }
    }

    Some(TaskDraft {
        title,
        description,
        priority,
    })
}
