//! Kanban view projection.
//!
//! Pure derivation from a task snapshot to the three status columns,
//! after local filters (free-text search, sort key and direction, hide
//! completed). Recomputed on every change; nothing here mutates state.

use crate::board::{Status, Task};
use serde::{Deserialize, Serialize};

/// Field the column contents are sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Manual position within the epic.
    #[default]
    Order,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Local view filters. Private to one client, never synchronized.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    /// Case-insensitive substring match over titles.
    pub search: Option<String>,
    pub sort: SortKey,
    pub direction: SortDirection,
    pub show_completed: bool,
}

impl ViewOptions {
    pub fn new() -> Self {
        Self {
            show_completed: true,
            ..Self::default()
        }
    }

    /// High-priority-first preset.
    pub fn by_priority() -> Self {
        Self {
            sort: SortKey::Priority,
            direction: SortDirection::Descending,
            ..Self::new()
        }
    }
}

/// The three columns, left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KanbanColumns {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

impl KanbanColumns {
    pub fn total(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }
}

/// Partition a task snapshot into the kanban columns.
///
/// Sorting is stable: ties keep the input order of `tasks` (priority sort
/// never compares the order field). Hiding completed tasks empties the
/// Done column rather than dropping it.
pub fn project_board(tasks: &[Task], options: &ViewOptions) -> KanbanColumns {
    let search = options
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|t| options.show_completed || t.status != Status::Done)
        .filter(|t| match &search {
            Some(needle) => t.title.to_lowercase().contains(needle),
            None => true,
        })
        .cloned()
        .collect();

    // Reversing the comparator (not the result) keeps ties stable in
    // either direction.
    visible.sort_by(|a, b| {
        let ordering = match options.sort {
            SortKey::Order => a.order.cmp(&b.order),
            // Priority's Ord ranks Low < Medium < High.
            SortKey::Priority => a.priority.cmp(&b.priority),
        };
        match options.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    let mut columns = KanbanColumns::default();
    for task in visible {
        match task.status {
            Status::Todo => columns.todo.push(task),
            Status::InProgress => columns.in_progress.push(task),
            Status::Done => columns.done.push(task),
        }
    }
    columns
}
