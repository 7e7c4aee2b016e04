//! Storage seam for board records.
//!
//! Persistent storage is an external collaborator: the mutation service
//! only depends on this trait. Implementations must make each call atomic
//! with respect to concurrent callers; the service never holds locks
//! across calls.

use super::models::{Epic, Project, Task};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait BoardStore: Send + Sync {
    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    /// All projects, newest first.
    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn get_project(&self, id: Uuid) -> Result<Option<Project>>;
    async fn insert_project(&self, project: Project) -> Result<()>;
    /// Full-record write, last writer wins. Returns `false` if the id is
    /// unknown.
    async fn update_project(&self, project: Project) -> Result<bool>;
    /// Removes the project and cascades to its epics and their tasks.
    /// Returns `false` if the id is unknown.
    async fn delete_project(&self, id: Uuid) -> Result<bool>;

    // ------------------------------------------------------------------
    // Epics
    // ------------------------------------------------------------------

    /// All epics, newest first.
    async fn list_epics(&self) -> Result<Vec<Epic>>;
    async fn get_epic(&self, id: Uuid) -> Result<Option<Epic>>;
    async fn insert_epic(&self, epic: Epic) -> Result<()>;
    async fn update_epic(&self, epic: Epic) -> Result<bool>;
    /// Removes the epic and cascades to its tasks.
    async fn delete_epic(&self, id: Uuid) -> Result<bool>;

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    /// All tasks, sorted by order ascending.
    async fn list_tasks(&self) -> Result<Vec<Task>>;
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>>;
    /// Tasks of one epic, sorted by order ascending.
    async fn tasks_for_epic(&self, epic_id: Uuid) -> Result<Vec<Task>>;
    /// Max order among the epic's tasks, `None` when the epic has no tasks.
    /// The single base read for order assignment.
    async fn max_task_order(&self, epic_id: Uuid) -> Result<Option<i64>>;
    async fn insert_task(&self, task: Task) -> Result<()>;
    /// Persist a bulk batch atomically: either every task lands or none.
    async fn insert_tasks(&self, tasks: Vec<Task>) -> Result<u64>;
    async fn update_task(&self, task: Task) -> Result<bool>;
    async fn delete_task(&self, id: Uuid) -> Result<bool>;
}
