//! Mutation service: validate → persist → emit exactly one notification.
//!
//! The server-side source of truth for board mutations. Validation happens
//! before any persistence attempt; a mutation that fails validation writes
//! nothing and emits nothing. Every successful mutation emits exactly one
//! event through the injected emitter.

use super::models::{
    Epic, EpicPatch, NewEpic, NewProject, NewTask, Project, ProjectPatch, Task, TaskPatch,
};
use super::ordering;
use super::parser::parse_bulk_text;
use super::store::BoardStore;
use super::BoardError;
use crate::events::{BoardEvent, EntityKind, EventEmitter};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct BoardService {
    store: Arc<dyn BoardStore>,
    events: Arc<dyn EventEmitter>,
}

fn to_payload<T: Serialize>(record: &T) -> Result<serde_json::Value, BoardError> {
    serde_json::to_value(record).map_err(|e| BoardError::Internal(e.into()))
}

fn require_title(title: &str) -> Result<(), BoardError> {
    if title.trim().is_empty() {
        return Err(BoardError::Validation("title is required".into()));
    }
    Ok(())
}

impl BoardService {
    pub fn new(store: Arc<dyn BoardStore>, events: Arc<dyn EventEmitter>) -> Self {
        Self { store, events }
    }

    async fn require_epic(&self, id: Uuid) -> Result<Epic, BoardError> {
        self.store
            .get_epic(id)
            .await?
            .ok_or_else(|| BoardError::NotFound(format!("epic {id} not found")))
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    pub async fn list_projects(&self) -> Result<Vec<Project>, BoardError> {
        Ok(self.store.list_projects().await?)
    }

    pub async fn get_project(&self, id: Uuid) -> Result<Project, BoardError> {
        self.store
            .get_project(id)
            .await?
            .ok_or_else(|| BoardError::NotFound(format!("project {id} not found")))
    }

    pub async fn create_project(&self, new: NewProject) -> Result<Project, BoardError> {
        require_title(&new.title)?;
        let project = Project::new(new.title, new.description);
        self.store.insert_project(project.clone()).await?;
        info!(project_id = %project.id, title = %project.title, "project created");
        self.events
            .emit(BoardEvent::created(EntityKind::Project, to_payload(&project)?));
        Ok(project)
    }

    pub async fn update_project(
        &self,
        id: Uuid,
        patch: ProjectPatch,
    ) -> Result<Project, BoardError> {
        let mut project = self.get_project(id).await?;
        project.apply(&patch);
        if !self.store.update_project(project.clone()).await? {
            return Err(BoardError::NotFound(format!("project {id} not found")));
        }
        self.events
            .emit(BoardEvent::updated(EntityKind::Project, to_payload(&project)?));
        Ok(project)
    }

    pub async fn delete_project(&self, id: Uuid) -> Result<(), BoardError> {
        if !self.store.delete_project(id).await? {
            return Err(BoardError::NotFound(format!("project {id} not found")));
        }
        info!(project_id = %id, "project deleted");
        self.events.emit(BoardEvent::deleted(EntityKind::Project, id));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Epics
    // ------------------------------------------------------------------

    pub async fn list_epics(&self) -> Result<Vec<Epic>, BoardError> {
        Ok(self.store.list_epics().await?)
    }

    pub async fn get_epic(&self, id: Uuid) -> Result<Epic, BoardError> {
        self.require_epic(id).await
    }

    pub async fn create_epic(&self, new: NewEpic) -> Result<Epic, BoardError> {
        require_title(&new.title)?;
        if self.store.get_project(new.project_id).await?.is_none() {
            return Err(BoardError::NotFound(format!(
                "project {} not found",
                new.project_id
            )));
        }
        let epic = Epic::new(new.project_id, new.title, new.priority, new.description);
        self.store.insert_epic(epic.clone()).await?;
        info!(epic_id = %epic.id, project_id = %epic.project_id, "epic created");
        self.events
            .emit(BoardEvent::created(EntityKind::Epic, to_payload(&epic)?));
        Ok(epic)
    }

    pub async fn update_epic(&self, id: Uuid, patch: EpicPatch) -> Result<Epic, BoardError> {
        let mut epic = self.require_epic(id).await?;
        epic.apply(&patch);
        if !self.store.update_epic(epic.clone()).await? {
            return Err(BoardError::NotFound(format!("epic {id} not found")));
        }
        self.events
            .emit(BoardEvent::updated(EntityKind::Epic, to_payload(&epic)?));
        Ok(epic)
    }

    pub async fn delete_epic(&self, id: Uuid) -> Result<(), BoardError> {
        if !self.store.delete_epic(id).await? {
            return Err(BoardError::NotFound(format!("epic {id} not found")));
        }
        info!(epic_id = %id, "epic deleted");
        self.events.emit(BoardEvent::deleted(EntityKind::Epic, id));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    pub async fn list_tasks(&self) -> Result<Vec<Task>, BoardError> {
        Ok(self.store.list_tasks().await?)
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Task, BoardError> {
        self.store
            .get_task(id)
            .await?
            .ok_or_else(|| BoardError::NotFound(format!("task {id} not found")))
    }

    /// Tasks of one epic, order ascending. 404s on an unknown epic rather
    /// than returning an empty list.
    pub async fn tasks_for_epic(&self, epic_id: Uuid) -> Result<Vec<Task>, BoardError> {
        self.require_epic(epic_id).await?;
        Ok(self.store.tasks_for_epic(epic_id).await?)
    }

    pub async fn create_task(&self, new: NewTask) -> Result<Task, BoardError> {
        require_title(&new.title)?;
        self.require_epic(new.epic_id).await?;

        let order = ordering::next_order(self.store.max_task_order(new.epic_id).await?);
        let task = Task::new(
            new.epic_id,
            new.title,
            new.description,
            new.status,
            new.priority,
            order,
        );
        self.store.insert_task(task.clone()).await?;
        info!(task_id = %task.id, epic_id = %task.epic_id, order, "task created");
        self.events
            .emit(BoardEvent::created(EntityKind::Task, to_payload(&task)?));
        Ok(task)
    }

    /// Partial patch: only the provided fields change. The emitted event
    /// carries the full post-update record.
    pub async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task, BoardError> {
        let mut task = self.get_task(id).await?;
        task.apply(&patch);
        if !self.store.update_task(task.clone()).await? {
            return Err(BoardError::NotFound(format!("task {id} not found")));
        }
        self.events
            .emit(BoardEvent::updated(EntityKind::Task, to_payload(&task)?));
        Ok(task)
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<(), BoardError> {
        if !self.store.delete_task(id).await? {
            return Err(BoardError::NotFound(format!("task {id} not found")));
        }
        info!(task_id = %id, "task deleted");
        self.events.emit(BoardEvent::deleted(EntityKind::Task, id));
        Ok(())
    }

    /// Bulk ingestion: parse the blob, assign consecutive orders from one
    /// base read, persist the whole batch, then emit a single coarse
    /// `tasks_bulk_updated` signal. Returns the number of created tasks.
    pub async fn create_tasks_from_text(
        &self,
        epic_id: Uuid,
        raw_text: &str,
    ) -> Result<u64, BoardError> {
        self.require_epic(epic_id).await?;
        let drafts = parse_bulk_text(raw_text)?;

        let base = ordering::next_order(self.store.max_task_order(epic_id).await?);
        let orders = ordering::assign_orders(base, drafts.len());
        let tasks: Vec<Task> = drafts
            .into_iter()
            .zip(orders)
            .map(|(draft, order)| {
                Task::new(
                    epic_id,
                    draft.title,
                    draft.description,
                    Default::default(),
                    draft.priority,
                    order,
                )
            })
            .collect();

        let count = self.store.insert_tasks(tasks).await?;
        info!(epic_id = %epic_id, count, base, "bulk task batch created");
        self.events.emit(BoardEvent::tasks_bulk_updated());
        Ok(count)
    }
}
