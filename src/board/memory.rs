//! In-memory `BoardStore` implementation.
//!
//! One `RwLock` over all three collections so cascading deletes are atomic.
//! Sort tie-break on equal orders is creation time, then id, keeping the
//! within-epic sort total and stable.

use super::models::{Epic, Project, Task};
use super::store::BoardStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Collections {
    projects: HashMap<Uuid, Project>,
    epics: HashMap<Uuid, Epic>,
    tasks: HashMap<Uuid, Task>,
}

/// Process-local board storage.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner.projects.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(projects)
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        Ok(self.inner.read().await.projects.get(&id).cloned())
    }

    async fn insert_project(&self, project: Project) -> Result<()> {
        self.inner.write().await.projects.insert(project.id, project);
        Ok(())
    }

    async fn update_project(&self, project: Project) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.projects.contains_key(&project.id) {
            true => {
                inner.projects.insert(project.id, project);
                Ok(true)
            }
            false => Ok(false),
        }
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if inner.projects.remove(&id).is_none() {
            return Ok(false);
        }
        let epic_ids: Vec<Uuid> = inner
            .epics
            .values()
            .filter(|e| e.project_id == id)
            .map(|e| e.id)
            .collect();
        for epic_id in &epic_ids {
            inner.epics.remove(epic_id);
        }
        inner.tasks.retain(|_, t| !epic_ids.contains(&t.epic_id));
        Ok(true)
    }

    async fn list_epics(&self) -> Result<Vec<Epic>> {
        let inner = self.inner.read().await;
        let mut epics: Vec<Epic> = inner.epics.values().cloned().collect();
        epics.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(epics)
    }

    async fn get_epic(&self, id: Uuid) -> Result<Option<Epic>> {
        Ok(self.inner.read().await.epics.get(&id).cloned())
    }

    async fn insert_epic(&self, epic: Epic) -> Result<()> {
        self.inner.write().await.epics.insert(epic.id, epic);
        Ok(())
    }

    async fn update_epic(&self, epic: Epic) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.epics.contains_key(&epic.id) {
            true => {
                inner.epics.insert(epic.id, epic);
                Ok(true)
            }
            false => Ok(false),
        }
    }

    async fn delete_epic(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if inner.epics.remove(&id).is_none() {
            return Ok(false);
        }
        inner.tasks.retain(|_, t| t.epic_id != id);
        Ok(true)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner.tasks.values().cloned().collect();
        sort_tasks(&mut tasks);
        Ok(tasks)
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn tasks_for_epic(&self, epic_id: Uuid) -> Result<Vec<Task>> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.epic_id == epic_id)
            .cloned()
            .collect();
        sort_tasks(&mut tasks);
        Ok(tasks)
    }

    async fn max_task_order(&self, epic_id: Uuid) -> Result<Option<i64>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .values()
            .filter(|t| t.epic_id == epic_id)
            .map(|t| t.order)
            .max())
    }

    async fn insert_task(&self, task: Task) -> Result<()> {
        self.inner.write().await.tasks.insert(task.id, task);
        Ok(())
    }

    async fn insert_tasks(&self, tasks: Vec<Task>) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let count = tasks.len() as u64;
        for task in tasks {
            inner.tasks.insert(task.id, task);
        }
        Ok(count)
    }

    async fn update_task(&self, task: Task) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.tasks.contains_key(&task.id) {
            true => {
                inner.tasks.insert(task.id, task);
                Ok(true)
            }
            false => Ok(false),
        }
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool> {
        Ok(self.inner.write().await.tasks.remove(&id).is_some())
    }
}
