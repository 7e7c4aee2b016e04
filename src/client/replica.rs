//! Client-side reconciliation store.
//!
//! Holds a local copy of the shared board, applies optimistic mutations
//! immediately for instant feedback, then reconciles against the stream of
//! authoritative notifications. Notifications are applied in arrival
//! order, last one wins per id; an authoritative payload always replaces
//! the local guess wholesale, never merged field-by-field. A very late
//! stale `updated` notification can therefore overwrite a newer local
//! edit — accepted weak-consistency trade-off.

use crate::board::{Epic, NewTask, Project, Status, Task, TaskPatch};
use crate::client::gateway::BoardGateway;
use crate::events::{BoardEvent, ChangeAction, EntityKind};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// How long a deleted task stays restorable before the authoritative
/// delete request fires.
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(5);

/// Confirmation phase of a cached task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Local optimistic value, not yet acknowledged by the server.
    Tentative,
    /// Matches the last authoritative value seen for this id.
    Confirmed,
}

#[derive(Debug, Clone)]
struct TaskEntry {
    task: Task,
    phase: Phase,
}

/// A delete whose authoritative request is deferred for the undo window.
/// At most one exists at a time.
struct PendingDelete {
    task: Task,
    cancel: CancellationToken,
}

#[derive(Default)]
struct ReplicaState {
    projects: HashMap<Uuid, Project>,
    epics: HashMap<Uuid, Epic>,
    tasks: HashMap<Uuid, TaskEntry>,
    pending_delete: Option<PendingDelete>,
    /// UI focus only. Private to this client, never synchronized.
    selected_epic: Option<Uuid>,
}

struct ReplicaInner {
    gateway: Arc<dyn BoardGateway>,
    state: Mutex<ReplicaState>,
    undo_window: Duration,
}

/// Cheaply clonable handle to the client's board cache.
#[derive(Clone)]
pub struct BoardReplica {
    inner: Arc<ReplicaInner>,
}

impl BoardReplica {
    pub fn new(gateway: Arc<dyn BoardGateway>) -> Self {
        Self::with_undo_window(gateway, DEFAULT_UNDO_WINDOW)
    }

    pub fn with_undo_window(gateway: Arc<dyn BoardGateway>, undo_window: Duration) -> Self {
        Self {
            inner: Arc::new(ReplicaInner {
                gateway,
                state: Mutex::new(ReplicaState::default()),
                undo_window,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Projects, newest first.
    pub async fn projects(&self) -> Vec<Project> {
        let state = self.inner.state.lock().await;
        let mut projects: Vec<Project> = state.projects.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        projects
    }

    /// Epics, newest first.
    pub async fn epics(&self) -> Vec<Epic> {
        let state = self.inner.state.lock().await;
        let mut epics: Vec<Epic> = state.epics.values().cloned().collect();
        epics.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        epics
    }

    /// All locally visible tasks. A task inside its pending-undo window is
    /// not visible.
    pub async fn tasks(&self) -> Vec<Task> {
        let state = self.inner.state.lock().await;
        let mut tasks: Vec<Task> = state.tasks.values().map(|e| e.task.clone()).collect();
        tasks.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        tasks
    }

    /// Visible tasks of one epic, order ascending.
    pub async fn tasks_for_epic(&self, epic_id: Uuid) -> Vec<Task> {
        self.tasks()
            .await
            .into_iter()
            .filter(|t| t.epic_id == epic_id)
            .collect()
    }

    pub async fn get_task(&self, id: Uuid) -> Option<Task> {
        let state = self.inner.state.lock().await;
        state.tasks.get(&id).map(|e| e.task.clone())
    }

    /// Task currently inside its undo window, if any.
    pub async fn pending_delete(&self) -> Option<Task> {
        let state = self.inner.state.lock().await;
        state.pending_delete.as_ref().map(|p| p.task.clone())
    }

    pub async fn select_epic(&self, epic_id: Option<Uuid>) {
        self.inner.state.lock().await.selected_epic = epic_id;
    }

    pub async fn selected_epic(&self) -> Option<Uuid> {
        self.inner.state.lock().await.selected_epic
    }

    // ------------------------------------------------------------------
    // Resync
    // ------------------------------------------------------------------

    /// Full refetch of the authoritative state.
    ///
    /// Used on (re)connect: the notification channel is at-least-once with
    /// no backlog replay, so a client must never assume gap-free delivery.
    pub async fn resync(&self) -> Result<()> {
        let projects = self.inner.gateway.list_projects().await?;
        let epics = self.inner.gateway.list_epics().await?;
        let tasks = self.inner.gateway.list_tasks().await?;

        let mut state = self.inner.state.lock().await;
        state.projects = projects.into_iter().map(|p| (p.id, p)).collect();
        state.epics = epics.into_iter().map(|e| (e.id, e)).collect();
        Self::replace_tasks(&mut state, tasks);
        Ok(())
    }

    /// Replace the confirmed task set, preserving tentative placeholders
    /// the server cannot know yet and keeping a pending-undo task hidden.
    fn replace_tasks(state: &mut ReplicaState, authoritative: Vec<Task>) {
        let tentative: Vec<TaskEntry> = state
            .tasks
            .values()
            .filter(|e| e.phase == Phase::Tentative)
            .cloned()
            .collect();
        state.tasks = authoritative
            .into_iter()
            .map(|t| {
                (
                    t.id,
                    TaskEntry {
                        task: t,
                        phase: Phase::Confirmed,
                    },
                )
            })
            .collect();
        for entry in tentative {
            state.tasks.entry(entry.task.id).or_insert(entry);
        }
        if let Some(pending) = &state.pending_delete {
            state.tasks.remove(&pending.task.id);
        }
    }

    // ------------------------------------------------------------------
    // Optimistic mutations
    // ------------------------------------------------------------------

    /// Create a task: a tentative placeholder appears immediately, then is
    /// replaced by the authoritative record (or removed on failure).
    pub async fn create_task(&self, new: NewTask) -> Result<Task> {
        let placeholder_id;
        {
            let mut state = self.inner.state.lock().await;
            // Client-side guess at the order the server will assign.
            let guess = state
                .tasks
                .values()
                .filter(|e| e.task.epic_id == new.epic_id)
                .map(|e| e.task.order)
                .max()
                .map_or(0, |max| max + 1);
            let placeholder = Task::new(
                new.epic_id,
                new.title.clone(),
                new.description.clone(),
                new.status,
                new.priority,
                guess,
            );
            placeholder_id = placeholder.id;
            state.tasks.insert(
                placeholder_id,
                TaskEntry {
                    task: placeholder,
                    phase: Phase::Tentative,
                },
            );
        }

        match self.inner.gateway.create_task(new).await {
            Ok(task) => {
                let mut state = self.inner.state.lock().await;
                state.tasks.remove(&placeholder_id);
                state.tasks.insert(
                    task.id,
                    TaskEntry {
                        task: task.clone(),
                        phase: Phase::Confirmed,
                    },
                );
                Ok(task)
            }
            Err(e) => {
                let mut state = self.inner.state.lock().await;
                state.tasks.remove(&placeholder_id);
                Err(e)
            }
        }
    }

    /// Edit a task: the patch is visible immediately; on failure the
    /// pre-mutation value is rolled back.
    pub async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task> {
        let previous = {
            let mut state = self.inner.state.lock().await;
            let entry = state
                .tasks
                .get_mut(&id)
                .ok_or_else(|| anyhow!("task {id} not in local cache"))?;
            let previous = entry.clone();
            entry.task.apply(&patch);
            entry.phase = Phase::Tentative;
            previous
        };

        match self.inner.gateway.update_task(id, patch).await {
            Ok(task) => {
                let mut state = self.inner.state.lock().await;
                // Skip if an authoritative delete arrived in the meantime.
                if let Some(entry) = state.tasks.get_mut(&id) {
                    entry.task = task.clone();
                    entry.phase = Phase::Confirmed;
                }
                Ok(task)
            }
            Err(e) => {
                let mut state = self.inner.state.lock().await;
                if state.tasks.contains_key(&id) {
                    state.tasks.insert(id, previous);
                }
                Err(e)
            }
        }
    }

    /// Move a task to another status column (drag-and-drop between columns).
    pub async fn set_task_status(&self, id: Uuid, status: Status) -> Result<Task> {
        self.update_task(id, TaskPatch::status(status)).await
    }

    // ------------------------------------------------------------------
    // Delete with undo window
    // ------------------------------------------------------------------

    /// Delete a task with an undo window.
    ///
    /// The task disappears locally at once, but the authoritative delete
    /// is deferred until the window elapses without an undo. A second
    /// delete while one is pending flushes the first authoritative
    /// request immediately — at most one task is pending-undo at a time.
    pub async fn delete_task(&self, id: Uuid) -> Result<()> {
        // Flush any previous pending delete before starting a new window.
        let flushed = {
            let mut state = self.inner.state.lock().await;
            if !state.tasks.contains_key(&id) {
                return Err(anyhow!("task {id} not in local cache"));
            }
            state.pending_delete.take()
        };
        if let Some(previous) = flushed {
            previous.cancel.cancel();
            self.authoritative_delete(previous.task.id).await;
        }

        let cancel = CancellationToken::new();
        {
            let mut state = self.inner.state.lock().await;
            let entry = state
                .tasks
                .remove(&id)
                .ok_or_else(|| anyhow!("task {id} not in local cache"))?;
            state.pending_delete = Some(PendingDelete {
                task: entry.task,
                cancel: cancel.clone(),
            });
        }

        let replica = self.clone();
        let window = self.inner.undo_window;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(window) => {
                    replica.finalize_pending(id).await;
                }
            }
        });
        Ok(())
    }

    /// Restore the pending-undo task. Returns `false` when no deletion is
    /// pending (the window already elapsed or nothing was deleted). No
    /// request is ever sent to the server for an undone delete.
    pub async fn undo_delete(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        match state.pending_delete.take() {
            Some(pending) => {
                pending.cancel.cancel();
                state.tasks.insert(
                    pending.task.id,
                    TaskEntry {
                        task: pending.task,
                        phase: Phase::Confirmed,
                    },
                );
                true
            }
            None => false,
        }
    }

    /// Fire the deferred authoritative delete if `id` is still pending.
    async fn finalize_pending(&self, id: Uuid) {
        let still_pending = {
            let mut state = self.inner.state.lock().await;
            match &state.pending_delete {
                Some(pending) if pending.task.id == id => {
                    state.pending_delete = None;
                    true
                }
                _ => false,
            }
        };
        if still_pending {
            self.authoritative_delete(id).await;
        }
    }

    /// Issue the authoritative delete. A NotFound here means another
    /// client got there first — the desired end state already holds, so
    /// failures are logged and swallowed.
    async fn authoritative_delete(&self, id: Uuid) {
        if let Err(e) = self.inner.gateway.delete_task(id).await {
            debug!(task_id = %id, "authoritative delete did not apply: {e}");
        }
    }

    // ------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------

    /// Apply one authoritative notification.
    ///
    /// Events are applied in arrival order; re-applying the same event is
    /// idempotent. `tasks_bulk_updated` triggers a full task refetch
    /// through the gateway.
    pub async fn apply_event(&self, event: BoardEvent) -> Result<()> {
        match (event.entity, event.action) {
            (EntityKind::Task, ChangeAction::Created)
            | (EntityKind::Task, ChangeAction::Updated) => {
                let task: Task = serde_json::from_value(event.payload)?;
                let mut state = self.inner.state.lock().await;
                // An update for the task inside its undo window refreshes
                // the captured value so an undo restores the latest state.
                if let Some(pending) = &mut state.pending_delete {
                    if pending.task.id == task.id {
                        pending.task = task;
                        return Ok(());
                    }
                }
                state.tasks.insert(
                    task.id,
                    TaskEntry {
                        task,
                        phase: Phase::Confirmed,
                    },
                );
            }
            (EntityKind::Task, ChangeAction::Deleted) => {
                let id = event
                    .deleted_id()
                    .ok_or_else(|| anyhow!("task:deleted event without id"))?;
                let mut state = self.inner.state.lock().await;
                state.tasks.remove(&id);
                // Covers a race with another client's delete: the deferred
                // request becomes pointless, cancel it.
                if let Some(pending) = &state.pending_delete {
                    if pending.task.id == id {
                        pending.cancel.cancel();
                        state.pending_delete = None;
                    }
                }
            }
            (EntityKind::Task, ChangeAction::BulkUpdated) => {
                let tasks = self.inner.gateway.list_tasks().await?;
                let mut state = self.inner.state.lock().await;
                Self::replace_tasks(&mut state, tasks);
            }
            (EntityKind::Epic, ChangeAction::Created)
            | (EntityKind::Epic, ChangeAction::Updated) => {
                let epic: Epic = serde_json::from_value(event.payload)?;
                self.inner.state.lock().await.epics.insert(epic.id, epic);
            }
            (EntityKind::Epic, ChangeAction::Deleted) => {
                let id = event
                    .deleted_id()
                    .ok_or_else(|| anyhow!("epic:deleted event without id"))?;
                let mut state = self.inner.state.lock().await;
                state.epics.remove(&id);
                state.tasks.retain(|_, e| e.task.epic_id != id);
                if state.selected_epic == Some(id) {
                    state.selected_epic = None;
                }
            }
            (EntityKind::Project, ChangeAction::Created)
            | (EntityKind::Project, ChangeAction::Updated) => {
                let project: Project = serde_json::from_value(event.payload)?;
                self.inner
                    .state
                    .lock()
                    .await
                    .projects
                    .insert(project.id, project);
            }
            (EntityKind::Project, ChangeAction::Deleted) => {
                let id = event
                    .deleted_id()
                    .ok_or_else(|| anyhow!("project:deleted event without id"))?;
                let mut state = self.inner.state.lock().await;
                state.projects.remove(&id);
                let epic_ids: Vec<Uuid> = state
                    .epics
                    .values()
                    .filter(|e| e.project_id == id)
                    .map(|e| e.id)
                    .collect();
                state.epics.retain(|_, e| e.project_id != id);
                state
                    .tasks
                    .retain(|_, e| !epic_ids.contains(&e.task.epic_id));
                if state
                    .selected_epic
                    .is_some_and(|sel| epic_ids.contains(&sel))
                {
                    state.selected_epic = None;
                }
            }
            (entity, action) => {
                warn!(?entity, ?action, "unhandled board event");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{
        BoardService, MemoryStore, NewEpic, NewProject, Priority, Status,
    };
    use crate::events::NullEmitter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Gateway wrapper counting authoritative delete requests.
    struct CountingGateway {
        inner: Arc<dyn BoardGateway>,
        deletes: AtomicUsize,
    }

    impl CountingGateway {
        fn new(inner: Arc<dyn BoardGateway>) -> Self {
            Self {
                inner,
                deletes: AtomicUsize::new(0),
            }
        }

        fn delete_count(&self) -> usize {
            self.deletes.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl BoardGateway for CountingGateway {
        async fn list_projects(&self) -> Result<Vec<Project>> {
            self.inner.list_projects().await
        }
        async fn list_epics(&self) -> Result<Vec<Epic>> {
            self.inner.list_epics().await
        }
        async fn list_tasks(&self) -> Result<Vec<Task>> {
            self.inner.list_tasks().await
        }
        async fn create_project(&self, new: NewProject) -> Result<Project> {
            self.inner.create_project(new).await
        }
        async fn create_epic(&self, new: NewEpic) -> Result<Epic> {
            self.inner.create_epic(new).await
        }
        async fn create_task(&self, new: NewTask) -> Result<Task> {
            self.inner.create_task(new).await
        }
        async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task> {
            self.inner.update_task(id, patch).await
        }
        async fn delete_task(&self, id: Uuid) -> Result<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_task(id).await
        }
        async fn create_tasks_bulk(&self, epic_id: Uuid, bulk_text: &str) -> Result<u64> {
            self.inner.create_tasks_bulk(epic_id, bulk_text).await
        }
    }

    struct Fixture {
        service: Arc<BoardService>,
        gateway: Arc<CountingGateway>,
        replica: BoardReplica,
        epic: Epic,
    }

    async fn fixture() -> Fixture {
        let service = Arc::new(BoardService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NullEmitter),
        ));
        let project = service
            .create_project(NewProject {
                title: "p".into(),
                description: None,
            })
            .await
            .unwrap();
        let epic = service
            .create_epic(NewEpic {
                title: "e".into(),
                priority: Priority::Medium,
                description: None,
                project_id: project.id,
            })
            .await
            .unwrap();
        let gateway = Arc::new(CountingGateway::new(service.clone()));
        let replica = BoardReplica::new(gateway.clone());
        replica.resync().await.unwrap();
        Fixture {
            service,
            gateway,
            replica,
            epic,
        }
    }

    fn new_task(epic_id: Uuid, title: &str) -> NewTask {
        NewTask {
            title: title.into(),
            description: None,
            status: Status::Todo,
            priority: Priority::Medium,
            epic_id,
        }
    }

    #[tokio::test]
    async fn test_optimistic_create_replaced_by_authoritative() {
        let f = fixture().await;
        let task = f
            .replica
            .create_task(new_task(f.epic.id, "hello"))
            .await
            .unwrap();

        let tasks = f.replica.tasks().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, task.id);
        assert_eq!(tasks[0].order, 0);
        // Server agrees.
        assert_eq!(f.service.list_tasks().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_create_rolls_back_placeholder() {
        let f = fixture().await;
        // Unknown epic: server rejects, placeholder must vanish.
        let err = f
            .replica
            .create_task(new_task(Uuid::new_v4(), "ghost"))
            .await;
        assert!(err.is_err());
        assert!(f.replica.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back_to_previous_value() {
        let f = fixture().await;
        let task = f
            .replica
            .create_task(new_task(f.epic.id, "stable"))
            .await
            .unwrap();
        // Make the server forget the task so the update 404s; the replica
        // still has its copy.
        f.service.delete_task(task.id).await.unwrap();

        let err = f
            .replica
            .update_task(task.id, TaskPatch::status(Status::Done))
            .await;
        assert!(err.is_err());
        let local = f.replica.get_task(task.id).await.unwrap();
        assert_eq!(local.status, Status::Todo);
    }

    #[tokio::test]
    async fn test_applying_updated_event_twice_is_idempotent() {
        let f = fixture().await;
        let task = f
            .replica
            .create_task(new_task(f.epic.id, "t"))
            .await
            .unwrap();
        let mut updated = task.clone();
        updated.status = Status::Done;
        let event = BoardEvent::updated(
            EntityKind::Task,
            serde_json::to_value(&updated).unwrap(),
        );

        f.replica.apply_event(event.clone()).await.unwrap();
        let once = f.replica.tasks().await;
        f.replica.apply_event(event).await.unwrap();
        let twice = f.replica.tasks().await;
        assert_eq!(once, twice);
        assert_eq!(twice[0].status, Status::Done);
    }

    #[tokio::test]
    async fn test_remote_delete_removes_unconditionally() {
        let f = fixture().await;
        let task = f
            .replica
            .create_task(new_task(f.epic.id, "t"))
            .await
            .unwrap();

        // Deletion initiated by another client: this replica learns of it
        // only through the notification.
        f.replica
            .apply_event(BoardEvent::deleted(EntityKind::Task, task.id))
            .await
            .unwrap();
        assert!(f.replica.get_task(task.id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_undo_within_window_sends_no_delete() {
        let f = fixture().await;
        let task = f
            .replica
            .create_task(new_task(f.epic.id, "keep me"))
            .await
            .unwrap();

        f.replica.delete_task(task.id).await.unwrap();
        assert!(f.replica.get_task(task.id).await.is_none());
        assert_eq!(f.replica.pending_delete().await.unwrap().id, task.id);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(f.replica.undo_delete().await);

        // Restored to the exact pre-delete value, zero authoritative calls.
        let restored = f.replica.get_task(task.id).await.unwrap();
        assert_eq!(restored, task);
        assert_eq!(f.gateway.delete_count(), 0);
        assert!(f.replica.pending_delete().await.is_none());

        // Let the (cancelled) timer window pass: still no delete.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(f.gateway.delete_count(), 0);
        assert_eq!(f.service.list_tasks().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_window_sends_exactly_one_delete() {
        let f = fixture().await;
        let task = f
            .replica
            .create_task(new_task(f.epic.id, "doomed"))
            .await
            .unwrap();

        f.replica.delete_task(task.id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(f.gateway.delete_count(), 1);
        assert!(f.replica.pending_delete().await.is_none());
        assert!(f.service.list_tasks().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_delete_flushes_first_early() {
        let f = fixture().await;
        let first = f
            .replica
            .create_task(new_task(f.epic.id, "first"))
            .await
            .unwrap();
        let second = f
            .replica
            .create_task(new_task(f.epic.id, "second"))
            .await
            .unwrap();

        f.replica.delete_task(first.id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        f.replica.delete_task(second.id).await.unwrap();

        // First was flushed immediately, before its window elapsed.
        assert_eq!(f.gateway.delete_count(), 1);
        assert!(f
            .service
            .list_tasks()
            .await
            .unwrap()
            .iter()
            .all(|t| t.id != first.id));
        // Only the second is still pending.
        assert_eq!(f.replica.pending_delete().await.unwrap().id, second.id);

        // Undo now restores the second, not the first.
        assert!(f.replica.undo_delete().await);
        assert!(f.replica.get_task(second.id).await.is_some());
        assert!(f.replica.get_task(first.id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_delete_cancels_pending_window() {
        let f = fixture().await;
        let task = f
            .replica
            .create_task(new_task(f.epic.id, "raced"))
            .await
            .unwrap();

        f.replica.delete_task(task.id).await.unwrap();
        // Another client's authoritative delete wins the race.
        f.replica
            .apply_event(BoardEvent::deleted(EntityKind::Task, task.id))
            .await
            .unwrap();
        assert!(f.replica.pending_delete().await.is_none());

        tokio::time::sleep(Duration::from_secs(10)).await;
        // The deferred request was cancelled, not fired.
        assert_eq!(f.gateway.delete_count(), 0);
    }

    #[tokio::test]
    async fn test_bulk_event_triggers_refetch_and_suppresses_pending() {
        let f = fixture().await;
        let victim = f
            .replica
            .create_task(new_task(f.epic.id, "pending"))
            .await
            .unwrap();
        f.replica.delete_task(victim.id).await.unwrap();

        // Bulk batch lands on the server; replica hears the coarse signal.
        f.service
            .create_tasks_from_text(f.epic.id, "A\nB - High")
            .await
            .unwrap();
        f.replica
            .apply_event(BoardEvent::tasks_bulk_updated())
            .await
            .unwrap();

        let titles: Vec<String> = f
            .replica
            .tasks_for_epic(f.epic.id)
            .await
            .iter()
            .map(|t| t.title.clone())
            .collect();
        // The refetch contains the pending task (server hasn't deleted it
        // yet) but it stays hidden locally.
        assert_eq!(titles, vec!["A".to_string(), "B".to_string()]);
        assert!(f.replica.pending_delete().await.is_some());
    }

    #[tokio::test]
    async fn test_selected_epic_is_local_focus_state() {
        let f = fixture().await;
        f.replica.select_epic(Some(f.epic.id)).await;
        assert_eq!(f.replica.selected_epic().await, Some(f.epic.id));

        // Epic deleted remotely: focus is dropped too.
        f.replica
            .apply_event(BoardEvent::deleted(EntityKind::Epic, f.epic.id))
            .await
            .unwrap();
        assert_eq!(f.replica.selected_epic().await, None);
    }
}
