//! Client-to-server gateway.
//!
//! The reconciliation replica talks to the authoritative server only
//! through this trait: over HTTP for a real deployment, or directly
//! against an in-process `BoardService` for tests and embedded use.

use crate::board::{
    BoardService, Epic, NewEpic, NewProject, NewTask, Project, Task, TaskPatch,
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

#[async_trait]
pub trait BoardGateway: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn list_epics(&self) -> Result<Vec<Epic>>;
    async fn list_tasks(&self) -> Result<Vec<Task>>;
    async fn create_project(&self, new: NewProject) -> Result<Project>;
    async fn create_epic(&self, new: NewEpic) -> Result<Epic>;
    async fn create_task(&self, new: NewTask) -> Result<Task>;
    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task>;
    async fn delete_task(&self, id: Uuid) -> Result<()>;
    /// Bulk ingestion. Returns the number of created tasks.
    async fn create_tasks_bulk(&self, epic_id: Uuid, bulk_text: &str) -> Result<u64>;
}

// ============================================================================
// HTTP gateway
// ============================================================================

/// Gateway over the server's HTTP API.
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// The base_url is the server root (e.g. "http://localhost:3000").
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into an error carrying the server's
    /// `{"error": …}` message when present.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| "unknown error".to_string());
        Err(anyhow!("server returned {status}: {message}"))
    }
}

#[async_trait]
impl BoardGateway for HttpGateway {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let resp = self.client.get(self.url("/api/projects")).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn list_epics(&self) -> Result<Vec<Epic>> {
        let resp = self.client.get(self.url("/api/epics")).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let resp = self.client.get(self.url("/api/tasks")).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn create_project(&self, new: NewProject) -> Result<Project> {
        let resp = self
            .client
            .post(self.url("/api/projects"))
            .json(&new)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn create_epic(&self, new: NewEpic) -> Result<Epic> {
        let resp = self
            .client
            .post(self.url("/api/epics"))
            .json(&new)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn create_task(&self, new: NewTask) -> Result<Task> {
        let resp = self
            .client
            .post(self.url("/api/tasks"))
            .json(&new)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task> {
        let resp = self
            .client
            .put(self.url(&format!("/api/tasks/{id}")))
            .json(&patch)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/tasks/{id}")))
            .send()
            .await?;
        // 204: no body to parse.
        Self::check(resp).await?;
        Ok(())
    }

    async fn create_tasks_bulk(&self, epic_id: Uuid, bulk_text: &str) -> Result<u64> {
        let resp = self
            .client
            .post(self.url(&format!("/api/tasks/bulk/epic/{epic_id}")))
            .json(&serde_json::json!({ "bulk_text": bulk_text }))
            .send()
            .await?;
        let body: serde_json::Value = Self::check(resp).await?.json().await?;
        body.get("count")
            .and_then(|c| c.as_u64())
            .ok_or_else(|| anyhow!("bulk response missing count"))
    }
}

// ============================================================================
// In-process gateway
// ============================================================================

/// A `BoardService` is itself a gateway: replicas embedded in the server
/// process (and tests) skip the HTTP hop entirely.
#[async_trait]
impl BoardGateway for BoardService {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        BoardService::list_projects(self).await.map_err(Into::into)
    }

    async fn list_epics(&self) -> Result<Vec<Epic>> {
        BoardService::list_epics(self).await.map_err(Into::into)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        BoardService::list_tasks(self).await.map_err(Into::into)
    }

    async fn create_project(&self, new: NewProject) -> Result<Project> {
        BoardService::create_project(self, new)
            .await
            .map_err(Into::into)
    }

    async fn create_epic(&self, new: NewEpic) -> Result<Epic> {
        BoardService::create_epic(self, new)
            .await
            .map_err(Into::into)
    }

    async fn create_task(&self, new: NewTask) -> Result<Task> {
        BoardService::create_task(self, new)
            .await
            .map_err(Into::into)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> Result<Task> {
        BoardService::update_task(self, id, patch)
            .await
            .map_err(Into::into)
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        BoardService::delete_task(self, id)
            .await
            .map_err(Into::into)
    }

    async fn create_tasks_bulk(&self, epic_id: Uuid, bulk_text: &str) -> Result<u64> {
        BoardService::create_tasks_from_text(self, epic_id, bulk_text)
            .await
            .map_err(Into::into)
    }
}
