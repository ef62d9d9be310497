//! Google Tasks adapter: task-list discovery and task creation.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build HTTP client")
});

const TASKS_BASE: &str = "https://tasks.googleapis.com/tasks/v1";

/// List created on first use when the account has no task lists yet.
const DEFAULT_LIST_TITLE: &str = "Assistant";

#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// RFC 3339 due date, e.g. `2024-12-15T00:00:00.000Z`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskListsResponse {
    #[serde(default)]
    items: Vec<TaskListEntry>,
}

#[derive(Debug, Deserialize)]
struct TaskListEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatedTask {
    pub id: String,
}

pub struct TasksClient {
    http: Client,
    token: String,
}

impl TasksClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            token: token.into(),
        }
    }

    /// First existing task list, or a fresh one when the account has none.
    pub async fn default_tasklist(&self) -> Result<String> {
        let resp = self
            .http
            .get(format!("{}/users/@me/lists", TASKS_BASE))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Tasks API error: {} - {}", status, body));
        }

        let body: TaskListsResponse = resp.json().await?;
        if let Some(first) = body.items.first() {
            return Ok(first.id.clone());
        }

        tracing::info!("no task lists found, creating \"{}\"", DEFAULT_LIST_TITLE);
        let resp = self
            .http
            .post(format!("{}/users/@me/lists", TASKS_BASE))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "title": DEFAULT_LIST_TITLE }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Tasks API error: {} - {}", status, body));
        }

        let created: TaskListEntry = resp.json().await?;
        Ok(created.id)
    }

    pub async fn insert(&self, tasklist_id: &str, task: &NewTask) -> Result<CreatedTask> {
        let resp = self
            .http
            .post(format!("{}/lists/{}/tasks", TASKS_BASE, tasklist_id))
            .bearer_auth(&self.token)
            .json(task)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Tasks API error: {} - {}", status, body));
        }

        Ok(resp.json().await?)
    }
}
