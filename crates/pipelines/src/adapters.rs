//! Seams between pipelines and the external world. Pipelines call these
//! traits; the concrete Google clients and the generation router implement
//! them.

use anyhow::Result;
use async_trait::async_trait;
use providers::router::GenerationRouter;
use services::drive::{DriveClient, DriveFile};
use services::gmail::{EmailSummary, GmailClient};
use services::gtasks::{NewTask, TasksClient};

#[async_trait]
pub trait FileSearch: Send + Sync {
    async fn search(&self, query: &str, page_size: u32) -> Result<Vec<DriveFile>>;
}

#[async_trait]
pub trait MailSource: Send + Sync {
    async fn unread(&self, limit: u32) -> Result<Vec<EmailSummary>>;
}

#[async_trait]
pub trait TaskSink: Send + Sync {
    /// Insert into the account's default task list; returns the new task ids.
    async fn add_tasks(&self, tasks: &[NewTask]) -> Result<Vec<String>>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Never fails; backend trouble comes back as apology text.
    async fn generate(&self, prompt: &str, system_message: &str) -> String;
}

#[async_trait]
impl FileSearch for DriveClient {
    async fn search(&self, query: &str, page_size: u32) -> Result<Vec<DriveFile>> {
        self.search_fulltext(query, page_size).await
    }
}

#[async_trait]
impl MailSource for GmailClient {
    async fn unread(&self, limit: u32) -> Result<Vec<EmailSummary>> {
        let ids = self.list_unread(limit).await?;
        let mut messages = Vec::with_capacity(ids.len());
        for id in ids {
            messages.push(self.message(&id).await?);
        }
        Ok(messages)
    }
}

#[async_trait]
impl TaskSink for TasksClient {
    async fn add_tasks(&self, tasks: &[NewTask]) -> Result<Vec<String>> {
        // Resolve the list once; the inserts share it.
        let tasklist_id = self.default_tasklist().await?;
        let mut ids = Vec::with_capacity(tasks.len());
        for task in tasks {
            ids.push(self.insert(&tasklist_id, task).await?.id);
        }
        Ok(ids)
    }
}

#[async_trait]
impl TextGenerator for GenerationRouter {
    async fn generate(&self, prompt: &str, system_message: &str) -> String {
        GenerationRouter::generate(self, prompt, system_message).await
    }
}
