//! Google Drive adapter: full-text file search.

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

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
}

pub struct DriveClient {
    http: Client,
    token: String,
}

impl DriveClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            token: token.into(),
        }
    }

    /// Full-text search over non-trashed files.
    pub async fn search_fulltext(&self, query: &str, page_size: u32) -> Result<Vec<DriveFile>> {
        let q = format!(
            "fullText contains '{}' and trashed=false",
            escape_query(query)
        );
        let page_size = page_size.to_string();
        let resp = self
            .http
            .get(FILES_URL)
            .bearer_auth(&self.token)
            .query(&[
                ("q", q.as_str()),
                ("spaces", "drive"),
                (
                    "fields",
                    "files(id, name, mimeType, webViewLink, description, createdTime, modifiedTime)",
                ),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Drive API error: {} - {}", status, body));
        }

        let body: FileListResponse = resp.json().await?;
        tracing::debug!(count = body.files.len(), "drive search returned");
        Ok(body.files)
    }
}

/// Single quotes and backslashes must be escaped inside a Drive query literal.
fn escape_query(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_query() {
        assert_eq!(escape_query("plain"), "plain");
        assert_eq!(escape_query("it's"), "it\\'s");
        assert_eq!(escape_query("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_drive_file_deserializes_camel_case() {
        let value = serde_json::json!({
            "id": "abc",
            "name": "budget.xlsx",
            "mimeType": "application/vnd.ms-excel",
            "webViewLink": "https://drive.google.com/file/d/abc",
            "createdTime": "2024-01-01T00:00:00Z"
        });
        let file: DriveFile = serde_json::from_value(value).unwrap();
        assert_eq!(file.name, "budget.xlsx");
        assert_eq!(file.mime_type, "application/vnd.ms-excel");
        assert!(file.modified_time.is_none());
    }

    #[test]
    fn test_empty_file_list_defaults() {
        let body: FileListResponse = serde_json::from_str("{}").unwrap();
        assert!(body.files.is_empty());
    }
}
