//! Gmail adapter: unread-message listing and per-message fetch, trimmed down
//! to what the reply-draft pipeline needs.

use anyhow::{anyhow, Result};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build HTTP client")
});

const GMAIL_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Bodies are cut at 500 characters; enough context for a reply draft.
const BODY_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Message {
    payload: MessagePayload,
}

#[derive(Debug, Deserialize, Default)]
struct MessagePayload {
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    parts: Option<Vec<MessagePart>>,
    #[serde(default)]
    body: Option<MessageBody>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct MessagePart {
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(default)]
    body: Option<MessageBody>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    data: Option<String>,
}

/// One unread message, ready for prompting.
#[derive(Debug, Clone)]
pub struct EmailSummary {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub body: String,
}

pub struct GmailClient {
    http: Client,
    token: String,
}

impl GmailClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            token: token.into(),
        }
    }

    /// Ids of unread messages, newest first, capped at `max_results`.
    pub async fn list_unread(&self, max_results: u32) -> Result<Vec<String>> {
        let max_results = max_results.to_string();
        let resp = self
            .http
            .get(format!("{}/messages", GMAIL_BASE))
            .bearer_auth(&self.token)
            .query(&[("q", "is:unread"), ("maxResults", max_results.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Gmail API error: {} - {}", status, body));
        }

        let body: MessageListResponse = resp.json().await?;
        Ok(body.messages.into_iter().map(|m| m.id).collect())
    }

    /// Fetch one message and reduce it to subject / sender / body preview.
    pub async fn message(&self, id: &str) -> Result<EmailSummary> {
        let resp = self
            .http
            .get(format!("{}/messages/{}", GMAIL_BASE, id))
            .bearer_auth(&self.token)
            .query(&[("format", "full")])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Gmail API error: {} - {}", status, body));
        }

        let msg: Message = resp.json().await?;
        Ok(summarize_message(id, &msg.payload))
    }
}

fn summarize_message(id: &str, payload: &MessagePayload) -> EmailSummary {
    let mut subject = String::new();
    let mut sender = String::new();
    for header in &payload.headers {
        match header.name.as_str() {
            "Subject" => subject = header.value.clone(),
            "From" => sender = header.value.clone(),
            _ => {}
        }
    }
    let body = extract_plain_text(payload).unwrap_or_default();
    EmailSummary {
        id: id.to_string(),
        subject,
        sender,
        body: truncate_body(&body),
    }
}

/// Prefer a text/plain part; fall back to the top-level body.
fn extract_plain_text(payload: &MessagePayload) -> Option<String> {
    if let Some(parts) = &payload.parts {
        for part in parts {
            if part.mime_type == "text/plain" {
                if let Some(data) = part.body.as_ref().and_then(|b| b.data.as_ref()) {
                    if let Ok(bytes) = decode_base64url(data) {
                        return Some(String::from_utf8_lossy(&bytes).into_owned());
                    }
                }
            }
        }
    }
    let data = payload.body.as_ref()?.data.as_ref()?;
    decode_base64url(data)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Gmail sends base64url with or without padding depending on the part.
fn decode_base64url(data: &str) -> Result<Vec<u8>> {
    let mut padded = data.trim().to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|e| anyhow!("invalid base64url message body: {}", e))
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() > BODY_PREVIEW_CHARS {
        let cut: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        URL_SAFE.encode(text.as_bytes())
    }

    #[test]
    fn test_decode_base64url_accepts_unpadded_input() {
        let padded = encode("hello world");
        let unpadded = padded.trim_end_matches('=').to_string();
        assert_eq!(decode_base64url(&padded).unwrap(), b"hello world");
        assert_eq!(decode_base64url(&unpadded).unwrap(), b"hello world");
    }

    #[test]
    fn test_truncate_body_cuts_long_bodies() {
        let long = "x".repeat(600);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), BODY_PREVIEW_CHARS + 3);

        let short = "short body";
        assert_eq!(truncate_body(short), short);
    }

    #[test]
    fn test_summarize_message_prefers_text_plain_part() {
        let payload: MessagePayload = serde_json::from_value(serde_json::json!({
            "headers": [
                {"name": "Subject", "value": "Meeting"},
                {"name": "From", "value": "alice@example.com"},
                {"name": "Date", "value": "irrelevant"}
            ],
            "parts": [
                {"mimeType": "text/html", "body": {"data": encode("<b>hi</b>")}},
                {"mimeType": "text/plain", "body": {"data": encode("plain text wins")}}
            ]
        }))
        .unwrap();

        let summary = summarize_message("m1", &payload);
        assert_eq!(summary.subject, "Meeting");
        assert_eq!(summary.sender, "alice@example.com");
        assert_eq!(summary.body, "plain text wins");
    }

    #[test]
    fn test_summarize_message_falls_back_to_top_level_body() {
        let payload: MessagePayload = serde_json::from_value(serde_json::json!({
            "headers": [{"name": "Subject", "value": "No parts"}],
            "body": {"data": encode("top level body")}
        }))
        .unwrap();

        let summary = summarize_message("m2", &payload);
        assert_eq!(summary.body, "top level body");
    }

    #[test]
    fn test_empty_message_list_defaults() {
        let body: MessageListResponse = serde_json::from_str("{}").unwrap();
        assert!(body.messages.is_empty());
    }
}
