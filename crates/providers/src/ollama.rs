use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::agent_api::ChatMessage;
use shared::settings::ModelProvider;
use std::sync::LazyLock;
use std::time::Duration;

use crate::router::TextBackend;

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct OllamaMessage {
    role: String,
    content: String,
}

/// Local model backend (Ollama).
pub struct OllamaClient {
    http: Client,
    base: String,
    model: String,
}

impl OllamaClient {
    pub fn from_settings(settings: &ModelProvider) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            base: settings.local_base_url.trim_end_matches('/').to_string(),
            model: settings.local_model.clone(),
        }
    }
}

#[async_trait]
impl TextBackend for OllamaClient {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn generate(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let url = format!("{}/api/chat", self.base);
        let req = OllamaChatRequest {
            model: &self.model,
            messages: &messages,
            stream: false,
        };
        let resp = self.http.post(url).json(&req).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("ollama error: {}", resp.status()));
        }
        let body: OllamaChatResponse = resp.json().await?;
        Ok(body.message.content)
    }
}
