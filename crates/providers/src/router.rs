//! Two-tier text generation: hosted backend when online, local model
//! otherwise, and a fixed apology when neither responds.

use anyhow::Result;
use async_trait::async_trait;
use shared::agent_api::ChatMessage;
use shared::settings::ModelProvider;

use crate::connectivity::{Connectivity, HttpProbe};
use crate::ollama::OllamaClient;
use crate::openai::OpenAIClient;

/// Returned when neither backend produced a response. Generation never
/// surfaces an error to callers; the user always gets some text back.
pub const FALLBACK_APOLOGY: &str = "Sorry, I couldn't reach an AI service. \
    Please check your internet connection and that the local model is running.";

#[async_trait]
pub trait TextBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn generate(&self, messages: Vec<ChatMessage>) -> Result<String>;
}

pub struct GenerationRouter {
    gate: Box<dyn Connectivity>,
    hosted: Option<Box<dyn TextBackend>>,
    local: Box<dyn TextBackend>,
}

impl GenerationRouter {
    pub fn new(
        gate: Box<dyn Connectivity>,
        hosted: Option<Box<dyn TextBackend>>,
        local: Box<dyn TextBackend>,
    ) -> Self {
        Self { gate, hosted, local }
    }

    pub fn from_settings(probe_url: &str, settings: &ModelProvider) -> Self {
        let hosted = match OpenAIClient::from_settings(settings) {
            Ok(client) => Some(Box::new(client) as Box<dyn TextBackend>),
            Err(e) => {
                tracing::warn!("hosted backend unavailable: {}", e);
                None
            }
        };
        Self::new(
            Box::new(HttpProbe::new(probe_url)),
            hosted,
            Box::new(OllamaClient::from_settings(settings)),
        )
    }

    /// Fallback chain, each tier attempted at most once per call:
    /// online → hosted; hosted failure or offline → local; local failure →
    /// [`FALLBACK_APOLOGY`].
    pub async fn generate(&self, prompt: &str, system_message: &str) -> String {
        let messages = vec![
            ChatMessage::system(system_message),
            ChatMessage::user(prompt),
        ];

        if self.gate.is_online().await {
            if let Some(hosted) = &self.hosted {
                match hosted.generate(messages.clone()).await {
                    Ok(text) => return text,
                    Err(e) => {
                        tracing::warn!(
                            backend = hosted.name(),
                            "hosted generation failed, falling back to local: {}",
                            e
                        );
                    }
                }
            }
        }

        match self.local.generate(messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(backend = self.local.name(), "local generation failed: {}", e);
                FALLBACK_APOLOGY.to_string()
            }
        }
    }
}
