pub mod jobs;

pub mod settings {
    use serde::{Deserialize, Serialize};

    fn default_probe_url() -> String {
        "https://www.google.com".to_string()
    }

    fn default_drive_page_size() -> u32 {
        10
    }

    fn default_unread_mail_limit() -> u32 {
        5
    }

    /// Text-generation backend configuration: one hosted chat-completions
    /// endpoint and one local Ollama endpoint.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ModelProvider {
        pub hosted_model: String, // e.g., "gpt-4o"
        pub hosted_base_url: Option<String>,
        pub hosted_api_key: Option<String>,
        pub local_model: String, // e.g., "gemma3:1b" for Ollama
        pub local_base_url: String,
    }

    /// Google OAuth app credentials (the installed-app client, not the
    /// per-user tokens — those live in the token cache).
    #[derive(Debug, Clone, Serialize, Deserialize, Default)]
    pub struct GoogleSettings {
        pub client_id: String,
        pub client_secret: Option<String>,
    }

    /// Per-user Google tokens, persisted by the token cache.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct StoredCredentials {
        pub access_token: String,
        pub refresh_token: Option<String>,
        pub expires_at: Option<i64>, // Unix timestamp
    }

    impl StoredCredentials {
        /// Treats a token as expired 60 seconds early so a request started
        /// now doesn't race the real expiry.
        pub fn is_expired(&self, now: i64) -> bool {
            match self.expires_at {
                Some(at) => now >= at - 60,
                None => false,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AssistantSettings {
        pub model: ModelProvider,
        #[serde(default)]
        pub google: GoogleSettings,
        #[serde(default = "default_probe_url")]
        pub probe_url: String,
        #[serde(default = "default_drive_page_size")]
        pub drive_page_size: u32,
        #[serde(default = "default_unread_mail_limit")]
        pub unread_mail_limit: u32,
    }

    impl Default for ModelProvider {
        fn default() -> Self {
            Self {
                hosted_model: "gpt-4o".into(),
                hosted_base_url: None,
                hosted_api_key: None,
                local_model: "gemma3:1b".into(),
                local_base_url: "http://127.0.0.1:11434".into(),
            }
        }
    }

    impl Default for AssistantSettings {
        fn default() -> Self {
            Self {
                model: ModelProvider::default(),
                google: GoogleSettings::default(),
                probe_url: default_probe_url(),
                drive_page_size: default_drive_page_size(),
                unread_mail_limit: default_unread_mail_limit(),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults_cover_fresh_install() {
            let settings = AssistantSettings::default();
            assert_eq!(settings.drive_page_size, 10);
            assert_eq!(settings.unread_mail_limit, 5);
            assert!(settings.probe_url.starts_with("https://"));
            assert!(settings.model.hosted_api_key.is_none());
        }

        #[test]
        fn test_credential_expiry_skew() {
            let creds = StoredCredentials {
                access_token: "t".into(),
                refresh_token: None,
                expires_at: Some(1_000),
            };
            assert!(!creds.is_expired(900));
            assert!(creds.is_expired(941)); // inside the 60s skew window
            assert!(creds.is_expired(1_001));

            let no_expiry = StoredCredentials {
                access_token: "t".into(),
                refresh_token: None,
                expires_at: None,
            };
            assert!(!no_expiry.is_expired(i64::MAX));
        }
    }
}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: String, // "system" | "user" | "assistant"
        pub content: String,
    }

    impl ChatMessage {
        pub fn system(content: impl Into<String>) -> Self {
            Self {
                role: "system".into(),
                content: content.into(),
            }
        }

        pub fn user(content: impl Into<String>) -> Self {
            Self {
                role: "user".into(),
                content: content.into(),
            }
        }
    }
}
