//! Google token cache: stores per-user credentials on disk and refreshes the
//! access token through the token endpoint when it expires.
//!
//! The interactive authorization flow that first produces the credentials
//! lives in the providers crate; this module only caches and refreshes.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use shared::settings::{GoogleSettings, StoredCredentials};
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build HTTP client")
});

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

pub const NOT_CONNECTED: &str =
    "Google account is not connected. Use \"Connect Google\" first.";

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

pub struct GoogleAuth {
    http: Client,
    google: GoogleSettings,
    cache_path: PathBuf,
}

impl GoogleAuth {
    pub fn new(google: GoogleSettings) -> Result<Self> {
        let cache_path = default_cache_path()
            .ok_or_else(|| anyhow!("could not determine a config directory for the token cache"))?;
        Ok(Self::with_cache_path(google, cache_path))
    }

    pub fn with_cache_path(google: GoogleSettings, cache_path: PathBuf) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            google,
            cache_path,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.load().is_some()
    }

    /// Persist credentials after an interactive authorization.
    pub fn store(&self, creds: &StoredCredentials) -> Result<()> {
        if let Some(dir) = self.cache_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let bytes = serde_json::to_vec_pretty(creds)?;
        fs::write(&self.cache_path, bytes)
            .with_context(|| format!("writing token cache {}", self.cache_path.display()))?;
        Ok(())
    }

    fn load(&self) -> Option<StoredCredentials> {
        let bytes = fs::read(&self.cache_path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// A valid access token, refreshed first when the cached one has expired.
    pub async fn access_token(&self) -> Result<String> {
        let creds = self.load().ok_or_else(|| anyhow!(NOT_CONNECTED))?;
        let now = chrono::Utc::now().timestamp();
        if !creds.is_expired(now) {
            return Ok(creds.access_token);
        }

        let refresh_token = creds.refresh_token.clone().ok_or_else(|| {
            anyhow!("Google session expired and no refresh token is available. Reconnect the account.")
        })?;
        tracing::info!("refreshing Google access token");
        let refreshed = self.refresh(&refresh_token).await?;
        self.store(&refreshed)?;
        Ok(refreshed.access_token)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<StoredCredentials> {
        let mut params = vec![
            ("client_id", self.google.client_id.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        if let Some(secret) = &self.google.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        let resp = self.http.post(TOKEN_URL).form(&params).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("token refresh failed: {} - {}", status, body));
        }
        let body: RefreshResponse = resp.json().await?;

        Ok(StoredCredentials {
            access_token: body.access_token,
            refresh_token: Some(refresh_token.to_string()),
            expires_at: body
                .expires_in
                .map(|secs| chrono::Utc::now().timestamp() + secs),
        })
    }
}

fn default_cache_path() -> Option<PathBuf> {
    let proj = directories::ProjectDirs::from("com.local", "Deskmate", "Deskmate")?;
    Some(proj.config_dir().join("google_token.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_with_temp_cache(dir: &tempfile::TempDir) -> GoogleAuth {
        GoogleAuth::with_cache_path(
            GoogleSettings {
                client_id: "client".into(),
                client_secret: None,
            },
            dir.path().join("google_token.json"),
        )
    }

    #[tokio::test]
    async fn test_unexpired_token_is_returned_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth_with_temp_cache(&dir);
        auth.store(&StoredCredentials {
            access_token: "cached-token".into(),
            refresh_token: None,
            expires_at: None, // no expiry recorded: treat as valid
        })
        .unwrap();

        assert!(auth.is_connected());
        assert_eq!(auth.access_token().await.unwrap(), "cached-token");
    }

    #[tokio::test]
    async fn test_missing_cache_reports_not_connected() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth_with_temp_cache(&dir);

        assert!(!auth.is_connected());
        let err = auth.access_token().await.unwrap_err();
        assert!(err.to_string().contains("not connected"));
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_token_errors() {
        let dir = tempfile::tempdir().unwrap();
        let auth = auth_with_temp_cache(&dir);
        auth.store(&StoredCredentials {
            access_token: "stale".into(),
            refresh_token: None,
            expires_at: Some(0),
        })
        .unwrap();

        let err = auth.access_token().await.unwrap_err();
        assert!(err.to_string().contains("Reconnect"));
    }
}
