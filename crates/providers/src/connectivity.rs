//! Online/offline probe that decides which text-generation backend to use.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Best-effort reachability check. No retries; any failure counts as offline.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// One GET to a known external host with a bounded timeout.
pub struct HttpProbe {
    http: Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Connectivity for HttpProbe {
    async fn is_online(&self) -> bool {
        match self.http.get(&self.url).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("connectivity probe failed: {}", e);
                false
            }
        }
    }
}
