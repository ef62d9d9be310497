//! Interactive Google authorization: installed-app PKCE flow with a loopback
//! redirect. Produces [`StoredCredentials`] for the services token cache.

use anyhow::{anyhow, Result};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge, RedirectUrl,
    Scope, TokenResponse, TokenUrl,
};
use shared::settings::{GoogleSettings, StoredCredentials};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Everything the assistant touches: read-only Drive search, mail triage,
/// task creation.
pub const GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive.readonly",
    "https://www.googleapis.com/auth/gmail.modify",
    "https://www.googleapis.com/auth/tasks",
];

pub struct GoogleOAuthFlow {
    client: BasicClient,
    port: u16,
}

impl GoogleOAuthFlow {
    pub fn new(google: &GoogleSettings) -> Result<Self> {
        if google.client_id.is_empty() {
            return Err(anyhow!(
                "Google client id is not configured. Add one in settings first."
            ));
        }

        // Try a few ports in case 8765 is busy
        let (listener, port) = bind_callback_listener()?;
        // Drop listener — we'll re-bind the same port in authenticate().
        // The port is likely still free for the brief window.
        drop(listener);

        let client = BasicClient::new(
            ClientId::new(google.client_id.clone()),
            google.client_secret.clone().map(ClientSecret::new),
            AuthUrl::new(GOOGLE_AUTH_URL.to_string())?,
            Some(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?),
        )
        .set_redirect_uri(RedirectUrl::new(format!(
            "http://localhost:{}/callback",
            port
        ))?);

        Ok(Self { client, port })
    }

    pub async fn authenticate(&self) -> Result<StoredCredentials> {
        // PKCE, plus offline access so Google returns a refresh token.
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge)
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent");

        for scope in GOOGLE_SCOPES {
            auth_request = auth_request.add_scope(Scope::new((*scope).to_string()));
        }

        let (auth_url, csrf_token) = auth_request.url();

        tracing::info!("opening browser for Google authorization");
        if let Err(e) = open::that(auth_url.as_str()) {
            tracing::warn!("could not open browser automatically: {}", e);
            tracing::warn!("visit this URL to authorize: {}", auth_url);
        }

        // Re-bind the port we registered as redirect URI and wait for the
        // callback (with timeout).
        let listener = TcpListener::bind(format!("127.0.0.1:{}", self.port))
            .map_err(|e| anyhow!("Could not re-bind OAuth callback port {}: {}", self.port, e))?;
        listener.set_nonblocking(true)?;

        let (code, state) = receive_callback(&listener)?;

        if state != *csrf_token.secret() {
            return Err(anyhow!("CSRF token mismatch"));
        }

        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(async_http_client)
            .await?;

        Ok(StoredCredentials {
            access_token: token.access_token().secret().clone(),
            refresh_token: token.refresh_token().map(|t| t.secret().clone()),
            expires_at: token
                .expires_in()
                .map(|d| unix_now() + d.as_secs() as i64),
        })
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Try to bind a callback listener on one of several ports.
fn bind_callback_listener() -> Result<(TcpListener, u16)> {
    let ports = [8765, 8766, 8767, 18765, 28765];
    for port in ports {
        if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
            return Ok((listener, port));
        }
    }
    Err(anyhow!("Could not bind OAuth callback listener on any port"))
}

fn receive_callback(listener: &TcpListener) -> Result<(String, String)> {
    let deadline = std::time::Instant::now() + Duration::from_secs(300);

    loop {
        match listener.accept() {
            Ok((mut stream, _)) => {
                // Got a connection — set it to blocking for reading
                stream.set_nonblocking(false)?;
                stream.set_read_timeout(Some(Duration::from_secs(5)))?;

                let mut reader = BufReader::new(&stream);
                let mut request_line = String::new();
                reader.read_line(&mut request_line)?;

                let redirect_url = request_line
                    .split_whitespace()
                    .nth(1)
                    .ok_or_else(|| anyhow!("Invalid request"))?;

                let url = Url::parse(&format!("http://localhost{}", redirect_url))?;

                let code = url
                    .query_pairs()
                    .find(|(key, _)| key == "code")
                    .map(|(_, value)| value.to_string())
                    .ok_or_else(|| anyhow!("No authorization code in callback"))?;

                let state = url
                    .query_pairs()
                    .find(|(key, _)| key == "state")
                    .map(|(_, value)| value.to_string())
                    .ok_or_else(|| anyhow!("No state in callback"))?;

                let response = "HTTP/1.1 200 OK\r\n\
                               Content-Type: text/html\r\n\r\n\
                               <html><body>\
                               <h1>Authorization successful!</h1>\
                               <p>You can close this window and return to Deskmate.</p>\
                               </body></html>";
                stream.write_all(response.as_bytes())?;
                stream.flush()?;

                return Ok((code, state));
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                // Non-blocking: no connection yet, check timeout
                if std::time::Instant::now() > deadline {
                    return Err(anyhow!(
                        "Authorization timed out after 5 minutes. Please try again."
                    ));
                }
                std::thread::sleep(Duration::from_millis(200));
            }
            Err(e) => return Err(anyhow!("Failed to accept OAuth callback: {}", e)),
        }
    }
}
