//! Integration tests for Fintrack server.
//!
//! These tests drive the HTTP API end to end: registration, login and
//! bearer-token access to protected routes.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use fintrack_api::AppState;
use fintrack_auth::{RepositoryCredentialStore, TokenConfig, TokenService};
use fintrack_storage_sqlite::SqliteBackend;

/// Signing key shared by every test server.
pub const TEST_SIGNING_KEY: &str = "ZmludHJhY2staW50ZWdyYXRpb24tdGVzdC1rZXktMDEyMzQ1Njc4OWFiY2RlZg==";

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub display_name: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalResponse {
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub authorities: Vec<String>,
}

// ============================================================================
// Test Server
// ============================================================================

/// An in-process server bound to an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by in-memory storage.
    pub async fn start() -> Result<Self> {
        let backend = SqliteBackend::in_memory()
            .await
            .context("Failed to open in-memory storage")?;
        Self::serve(backend, TokenConfig::new(TEST_SIGNING_KEY, 86_400_000)).await
    }

    /// Start a server whose database lives in `data_dir`.
    pub async fn start_with_data_dir(data_dir: &Path) -> Result<Self> {
        let backend = SqliteBackend::open(data_dir)
            .await
            .with_context(|| format!("Failed to open storage in {}", data_dir.display()))?;
        Self::serve(backend, TokenConfig::new(TEST_SIGNING_KEY, 86_400_000)).await
    }

    async fn serve(backend: SqliteBackend, config: TokenConfig) -> Result<Self> {
        let tokens = Arc::new(TokenService::new(&config)?);
        let store = Arc::new(RepositoryCredentialStore::new(backend));
        let app = fintrack_api::router(AppState::new(tokens, store));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            addr,
            shutdown: Some(tx),
            handle,
        })
    }

    /// Stop the server and wait for it to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }

    /// Get a configured HTTP client for this server.
    pub fn client(&self) -> FintrackClient {
        FintrackClient::new(&self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}

/// Mint a token with the test key and an arbitrary lifetime.
pub fn token_for(email: &str, ttl_millis: i64) -> Result<String> {
    let tokens = TokenService::new(&TokenConfig::new(TEST_SIGNING_KEY, ttl_millis))?;
    let identity = fintrack_auth::Identity::new(email, "Test User", "", fintrack_auth::Role::User);
    Ok(tokens.generate_token(&identity)?)
}

// ============================================================================
// Test Client
// ============================================================================

/// HTTP client for testing the Fintrack API.
pub struct FintrackClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl FintrackClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.json().await?)
    }

    /// Send a registration request and return the raw response.
    pub async fn register_raw(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<Response> {
        let req = RegisterRequest {
            email,
            display_name,
            password,
        };
        Ok(self
            .client
            .post(self.url("/api/auth/register"))
            .json(&req)
            .send()
            .await?)
    }

    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &str,
    ) -> Result<AuthResponse> {
        let resp = self.register_raw(email, display_name, password).await?;
        let status = resp.status();
        if !status.is_success() {
            bail!("Register failed ({}): {}", status, resp.text().await?);
        }
        Ok(resp.json().await?)
    }

    /// Send a login request and return the raw response.
    pub async fn login_raw(&self, email: &str, password: &str) -> Result<Response> {
        let req = LoginRequest { email, password };
        Ok(self
            .client
            .post(self.url("/api/auth/login"))
            .json(&req)
            .send()
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let resp = self.login_raw(email, password).await?;
        let status = resp.status();
        if !status.is_success() {
            bail!("Login failed ({}): {}", status, resp.text().await?);
        }
        Ok(resp.json().await?)
    }

    /// Fetch the current principal and return the raw response.
    pub async fn me_raw(&self) -> Result<Response> {
        let mut req = self.client.get(self.url("/api/auth/me"));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    pub async fn me(&self) -> Result<PrincipalResponse> {
        let resp = self.me_raw().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            bail!("Me failed ({}): {}", status, resp.text().await?);
        }
        Ok(resp.json().await?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_server_health() {
        let server = TestServer::start().await.unwrap();

        let health = server.client().health().await.unwrap();

        assert_eq!(health.status, "ok");
        assert!(!health.version.is_empty());
    }

    #[tokio::test]
    async fn test_register_login_me_workflow() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        // 1. Register
        let registered = client
            .register("alice@example.com", "Alice", "password123")
            .await
            .unwrap();
        assert_eq!(registered.email, "alice@example.com");
        assert_eq!(registered.display_name, "Alice");
        assert!(!registered.token.is_empty());

        // 2. The registration token already grants access
        let me = server
            .client()
            .with_token(&registered.token)
            .me()
            .await
            .unwrap();
        assert_eq!(me.email, "alice@example.com");

        // 3. Login issues a fresh token
        let logged_in = client.login("alice@example.com", "password123").await.unwrap();
        assert_eq!(logged_in.display_name, "Alice");

        // 4. Use it on a protected route
        let me = server
            .client()
            .with_token(&logged_in.token)
            .me()
            .await
            .unwrap();
        assert_eq!(me.display_name, "Alice");
        assert_eq!(me.role, "USER");
        assert_eq!(me.authorities, vec!["ROLE_USER".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        client
            .register("bob@example.com", "Bob", "password123")
            .await
            .unwrap();

        let resp = client
            .register_raw("bob@example.com", "Bobby", "password456")
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // The original account is untouched
        let logged_in = client.login("bob@example.com", "password123").await.unwrap();
        assert_eq!(logged_in.display_name, "Bob");
    }

    #[tokio::test]
    async fn test_registration_validation() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        let resp = client.register_raw("not-an-email", "Carol", "pw").await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = resp.json().await.unwrap();
        assert!(body.get("email").is_some());
        assert!(body.get("password").is_some());
        assert!(body.get("displayName").is_none());
    }

    #[tokio::test]
    async fn test_login_rejections() {
        let server = TestServer::start().await.unwrap();
        let client = server.client();

        client
            .register("dave@example.com", "Dave", "password123")
            .await
            .unwrap();

        let unknown = client
            .login_raw("nobody@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

        let wrong = client
            .login_raw("dave@example.com", "wrongpassword")
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_authentication_required() {
        let server = TestServer::start().await.unwrap();

        let resp = server.client().me_raw().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let server = TestServer::start().await.unwrap();

        let resp = server
            .client()
            .with_token("invalid-token")
            .me_raw()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let server = TestServer::start().await.unwrap();
        server
            .client()
            .register("erin@example.com", "Erin", "password123")
            .await
            .unwrap();

        let expired = token_for("erin@example.com", -1000).unwrap();
        let resp = server.client().with_token(&expired).me_raw().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let fresh = token_for("erin@example.com", 60_000).unwrap();
        let me = server.client().with_token(&fresh).me().await.unwrap();
        assert_eq!(me.email, "erin@example.com");
    }

    #[tokio::test]
    async fn test_token_for_unknown_identity_rejected() {
        let server = TestServer::start().await.unwrap();

        let token = token_for("ghost@example.com", 60_000).unwrap();
        let resp = server.client().with_token(&token).me_raw().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_identities_survive_restart() {
        let data_dir = TempDir::new().unwrap();

        let server = TestServer::start_with_data_dir(data_dir.path()).await.unwrap();
        let registered = server
            .client()
            .register("frank@example.com", "Frank", "password123")
            .await
            .unwrap();
        server.stop().await;

        let server = TestServer::start_with_data_dir(data_dir.path()).await.unwrap();
        let logged_in = server
            .client()
            .login("frank@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(logged_in.display_name, "Frank");

        // Tokens issued before the restart are still honored
        let me = server
            .client()
            .with_token(&registered.token)
            .me()
            .await
            .unwrap();
        assert_eq!(me.email, "frank@example.com");
    }
}
