#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use auth::JwtHandler;
use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use identity_service::credential::ports::AuthFlowPort;
use identity_service::credential::ports::Clock;
use identity_service::credential::service::AuthFlow;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::clock::SystemClock;
use identity_service::outbound::security::Argon2CredentialHasher;
use identity_service::repositories::InMemoryCredentialRepository;
use serde_json::json;

pub const ISSUER: &str = "key-stone";
pub const ACCESS_SECRET: &[u8] = b"test-access-secret-at-least-32-bytes-long";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-at-least-32-bytes-long";

/// Argon2 parameters cheap enough for tests
pub fn test_hasher() -> Argon2CredentialHasher {
    let hasher = PasswordHasher::with_params(1024, 1, 1).expect("Invalid test hash params");
    Argon2CredentialHasher::new(hasher, 4)
}

pub fn access_codec() -> JwtHandler {
    JwtHandler::new(ISSUER, ACCESS_SECRET)
}

pub fn refresh_codec() -> JwtHandler {
    JwtHandler::new(ISSUER, REFRESH_SECRET)
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn starting_epoch() -> Self {
        Self::at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub type TestAuthFlow =
    AuthFlow<InMemoryCredentialRepository, Argon2CredentialHasher, JwtHandler>;

/// Authentication flow over an in-memory store and the given clock
pub fn auth_flow_with_clock(clock: Arc<dyn Clock>) -> TestAuthFlow {
    AuthFlow::new(
        Arc::new(InMemoryCredentialRepository::new()),
        Arc::new(test_hasher()),
        Arc::new(access_codec()),
        Arc::new(refresh_codec()),
        clock,
    )
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let auth_flow: Arc<dyn AuthFlowPort> =
            Arc::new(auth_flow_with_clock(Arc::new(SystemClock)));
        let router = create_router(auth_flow);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
        }
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(format!("{}{}", self.address, path))
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.delete(path).bearer_auth(token)
    }

    pub async fn create_user(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/key-stone/users")
            .json(&json!({ "user": { "username": username, "password": password } }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn issue_token(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/key-stone/auth")
            .json(&json!({ "user": { "username": username, "password": password } }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn refresh_token(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> reqwest::Response {
        self.post("/key-stone/auth/refresh")
            .json(&json!({
                "token": { "access_token": access_token, "refresh_token": refresh_token }
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create a user and return the `data` of a fresh token response
    pub async fn create_and_login(&self, username: &str, password: &str) -> serde_json::Value {
        let response = self.create_user(username, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

        let response = self.issue_token(username, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }
}
