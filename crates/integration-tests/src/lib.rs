//! Integration test helpers for the helpdesk server.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the server with a bootstrap admin
//! cargo run -p helpdesk-cli -- migrate
//! DEFAULT_ADMIN_NAME=Root DEFAULT_ADMIN_EMAIL=root@helpdesk.test \
//!   DEFAULT_ADMIN_PASSWORD=root-password cargo run -p helpdesk-server
//!
//! # Run the ignored HTTP tests against it
//! cargo test -p helpdesk-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `HELPDESK_BASE_URL` - Server under test (default: `http://localhost:3333`)
//! - `HELPDESK_TEST_ADMIN_EMAIL` / `HELPDESK_TEST_ADMIN_PASSWORD` - An existing
//!   admin account (defaults match the bootstrap values above)

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use helpdesk_core::{Role, UserId};

/// Base URL for the helpdesk API.
#[must_use]
pub fn base_url() -> String {
    std::env::var("HELPDESK_BASE_URL").unwrap_or_else(|_| "http://localhost:3333".to_string())
}

/// A signed-in account.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: UserId,
    pub role: Role,
    pub token: String,
}

#[derive(Deserialize)]
struct AuthBody {
    token: String,
    user: UserBody,
}

#[derive(Deserialize)]
struct UserBody {
    id: UserId,
    role: Role,
}

impl From<AuthBody> for Session {
    fn from(body: AuthBody) -> Self {
        Self {
            id: body.user.id,
            role: body.user.role,
            token: body.token,
        }
    }
}

/// Thin client over the helpdesk API.
#[derive(Debug, Clone)]
pub struct Helpdesk {
    client: Client,
    base_url: String,
}

impl Default for Helpdesk {
    fn default() -> Self {
        Self::new()
    }
}

impl Helpdesk {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url(),
        }
    }

    /// Register a fresh customer with a unique email.
    pub async fn register_customer(&self) -> Session {
        let email = format!("it-{}@customer.test", Uuid::new_v4());
        let resp = self
            .client
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&json!({
                "name": "Integration Customer",
                "email": email,
                "password": "integration-pass",
            }))
            .send()
            .await
            .expect("Failed to register customer");

        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json::<AuthBody>()
            .await
            .expect("Failed to parse register response")
            .into()
    }

    /// Sign in as the admin named by `HELPDESK_TEST_ADMIN_*`.
    pub async fn login_admin(&self) -> Session {
        let email = std::env::var("HELPDESK_TEST_ADMIN_EMAIL")
            .unwrap_or_else(|_| "root@helpdesk.test".to_string());
        let password = std::env::var("HELPDESK_TEST_ADMIN_PASSWORD")
            .unwrap_or_else(|_| "root-password".to_string());

        let resp = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to log in admin");

        assert_eq!(resp.status(), StatusCode::OK, "admin login failed");
        let session: Session = resp
            .json::<AuthBody>()
            .await
            .expect("Failed to parse login response")
            .into();
        assert_eq!(session.role, Role::Admin);
        session
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn call(
        &self,
        method: reqwest::Method,
        path: &str,
        session: Option<&Session>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(session) = session {
            request = request.bearer_auth(&session.token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let resp = request.send().await.expect("Request failed");
        let status = resp.status();
        let text = resp.text().await.expect("Failed to read response");
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        (status, value)
    }
}
