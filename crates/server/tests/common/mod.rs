#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use argon2::Params;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use chrono::TimeDelta;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use helpdesk_core::{Role, UserId};
use helpdesk_server::config::{AuthConfig, HelpdeskConfig};
use helpdesk_server::db::MemoryStore;
use helpdesk_server::routes;
use helpdesk_server::services::auth::{Argon2Hasher, JwtTokenService, TokenService, create_account};
use helpdesk_server::state::AppState;

pub const JWT_SECRET: &str = "router-test-signing-key-9f8e7d6c5b4a";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    hasher: Argon2Hasher,
    tokens: Arc<JwtTokenService>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_admin_signup(false)
    }

    pub fn with_admin_signup(allow_admin_signup: bool) -> Self {
        let config = HelpdeskConfig {
            database_url: SecretString::from("postgres://unused"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            auth: AuthConfig {
                jwt_secret: SecretString::from(JWT_SECRET),
                token_ttl: TimeDelta::hours(24),
                allow_admin_signup,
            },
            log_json: false,
            default_admin: None,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let store = Arc::new(MemoryStore::new());
        let hasher = Argon2Hasher::new(Params::new(8, 1, 1, None).unwrap());
        let tokens = Arc::new(JwtTokenService::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl,
        ));
        let state = AppState::from_parts(
            config,
            store.clone(),
            Arc::new(hasher.clone()),
            tokens.clone(),
        );

        Self {
            router: routes::app(state),
            store,
            hasher,
            tokens,
        }
    }

    /// Insert an admin directly and return a bearer token for them.
    pub async fn admin(&self, name: &str) -> (UserId, String) {
        let email = format!("{}@staff.test", name.to_lowercase());
        let user = create_account(
            self.store.as_ref(),
            &self.hasher,
            name,
            &email,
            "admin-password",
            Role::Admin,
        )
        .await
        .unwrap();
        let token = self.tokens.issue(user.id, user.role).unwrap();
        (user.id, token)
    }

    /// Register a customer through the API and return their id and token.
    pub async fn customer(&self, name: &str) -> (UserId, String) {
        let email = format!("{}@customer.test", name.to_lowercase());
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/register",
                None,
                Some(serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": "customer-password",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        let id = UserId::new(i32::try_from(body["user"]["id"].as_i64().unwrap()).unwrap());
        (id, body["token"].as_str().unwrap().to_owned())
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.raw(method, uri, token, body).await;
        let status = response.status();
        (status, read_json(response).await)
    }

    pub async fn raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.router.clone().oneshot(request).await.expect("response")
    }
}

/// Read a JSON body; empty bodies read as `null`.
pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}
