//! End-to-end router tests against the in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use std::collections::HashMap;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

fn ticket_body(subject: &str) -> serde_json::Value {
    json!({ "subject": subject, "description": "Details about the problem" })
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = TestApp::new();

    let response = app.raw("GET", "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let (status, _) = app.send("GET", "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn upstream_request_id_is_echoed() {
    let app = TestApp::new();
    let request = axum::http::Request::builder()
        .uri("/health")
        .header("x-request-id", "edge-1234")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "edge-1234");
}

#[tokio::test]
async fn register_and_login_round_trip() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Dana",
                "email": "Dana@Example.com",
                "password": "longenough",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "dana@example.com");
    assert_eq!(body["user"]["role"], "CUSTOMER");
    assert!(body["token"].as_str().unwrap().len() > 20);
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "dana@example.com", "password": "longenough" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Dana");
}

#[tokio::test]
async fn register_rejects_duplicates_and_bad_input() {
    let app = TestApp::new();
    app.customer("Eve").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Eve Two",
                "email": "eve@customer.test",
                "password": "whatever123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "Short", "email": "s@x.io", "password": "123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_registration_depends_on_config() {
    let body = json!({
        "name": "Root",
        "email": "root@staff.test",
        "password": "rootpassword",
        "role": "ADMIN",
    });

    let closed = TestApp::new();
    let (status, resp) = closed
        .send("POST", "/api/auth/register", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(resp["message"], "Registering as an admin is disabled");

    let open = TestApp::with_admin_signup(true);
    let (status, resp) = open
        .send("POST", "/api/auth/register", None, Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["user"]["role"], "ADMIN");
}

#[tokio::test]
async fn bad_login_is_unauthorized() {
    let app = TestApp::new();
    app.customer("Finn").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "finn@customer.test", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn ticket_routes_require_a_token() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/api/tickets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = app
        .send("GET", "/api/tickets", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_without_admins_is_unavailable() {
    let app = TestApp::new();
    let (_, token) = app.customer("Gus").await;

    let (status, body) = app
        .send("POST", "/api/tickets", Some(&token), Some(ticket_body("Help")))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "No admin available");

    let (_, list) = app.send("GET", "/api/tickets", Some(&token), None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn admins_cannot_create_tickets() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin("Hal").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/tickets",
            Some(&admin_token),
            Some(ticket_body("Self-assigned")),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only customers can create tickets");
}

#[tokio::test]
async fn created_ticket_includes_parties() {
    let app = TestApp::new();
    let (admin_id, _) = app.admin("Ivy").await;
    let (customer_id, token) = app.customer("Jon").await;

    let (status, body) = app
        .send("POST", "/api/tickets", Some(&token), Some(ticket_body("VPN down")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["subject"], "VPN down");
    assert_eq!(body["status"], "OPEN");
    assert_eq!(body["customerId"], customer_id.as_i32());
    assert_eq!(body["adminId"], admin_id.as_i32());
    assert_eq!(body["admin"], json!({ "name": "Ivy", "email": "ivy@staff.test" }));
    assert_eq!(body["customer"]["name"], "Jon");
}

#[tokio::test]
async fn assignments_are_spread_across_admins() {
    let app = TestApp::new();
    let mut admin_ids = Vec::new();
    for name in ["Kim", "Lou", "Max", "Ned"] {
        admin_ids.push(app.admin(name).await.0.as_i32());
    }
    let (_, token) = app.customer("Ola").await;

    let mut per_admin: HashMap<i64, usize> = HashMap::new();
    for i in 0..12 {
        let (status, body) = app
            .send(
                "POST",
                "/api/tickets",
                Some(&token),
                Some(ticket_body(&format!("Issue {i}"))),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        *per_admin.entry(body["adminId"].as_i64().unwrap()).or_default() += 1;
    }

    assert_eq!(per_admin.len(), admin_ids.len());
    assert!(per_admin.values().all(|&count| count == 3));
}

#[tokio::test]
async fn listing_is_scoped_by_role() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin("Pam").await;
    let (_, first) = app.customer("Quin").await;
    let (_, second) = app.customer("Rae").await;

    app.send("POST", "/api/tickets", Some(&first), Some(ticket_body("A")))
        .await;
    app.send("POST", "/api/tickets", Some(&second), Some(ticket_body("B")))
        .await;

    let (status, all) = app
        .send("GET", "/api/tickets", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, own) = app.send("GET", "/api/tickets", Some(&first), None).await;
    let own = own.as_array().unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["subject"], "A");
}

#[tokio::test]
async fn admin_update_takes_over_ticket() {
    let app = TestApp::new();
    let (first_admin, _) = app.admin("Sam").await;
    let (_, token) = app.customer("Tia").await;
    let (_, created) = app
        .send("POST", "/api/tickets", Some(&token), Some(ticket_body("Slow")))
        .await;
    assert_eq!(created["adminId"], first_admin.as_i32());

    let (second_admin, second_token) = app.admin("Uma").await;
    let uri = format!("/api/tickets/{}", created["id"]);
    let (status, body) = app
        .send(
            "PATCH",
            &uri,
            Some(&second_token),
            Some(json!({ "status": "RESOLVED" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "RESOLVED");
    assert_eq!(body["adminId"], second_admin.as_i32());
    assert_eq!(body["subject"], "Slow");
}

#[tokio::test]
async fn customers_only_touch_their_own_tickets() {
    let app = TestApp::new();
    app.admin("Vic").await;
    let (_, owner) = app.customer("Wes").await;
    let (_, other) = app.customer("Xia").await;
    let (_, created) = app
        .send("POST", "/api/tickets", Some(&owner), Some(ticket_body("Mine")))
        .await;
    let uri = format!("/api/tickets/{}", created["id"]);

    let (status, body) = app
        .send("PATCH", &uri, Some(&other), Some(json!({ "subject": "Hijacked" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");

    let (status, _) = app.send("DELETE", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send("PATCH", &uri, Some(&owner), Some(json!({ "subject": "Still mine" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "Still mine");
}

#[tokio::test]
async fn delete_returns_no_content_then_not_found() {
    let app = TestApp::new();
    let (_, admin_token) = app.admin("Yul").await;
    let (_, token) = app.customer("Zed").await;
    let (_, created) = app
        .send("POST", "/api/tickets", Some(&token), Some(ticket_body("Remove me")))
        .await;
    let uri = format!("/api/tickets/{}", created["id"]);

    let response = app.raw("DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, body) = app.send("DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Ticket not found");

    let (status, _) = app
        .send("PATCH", &uri, Some(&admin_token), Some(json!({ "status": "CLOSED" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
