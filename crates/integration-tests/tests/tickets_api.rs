//! HTTP tests for the ticket workflow against a running server.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (hd-cli migrate)
//! - The helpdesk server running with at least one admin
//!
//! Run with: cargo test -p helpdesk-integration-tests -- --ignored

use reqwest::{Method, StatusCode};
use serde_json::json;

use helpdesk_integration_tests::Helpdesk;

#[tokio::test]
#[ignore = "Requires running helpdesk server"]
async fn test_health() {
    let api = Helpdesk::new();

    let (status, _) = api.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = api.call(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running helpdesk server"]
async fn test_customer_ticket_lifecycle() {
    let api = Helpdesk::new();
    let customer = api.register_customer().await;

    let (status, created) = api
        .call(
            Method::POST,
            "/api/tickets",
            Some(&customer),
            Some(json!({ "subject": "Integration", "description": "End to end" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "OPEN");
    assert!(created["adminId"].is_i64());
    assert!(created["admin"]["email"].is_string());

    let (status, listed) = api
        .call(Method::GET, "/api/tickets", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().expect("array");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed.first().expect("ticket")["id"], created["id"]);

    let path = format!("/api/tickets/{}", created["id"]);
    let (status, updated) = api
        .call(
            Method::PATCH,
            &path,
            Some(&customer),
            Some(json!({ "status": "CLOSED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "CLOSED");
    assert_eq!(updated["adminId"], created["adminId"]);

    let (status, _) = api.call(Method::DELETE, &path, Some(&customer), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running helpdesk server with a bootstrap admin"]
async fn test_admin_sees_all_and_takes_over_on_update() {
    let api = Helpdesk::new();
    let admin = api.login_admin().await;
    let customer = api.register_customer().await;

    let (_, created) = api
        .call(
            Method::POST,
            "/api/tickets",
            Some(&customer),
            Some(json!({ "subject": "Needs an admin", "description": "Please" })),
        )
        .await;

    let (status, all) = api.call(Method::GET, "/api/tickets", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        all.as_array()
            .expect("array")
            .iter()
            .any(|t| t["id"] == created["id"])
    );

    let path = format!("/api/tickets/{}", created["id"]);
    let (status, updated) = api
        .call(
            Method::PATCH,
            &path,
            Some(&admin),
            Some(json!({ "status": "RESOLVED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["adminId"], admin.id.as_i32());

    let (status, body) = api
        .call(
            Method::POST,
            "/api/tickets",
            Some(&admin),
            Some(json!({ "subject": "Nope", "description": "Admins can't file" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only customers can create tickets");

    api.call(Method::DELETE, &path, Some(&admin), None).await;
}

#[tokio::test]
#[ignore = "Requires running helpdesk server"]
async fn test_rejects_missing_token() {
    let api = Helpdesk::new();
    let (status, body) = api.call(Method::GET, "/api/tickets", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}
