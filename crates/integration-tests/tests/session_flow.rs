//! Integration tests for login, logout and the session feed.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde_json::Value;

use tienda_integration_tests::{TestApp, product, user_record};

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_returns_session() {
    let app = TestApp::new();

    let response = app.login("a@b.com", "x").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["isAuthenticated"], true);
    assert_eq!(response.body["displayName"], "Ana");
    assert_eq!(response.body["role"], "customer");
    assert_eq!(response.body["currentUser"]["email"], "a@b.com");
    assert!(response.body["loggedInAt"].is_string());
}

#[tokio::test]
async fn test_admin_tag_yields_admin_role() {
    let app = TestApp::new();

    let response = app.login("admin@b.com", "Admin123").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["role"], "admin");
    assert_eq!(response.body["displayName"], "Benito");
}

#[tokio::test]
async fn test_wrong_password_is_rejected_without_state_change() {
    let app = TestApp::new();

    let response = app.login("a@b.com", "wrong").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Invalid credentials");

    let session = app.get("/auth/session").await;
    assert_eq!(session.body["isAuthenticated"], false);
    assert_eq!(session.body["displayName"], Value::Null);
    assert_eq!(session.body["role"], Value::Null);
    assert_eq!(session.body["currentUser"], Value::Null);
}

#[tokio::test]
async fn test_unknown_email_is_rejected() {
    let app = TestApp::new();

    let response = app.login("nobody@b.com", "x").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_without_password_is_bad_request() {
    let app = TestApp::new();

    let response = app.post("/auth/login", serde_json::json!({ "email": "a@b.com" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
    assert!(!app.state.session().is_authenticated());
}

#[tokio::test]
async fn test_session_is_shared_by_every_client() {
    let app = TestApp::new();
    app.login("a@b.com", "x").await;

    // Each request goes through a fresh router and carries no cookies.
    let session = app.get("/auth/session").await;
    assert_eq!(session.body["displayName"], "Ana");

    let cart = app.add_to_cart(&product("Notebook 1", 599_990, 4.0)).await;
    assert_eq!(cart.body["totalQuantity"], 1);
    assert_eq!(app.get("/cart").await.body["totalQuantity"], 1);
}

#[tokio::test]
async fn test_session_never_exposes_password() {
    let app = TestApp::new();

    let response = app.login("a@b.com", "x").await;
    let user = response.body["currentUser"].as_object().unwrap();
    assert!(!user.contains_key("password"));
}

#[tokio::test]
async fn test_login_sees_users_added_after_startup() {
    let app = TestApp::new();
    app.state.session().load_directory().await.unwrap();

    app.directory
        .push_user(user_record(3, "late@b.com", "Tarde123", "Tomás", &[]));

    let response = app.login("late@b.com", "Tarde123").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["displayName"], "Tomás");
}

#[tokio::test]
async fn test_login_uses_cache_when_directory_offline() {
    let app = TestApp::new();
    app.state.session().load_directory().await.unwrap();
    app.directory.set_offline(true);

    let response = app.login("a@b.com", "x").await;
    assert_eq!(response.status, StatusCode::OK);
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_redirects_to_login_and_clears_session() {
    let app = TestApp::new();
    app.login("a@b.com", "x").await;

    let response = app.request(Method::POST, "/auth/logout", None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login"));

    let session = app.get("/auth/session").await;
    assert_eq!(session.body["isAuthenticated"], false);
    assert_eq!(session.body["displayName"], Value::Null);
    assert_eq!(session.body["role"], Value::Null);
    assert_eq!(session.body["currentUser"], Value::Null);
    assert_eq!(session.body["loggedInAt"], Value::Null);
}

#[tokio::test]
async fn test_logout_when_logged_out_is_harmless() {
    let app = TestApp::new();

    let response = app.request(Method::POST, "/auth/logout", None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(!app.state.session().is_authenticated());
}

#[tokio::test]
async fn test_logout_keeps_cart() {
    let app = TestApp::new();
    app.login("a@b.com", "x").await;
    app.add_to_cart(&product("Notebook 1", 599_990, 4.0))
        .await;

    app.request(Method::POST, "/auth/logout", None).await;

    let cart = app.get("/cart").await;
    assert_eq!(cart.body["totalQuantity"], 1);
}

// =============================================================================
// Session feed
// =============================================================================

#[tokio::test]
async fn test_session_stream_replays_then_follows() {
    let app = TestApp::new();
    app.login("a@b.com", "x").await;

    let mut feed = app.open_sse("/auth/session/stream").await;
    let first: Value = serde_json::from_str(&feed.next_data().await).unwrap();
    assert_eq!(first["displayName"], "Ana");

    app.request(Method::POST, "/auth/logout", None).await;
    let second: Value = serde_json::from_str(&feed.next_data().await).unwrap();
    assert_eq!(second["isAuthenticated"], false);

    assert!(!feed.has_event_within(Duration::from_millis(100)).await);
}

#[tokio::test]
async fn test_failed_login_publishes_nothing() {
    let app = TestApp::new();
    let mut feed = app.open_sse("/auth/session/stream").await;
    let first: Value = serde_json::from_str(&feed.next_data().await).unwrap();
    assert_eq!(first["isAuthenticated"], false);

    app.login("a@b.com", "wrong").await;
    assert!(!feed.has_event_within(Duration::from_millis(100)).await);
}
