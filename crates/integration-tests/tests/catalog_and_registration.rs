//! Integration tests for catalog listings and user registration.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use tienda_integration_tests::TestApp;
use tienda_storefront::services::PasswordPolicy;

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_whole_catalog() {
    let app = TestApp::new();

    let response = app.get("/catalog").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["notebooks"].as_array().unwrap().len(), 7);
    assert_eq!(response.body["outlet"], json!([]));
}

#[tokio::test]
async fn test_category_rows_default_to_three_columns() {
    let app = TestApp::new();

    let response = app.get("/catalog/notebooks").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["category"], "notebooks");

    let lengths: Vec<usize> = response.body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row.as_array().unwrap().len())
        .collect();
    assert_eq!(lengths, [3, 3, 1]);
}

#[tokio::test]
async fn test_category_rows_carry_display_fields() {
    let app = TestApp::new();

    let response = app.get("/catalog/air-conditioning?columns=1").await;
    let rows = response.body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);

    let split = &rows[1][0];
    assert_eq!(split["name"], "Split 12000 BTU");
    assert_eq!(split["formattedPrice"], "$349.990");
    assert_eq!(split["stars"], json!([true, true, true, true, true]));
}

#[tokio::test]
async fn test_unknown_category_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/catalog/phones").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_zero_columns_is_bad_request() {
    let app = TestApp::new();
    let response = app.get("/catalog/notebooks?columns=0").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_is_fetched_once_within_ttl() {
    let app = TestApp::new();

    app.get("/catalog").await;
    app.get("/catalog/notebooks").await;
    app.get("/catalog/outlet").await;
    assert_eq!(app.products.fetches(), 1);

    app.state.reset().await;
    app.get("/catalog").await;
    assert_eq!(app.products.fetches(), 2);
}

// =============================================================================
// Registration
// =============================================================================

fn registration(email: &str) -> Value {
    json!({
        "firstName": "Carla",
        "lastName": "Soto",
        "rut": "12.345.678-5",
        "email": email,
        "phone": "987654321",
        "address": "Los Aromos 55",
        "password": "Secret1",
        "role": "customer"
    })
}

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new();

    let response = app.post("/auth/register", registration("carla@b.com")).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["id"], 3);
    assert_eq!(response.body["rut"], "12345678-5");
    assert!(response.body.get("password").is_none());

    let login = app.login("carla@b.com", "Secret1").await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["displayName"], "Carla");
    assert_eq!(login.body["role"], "customer");
}

#[tokio::test]
async fn test_registration_submits_hashed_password() {
    let app = TestApp::new();
    app.post("/auth/register", registration("carla@b.com")).await;

    let submitted = app.directory.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].email, "carla@b.com");
    assert!(PasswordPolicy::is_digest(&submitted[0].password));
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = TestApp::new();

    let response = app.post("/auth/register", registration("a@b.com")).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(app.directory.submitted().is_empty());
}

#[tokio::test]
async fn test_invalid_registrations_are_bad_requests() {
    let app = TestApp::new();

    let mut weak = registration("weak@b.com");
    weak["password"] = json!("short");
    let mut bad_rut = registration("rut@b.com");
    bad_rut["rut"] = json!("12.345.678-0");
    let mut bad_role = registration("role@b.com");
    bad_role["role"] = json!("owner");
    let bad_email = registration("not-an-email");

    for body in [weak, bad_rut, bad_role, bad_email] {
        let response = app.post("/auth/register", body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body["error"].is_string());
    }
    assert!(app.directory.submitted().is_empty());
}

#[tokio::test]
async fn test_submit_failure_is_bad_gateway_but_user_can_log_in() {
    let app = TestApp::new();
    app.state.session().load_directory().await.unwrap();
    app.directory.set_offline(true);

    let response = app.post("/auth/register", registration("carla@b.com")).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "External service error");

    let login = app.login("carla@b.com", "Secret1").await;
    assert_eq!(login.status, StatusCode::OK);
}
