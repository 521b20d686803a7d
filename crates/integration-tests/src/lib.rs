//! Integration tests for Tienda.
//!
//! Drives the storefront router in-process with `tower::ServiceExt::oneshot`
//! against in-memory users and products endpoints.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tienda-integration-tests
//! ```

#![allow(clippy::unwrap_used)]

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, BodyDataStream, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use futures::StreamExt;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;

use tienda_core::UserId;
use tienda_storefront::config::{DataSourceConfig, StorefrontConfig};
use tienda_storefront::data::{DataError, ProductSource, UserDirectory};
use tienda_storefront::models::{Product, ProductCatalog, UserRecord};
use tienda_storefront::routes::build_router;
use tienda_storefront::services::PasswordPolicy;
use tienda_storefront::state::AppState;

/// Upper bound on response bodies read by tests.
const BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// In-memory endpoints
// =============================================================================

/// Users endpoint backed by a vector.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    users: Arc<Mutex<Vec<UserRecord>>>,
    submitted: Arc<Mutex<Vec<UserRecord>>>,
    offline: Arc<AtomicBool>,
}

impl FakeDirectory {
    /// A directory serving `users`.
    #[must_use]
    pub fn with_users(users: Vec<UserRecord>) -> Self {
        let directory = Self::default();
        *directory.users.lock().unwrap() = users;
        directory
    }

    /// Add a user to the served list.
    pub fn push_user(&self, user: UserRecord) {
        self.users.lock().unwrap().push(user);
    }

    /// Make every call fail with 503.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Records received through `submit_user`.
    #[must_use]
    pub fn submitted(&self) -> Vec<UserRecord> {
        self.submitted.lock().unwrap().clone()
    }

    fn check_online(&self) -> Result<(), DataError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DataError::Status {
                status: 503,
                body: "offline".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, DataError> {
        self.check_online()?;
        Ok(self
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn submit_user(&self, user: &UserRecord) -> Result<(), DataError> {
        self.check_online()?;
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(user.clone());
        Ok(())
    }
}

/// Products endpoint serving a fixed catalog.
#[derive(Clone)]
pub struct FakeProducts {
    catalog: ProductCatalog,
    fetches: Arc<AtomicUsize>,
}

impl FakeProducts {
    #[must_use]
    pub fn new(catalog: ProductCatalog) -> Self {
        Self {
            catalog,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of catalog fetches so far.
    #[must_use]
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductSource for FakeProducts {
    async fn fetch_products(&self) -> Result<ProductCatalog, DataError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.catalog.clone())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A users-endpoint record. `password` may be cleartext (legacy) or PHC.
#[must_use]
pub fn user_record(
    id: u32,
    email: &str,
    password: &str,
    first_name: &str,
    roles: &[&str],
) -> UserRecord {
    UserRecord {
        id: UserId::new(id),
        first_name: first_name.to_string(),
        last_name: "Pérez".to_string(),
        rut: "12345678-5".to_string(),
        email: email.to_string(),
        phone: "912345678".to_string(),
        address: "Av. Providencia 1234".to_string(),
        password: password.to_string(),
        roles: roles.iter().map(ToString::to_string).collect(),
    }
}

/// Directory with one customer (`a@b.com` / `x`) and one admin
/// (`admin@b.com` / `Admin123`).
#[must_use]
pub fn seeded_directory() -> FakeDirectory {
    FakeDirectory::with_users(vec![
        user_record(1, "a@b.com", "x", "Ana", &["customer"]),
        user_record(2, "admin@b.com", "Admin123", "Benito", &["customer", "admin"]),
    ])
}

/// A product priced in whole pesos.
#[must_use]
pub fn product(name: &str, price: i64, rating: f64) -> Product {
    Product::new(name, Decimal::from(price), rating)
}

/// Seven notebooks, two air conditioners and an empty category.
#[must_use]
pub fn sample_catalog() -> ProductCatalog {
    let notebooks = (1_i64..=7)
        .map(|i| product(&format!("Notebook {i}"), 499_990 + i * 100_000, 4.0))
        .collect();
    let air = vec![
        product("Split 9000 BTU", 299_990, 3.0),
        product("Split 12000 BTU", 349_990, 5.0),
    ];
    [
        ("notebooks".to_string(), notebooks),
        ("air-conditioning".to_string(), air),
        ("outlet".to_string(), Vec::new()),
    ]
    .into_iter()
    .collect()
}

/// Configuration pointing at addresses that are never contacted.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        data: DataSourceConfig {
            products_url: Url::parse("http://127.0.0.1:9/products.json").unwrap(),
            users_url: Url::parse("http://127.0.0.1:9/users.json").unwrap(),
            api_token: SecretString::from("2d4b8422-c7f4-4b1d-8b73-439bba7af688"),
            timeout: Duration::from_secs(1),
        },
        catalog_ttl: Duration::from_secs(300),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

// =============================================================================
// Test application
// =============================================================================

/// A storefront wired to in-memory endpoints.
pub struct TestApp {
    pub state: AppState,
    pub directory: FakeDirectory,
    pub products: FakeProducts,
}

/// A parsed response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

impl TestApp {
    /// App over the seeded directory and sample catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with(seeded_directory(), FakeProducts::new(sample_catalog()))
    }

    #[must_use]
    pub fn with(directory: FakeDirectory, products: FakeProducts) -> Self {
        let state = AppState::from_parts(
            test_config(),
            Arc::new(directory.clone()),
            Arc::new(products.clone()),
            PasswordPolicy::insecure_fast(),
        );
        Self {
            state,
            directory,
            products,
        }
    }

    /// A fresh router over this app's state.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Send a request with an optional JSON body and parse the response.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            location,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post("/auth/login", json!({ "email": email, "password": password }))
            .await
    }

    pub async fn add_to_cart(&self, product: &Product) -> TestResponse {
        self.post("/cart/items", serde_json::to_value(product).unwrap())
            .await
    }

    /// Open an SSE endpoint.
    pub async fn open_sse(&self, uri: &str) -> SseReader {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        SseReader {
            data: response.into_body().into_data_stream(),
            buffer: String::new(),
        }
    }
}

/// Reads Server-Sent Events frames from a response body.
pub struct SseReader {
    data: BodyDataStream,
    buffer: String,
}

impl SseReader {
    /// The next event frame, skipping keep-alive comments.
    pub async fn next_frame(&mut self) -> String {
        loop {
            while let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                if !frame.starts_with(':') {
                    return frame.trim_end().to_string();
                }
            }
            let chunk = tokio::time::timeout(Duration::from_secs(5), self.data.next())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }

    /// The `data:` payload of the next event.
    pub async fn next_data(&mut self) -> String {
        frame_data(&self.next_frame().await).to_string()
    }

    /// Whether another event arrives within `wait`.
    pub async fn has_event_within(&mut self, wait: Duration) -> bool {
        tokio::time::timeout(wait, self.next_frame()).await.is_ok()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// The `data:` payload of an SSE frame.
#[must_use]
pub fn frame_data(frame: &str) -> &str {
    frame
        .lines()
        .find_map(|line| line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")))
        .unwrap_or_default()
}
