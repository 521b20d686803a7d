//! Data endpoints consumed by the stores.
//!
//! # Architecture
//!
//! - The products endpoint serves the catalog grouped by category
//! - The users endpoint serves the directory and accepts new users
//! - The remote side is the source of truth; the stores only cache it
//!
//! The stores depend on the [`UserDirectory`] and [`ProductSource`] traits,
//! not on HTTP, so they can run against in-memory collaborators in tests.
//! [`HttpDataClient`] is the production implementation.

mod http;
#[cfg(test)]
pub(crate) mod memory;

pub use http::HttpDataClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ProductCatalog, UserRecord};

/// Errors that can occur when talking to the data endpoints.
#[derive(Debug, Error)]
pub enum DataError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of directory users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch every known user.
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, DataError>;

    /// Persist a newly registered user.
    async fn submit_user(&self, user: &UserRecord) -> Result<(), DataError>;
}

/// Source of the product catalog.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetch the whole catalog.
    async fn fetch_products(&self) -> Result<ProductCatalog, DataError>;
}
