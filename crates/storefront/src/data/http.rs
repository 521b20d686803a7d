//! HTTP implementation of the data collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::{DataError, ProductSource, UserDirectory};
use crate::config::DataSourceConfig;
use crate::models::{ProductCatalog, UserRecord};

/// How much of an error body is kept for logs and error values.
const BODY_SNIPPET_CHARS: usize = 200;

/// Client for the products and users endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpDataClient {
    inner: Arc<HttpDataClientInner>,
}

struct HttpDataClientInner {
    client: reqwest::Client,
    products_url: Url,
    users_url: Url,
    api_token: SecretString,
}

impl HttpDataClient {
    /// Create a client for the configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns `DataError::Http` if the underlying HTTP client cannot be
    /// built (e.g. TLS backend initialisation failure).
    pub fn new(config: &DataSourceConfig) -> Result<Self, DataError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(HttpDataClientInner {
                client,
                products_url: config.products_url.clone(),
                users_url: config.users_url.clone(),
                api_token: config.api_token.clone(),
            }),
        })
    }

    /// GET `url` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, DataError> {
        let response = self
            .inner
            .client
            .get(url.clone())
            .bearer_auth(self.inner.api_token.expose_secret())
            .send()
            .await?;

        let body = read_success_body(response).await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %snippet(&body),
                "Failed to parse data endpoint response"
            );
            DataError::Parse(e)
        })
    }
}

/// Read the body, turning non-success statuses into `DataError::Status`.
async fn read_success_body(response: reqwest::Response) -> Result<String, DataError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %snippet(&body),
            "Data endpoint returned non-success status"
        );
        return Err(DataError::Status {
            status: status.as_u16(),
            body: snippet(&body),
        });
    }

    Ok(body)
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[async_trait]
impl UserDirectory for HttpDataClient {
    #[instrument(skip(self), fields(url = %self.inner.users_url))]
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, DataError> {
        let users: Vec<UserRecord> = self.get_json(&self.inner.users_url).await?;
        tracing::debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    #[instrument(skip(self, user), fields(url = %self.inner.users_url, user_id = %user.id))]
    async fn submit_user(&self, user: &UserRecord) -> Result<(), DataError> {
        let response = self
            .inner
            .client
            .post(self.inner.users_url.clone())
            .bearer_auth(self.inner.api_token.expose_secret())
            .json(user)
            .send()
            .await?;

        read_success_body(response).await?;
        tracing::info!("Submitted new user");
        Ok(())
    }
}

#[async_trait]
impl ProductSource for HttpDataClient {
    #[instrument(skip(self), fields(url = %self.inner.products_url))]
    async fn fetch_products(&self) -> Result<ProductCatalog, DataError> {
        let catalog: ProductCatalog = self.get_json(&self.inner.products_url).await?;
        tracing::debug!(products = catalog.len(), "Fetched catalog");
        Ok(catalog)
    }
}
