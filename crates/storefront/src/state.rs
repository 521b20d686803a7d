//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::data::{DataError, HttpDataClient, ProductSource, UserDirectory};
use crate::services::{CartStore, CatalogService, PasswordPolicy, SessionStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The stores inside it are the
/// single process-wide instances; tests build their own with
/// [`AppState::from_parts`] and reset them through [`AppState::reset`].
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    session: SessionStore,
    cart: CartStore,
    catalog: CatalogService,
}

impl AppState {
    /// Create the application state backed by the configured HTTP endpoints.
    ///
    /// # Errors
    ///
    /// Returns `DataError` if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, DataError> {
        let client = HttpDataClient::new(&config.data)?;
        Ok(Self::from_parts(
            config,
            Arc::new(client.clone()),
            Arc::new(client),
            PasswordPolicy::default(),
        ))
    }

    /// Create the application state from explicit collaborators.
    #[must_use]
    pub fn from_parts(
        config: StorefrontConfig,
        directory: Arc<dyn UserDirectory>,
        products: Arc<dyn ProductSource>,
        passwords: PasswordPolicy,
    ) -> Self {
        let catalog = CatalogService::new(products, config.catalog_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                session: SessionStore::new(directory, passwords),
                cart: CartStore::new(),
                catalog,
                config,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// The cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// The catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Return every store to its initial state.
    pub async fn reset(&self) {
        self.inner.session.reset();
        self.inner.cart.reset();
        self.inner.catalog.invalidate().await;
    }
}
