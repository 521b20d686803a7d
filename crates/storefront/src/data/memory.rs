//! In-memory collaborators for store tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;

use super::{DataError, ProductSource, UserDirectory};
use crate::models::{ProductCatalog, UserRecord};

/// A users endpoint backed by a vector.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    pub users: Arc<Mutex<Vec<UserRecord>>>,
    pub submitted: Arc<Mutex<Vec<UserRecord>>>,
    pub failing: Arc<AtomicBool>,
    pub fetches: Arc<AtomicUsize>,
}

impl MemoryDirectory {
    pub fn with_users(users: Vec<UserRecord>) -> Self {
        let directory = Self::default();
        *directory.users.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = users;
        directory
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn unavailable() -> DataError {
        DataError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, DataError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self
            .users
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    async fn submit_user(&self, user: &UserRecord) -> Result<(), DataError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.submitted
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(user.clone());
        Ok(())
    }
}

/// A products endpoint serving a fixed catalog and counting fetches.
#[derive(Clone, Default)]
pub struct MemoryProducts {
    pub catalog: ProductCatalog,
    pub fetches: Arc<AtomicUsize>,
    pub failing: Arc<AtomicBool>,
}

impl MemoryProducts {
    pub fn new(catalog: ProductCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductSource for MemoryProducts {
    async fn fetch_products(&self) -> Result<ProductCatalog, DataError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MemoryDirectory::unavailable());
        }
        Ok(self.catalog.clone())
    }
}

/// A users-endpoint record with the given credentials.
pub fn record(id: u32, email: &str, password: &str, first_name: &str, roles: &[&str]) -> UserRecord {
    UserRecord {
        id: tienda_core::UserId::new(id),
        first_name: first_name.to_string(),
        last_name: "Pérez".to_string(),
        rut: "12345678-5".to_string(),
        email: email.to_string(),
        phone: "912345678".to_string(),
        address: "Calle 1".to_string(),
        password: password.to_string(),
        roles: roles.iter().map(ToString::to_string).collect(),
    }
}
