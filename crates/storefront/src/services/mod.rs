//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Session store, directory cache and password handling
//! - `cart` - Cart line items and the running total
//! - `catalog` - Cached catalog lookups and row layout
//! - `registration` - New user sign-up

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod registration;

pub use auth::{AuthError, PasswordPolicy, SessionStore};
pub use cart::CartStore;
pub use catalog::{CatalogError, CatalogService};
pub use registration::{Registration, RegistrationService};
