//! Core types for Tienda.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod email;
pub mod id;
pub mod price;
pub mod role;
pub mod rut;

pub use credential::PasswordDigest;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use role::{Role, RoleError};
pub use rut::{Rut, RutError};
