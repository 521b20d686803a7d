//! Tienda Core - Shared types library.
//!
//! This crate holds the domain primitives shared by the storefront service
//! and its integration tests:
//!
//! - [`Email`] - validated login key
//! - [`Rut`] - Chilean national ID with check-digit validation
//! - [`Role`] - user role tags (`admin` / `customer`)
//! - [`Price`] - decimal amounts with currency-aware formatting
//! - [`PasswordDigest`] - Argon2 PHC strings as stored in the directory
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no hashing.
//! This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
