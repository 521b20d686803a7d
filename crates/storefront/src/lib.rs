//! Tienda Storefront library.
//!
//! Session, cart and catalog stores over the remote data endpoints, and the
//! JSON/SSE HTTP surface that exposes them. The binary in `main.rs` wires
//! configuration, tracing and Sentry around [`routes::build_router`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod data;
pub mod error;
pub mod middleware;
pub mod models;
pub mod observable;
pub mod routes;
pub mod services;
pub mod state;
