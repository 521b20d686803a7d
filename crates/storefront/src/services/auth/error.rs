//! Authentication error types.

use thiserror::Error;

use crate::data::DataError;

/// Errors that can occur during authentication and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] tienda_core::EmailError),

    /// Invalid national ID.
    #[error("invalid rut: {0}")]
    InvalidRut(#[from] tienda_core::RutError),

    /// Unknown role tag.
    #[error("{0}")]
    InvalidRole(#[from] tienda_core::RoleError),

    /// A required registration field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// The users endpoint failed.
    #[error("directory error: {0}")]
    Data(#[from] DataError),
}
