//! Registration service.
//!
//! Turns a sign-up form into a directory [`User`]: validates every field,
//! assigns the next id, hashes the password, caches the user locally and
//! submits it to the users endpoint.

use serde::Deserialize;
use tracing::instrument;

use tienda_core::{Email, Role, Rut};

use super::auth::{AuthError, SessionStore};
use crate::models::User;

/// Sign-up form input.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub rut: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
    pub role: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Registration over a [`SessionStore`]'s directory.
pub struct RegistrationService<'a> {
    sessions: &'a SessionStore,
}

impl<'a> RegistrationService<'a> {
    #[must_use]
    pub const fn new(sessions: &'a SessionStore) -> Self {
        Self { sessions }
    }

    /// Register a new user.
    ///
    /// The user is added to the local directory before being submitted, so
    /// a submit failure still leaves them able to log in for this process.
    /// The email is checked again when the user is inserted, so of several
    /// concurrent registrations for one email only the first succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` for a blank field,
    /// `AuthError::InvalidEmail`, `AuthError::InvalidRut` or
    /// `AuthError::InvalidRole` for malformed input,
    /// `AuthError::WeakPassword` if the password breaks the strength rules,
    /// `AuthError::UserAlreadyExists` if the email is taken, and
    /// `AuthError::Data` if the users endpoint rejects the submission.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: Registration) -> Result<User, AuthError> {
        if let Err(e) = self.sessions.load_directory().await {
            tracing::warn!(error = %e, "Directory refresh failed, checking against cached users");
        }

        let email = Email::parse(&form.email)?;
        let first_name = required("firstName", form.first_name)?;
        let last_name = required("lastName", form.last_name)?;
        let phone = required("phone", form.phone)?;
        let address = required("address", form.address)?;
        let rut = Rut::parse(&form.rut)?;
        let role: Role = form.role.trim().parse()?;
        self.sessions.passwords().validate(&form.password)?;

        if self.sessions.has_email(&email) {
            return Err(AuthError::UserAlreadyExists);
        }

        let password = self.sessions.passwords().hash_blocking(&form.password).await?;
        let user = self.sessions.insert_new_user(|id| User {
            id,
            first_name,
            last_name,
            rut: rut.to_string(),
            email,
            phone,
            address,
            password,
            roles: vec![role.as_str().to_string()],
        })?;

        self.sessions
            .directory()
            .submit_user(&user.to_record())
            .await?;

        tracing::info!(user_id = %user.id, role = %role, "User registered");
        Ok(user)
    }
}

fn required(field: &'static str, value: String) -> Result<String, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
