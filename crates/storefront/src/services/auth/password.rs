//! Password rules and Argon2id hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use tienda_core::PasswordDigest;

use super::AuthError;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length in characters.
pub const MAX_PASSWORD_LENGTH: usize = 18;

/// Password strength rules plus the Argon2 instance used to hash and verify.
#[derive(Clone)]
pub struct PasswordPolicy {
    argon2: Argon2<'static>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl PasswordPolicy {
    /// Argon2id with explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the parameters are out of range.
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|_| AuthError::PasswordHash)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Cheapest parameters Argon2 accepts. Only for tests.
    #[must_use]
    pub fn insecure_fast() -> Self {
        Self {
            argon2: Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
                    .unwrap_or_default(),
            ),
        }
    }

    /// Check that a new password meets the strength rules: 6 to 18
    /// characters with at least one uppercase letter and one digit.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` describing the first failed rule.
    pub fn validate(&self, password: &str) -> Result<(), AuthError> {
        let length = password.chars().count();
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
            return Err(AuthError::WeakPassword(format!(
                "password must be {MIN_PASSWORD_LENGTH} to {MAX_PASSWORD_LENGTH} characters"
            )));
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(AuthError::WeakPassword(
                "password must contain an uppercase letter".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::WeakPassword(
                "password must contain a digit".to_string(),
            ));
        }
        Ok(())
    }

    /// Hash a password into a PHC string.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<PasswordDigest, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| PasswordDigest::new(hash.to_string()))
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Hash on the blocking pool so Argon2 never stalls an executor thread.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails or the task dies.
    pub async fn hash_blocking(&self, password: &str) -> Result<PasswordDigest, AuthError> {
        let policy = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || policy.hash(&password))
            .await
            .map_err(|_| AuthError::PasswordHash)?
    }

    /// Whether a stored password is a well-formed Argon2 PHC string rather
    /// than a legacy cleartext value.
    #[must_use]
    pub fn is_digest(stored: &str) -> bool {
        PasswordHash::new(stored).is_ok_and(|parsed| {
            matches!(parsed.algorithm.as_str(), "argon2id" | "argon2i" | "argon2d")
                && parsed.hash.is_some()
        })
    }

    /// Whether `password` matches `digest`. Malformed digests never match.
    #[must_use]
    pub fn verify(&self, password: &str, digest: &PasswordDigest) -> bool {
        PasswordHash::new(digest.as_str()).is_ok_and(|parsed| {
            self.argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}
