//! User domain types.
//!
//! [`UserRecord`] is the shape served by the users endpoint; [`User`] is the
//! validated directory entry whose password is always an Argon2 digest.

use serde::{Deserialize, Serialize};

use tienda_core::{Email, EmailError, PasswordDigest, Role, UserId};

/// A user as exchanged with the users endpoint.
///
/// The `password` field holds either an Argon2 PHC string or, for records
/// created before hashing was introduced, a cleartext password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub rut: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// A directory user (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Given name; doubles as the session display name.
    pub first_name: String,
    pub last_name: String,
    /// National ID as entered at registration.
    pub rut: String,
    /// Login key, compared exactly.
    pub email: Email,
    pub phone: String,
    pub address: String,
    /// Argon2 digest of the password.
    pub password: PasswordDigest,
    /// Raw role tags.
    pub roles: Vec<String>,
}

impl User {
    /// Build a directory user from a wire record and its password digest.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the record's email is malformed.
    pub fn from_record(record: UserRecord, password: PasswordDigest) -> Result<Self, EmailError> {
        Ok(Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            rut: record.rut,
            email: Email::parse(&record.email)?,
            phone: record.phone,
            address: record.address,
            password,
            roles: record.roles,
        })
    }

    /// The wire record for submitting this user. Carries the digest, never
    /// a cleartext password.
    #[must_use]
    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            rut: self.rut.clone(),
            email: self.email.as_str().to_string(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            password: self.password.as_str().to_string(),
            roles: self.roles.clone(),
        }
    }

    /// Session role: admin if any tag is `admin`, otherwise customer.
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_tags(&self.roles)
    }
}

/// Public view of a user, safe to return to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub rut: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub roles: Vec<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            rut: user.rut.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            roles: user.roles.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RECORD_JSON: &str = r#"{
        "id": 3,
        "firstName": "Ana",
        "lastName": "Pérez",
        "rut": "12.345.678-5",
        "email": "a@b.com",
        "phone": "912345678",
        "address": "Av. Siempre Viva 742",
        "password": "x",
        "roles": ["customer"]
    }"#;

    fn digest() -> PasswordDigest {
        PasswordDigest::new("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".to_string())
    }

    #[test]
    fn test_record_parses_camel_case() {
        let record: UserRecord = serde_json::from_str(RECORD_JSON).unwrap();
        assert_eq!(record.id, UserId::new(3));
        assert_eq!(record.first_name, "Ana");
        assert_eq!(record.roles, vec!["customer".to_string()]);
    }

    #[test]
    fn test_missing_roles_default_to_empty() {
        let json = RECORD_JSON.replace(r#""roles": ["customer"]"#, r#""extra": true"#);
        let record: UserRecord = serde_json::from_str(&json).unwrap();
        assert!(record.roles.is_empty());
    }

    #[test]
    fn test_record_debug_redacts_password() {
        let record: UserRecord = serde_json::from_str(RECORD_JSON).unwrap();
        let debug = format!("{record:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("\"x\""));
    }

    #[test]
    fn test_to_record_carries_digest() {
        let record: UserRecord = serde_json::from_str(RECORD_JSON).unwrap();
        let user = User::from_record(record, digest()).unwrap();
        let back = user.to_record();
        assert!(back.password.starts_with("$argon2id$"));
        assert_eq!(back.email, "a@b.com");
    }

    #[test]
    fn test_from_record_rejects_bad_email() {
        let mut record: UserRecord = serde_json::from_str(RECORD_JSON).unwrap();
        record.email = "not-an-email".to_string();
        assert!(User::from_record(record, digest()).is_err());
    }

    #[test]
    fn test_role_resolution() {
        let record: UserRecord = serde_json::from_str(RECORD_JSON).unwrap();
        let mut user = User::from_record(record, digest()).unwrap();
        assert_eq!(user.role(), Role::Customer);
        user.roles.push("admin".to_string());
        assert_eq!(user.role(), Role::Admin);
    }
}
