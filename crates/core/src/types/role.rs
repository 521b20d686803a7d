//! User role tags.

use serde::{Deserialize, Serialize};

/// Error returned when a role tag is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct RoleError(pub String);

/// Role of a storefront user.
///
/// A user record may carry several tags; the session role is
/// [`Role::Admin`] whenever `admin` is among them and [`Role::Customer`]
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Store administrator.
    Admin,
    /// Regular shopper.
    Customer,
}

impl Role {
    /// The tag as it appears in user records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
        }
    }

    /// Resolve the session role from a set of raw role tags.
    ///
    /// ```
    /// use tienda_core::Role;
    ///
    /// assert_eq!(Role::from_tags(["customer", "admin"]), Role::Admin);
    /// assert_eq!(Role::from_tags(["customer"]), Role::Customer);
    /// assert_eq!(Role::from_tags(["warehouse"]), Role::Customer);
    /// ```
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if tags.into_iter().any(|tag| tag.as_ref() == Self::Admin.as_str()) {
            Self::Admin
        } else {
            Self::Customer
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            _ => Err(RoleError(s.to_string())),
        }
    }
}
