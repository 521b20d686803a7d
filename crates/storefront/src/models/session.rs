//! Session-related types.
//!
//! A [`Session`] is an immutable snapshot of "who is logged in"; the session
//! store swaps whole snapshots so the authenticated flag, user and display
//! name can never disagree.

use chrono::{DateTime, Utc};

use tienda_core::Role;

use super::User;

/// Authentication state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
    display_name: Option<String>,
    role: Option<Role>,
    logged_in_at: Option<DateTime<Utc>>,
}

impl Session {
    /// The initial, unauthenticated session.
    #[must_use]
    pub fn logged_out() -> Self {
        Self::default()
    }

    /// A session for `user`, established at `at`.
    #[must_use]
    pub fn logged_in(user: User, at: DateTime<Utc>) -> Self {
        Self {
            display_name: Some(user.first_name.clone()),
            role: Some(user.role()),
            user: Some(user),
            logged_in_at: Some(at),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    #[must_use]
    pub const fn logged_in_at(&self) -> Option<DateTime<Utc>> {
        self.logged_in_at
    }
}

/// Where the client should go after a session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The login view.
    Login,
}

impl Navigation {
    /// Route path of the target view.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
        }
    }
}
