//! Newtype IDs for type-safe entity references.

use serde::{Deserialize, Serialize};

/// Identifier of a directory user.
///
/// Ids are assigned by registration as one more than the largest id in the
/// directory, starting at 1 for an empty directory.
///
/// ```
/// use tienda_core::UserId;
///
/// let ids = [UserId::new(3), UserId::new(7), UserId::new(5)];
/// assert_eq!(UserId::next_after(ids), UserId::new(8));
/// assert_eq!(UserId::next_after([]), UserId::new(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u32);

impl UserId {
    /// Create a new ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// The id a new user receives given the ids already taken.
    ///
    /// Saturates at `u32::MAX` rather than wrapping back onto an existing id.
    #[must_use]
    pub fn next_after(existing: impl IntoIterator<Item = Self>) -> Self {
        existing
            .into_iter()
            .max()
            .map_or(Self(1), |max| Self(max.0.saturating_add(1)))
    }
}

impl ::core::fmt::Display for UserId {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for UserId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<UserId> for u32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_after_ignores_order() {
        let ids = vec![UserId::new(2), UserId::new(10), UserId::new(4)];
        assert_eq!(UserId::next_after(ids), UserId::new(11));
    }

    #[test]
    fn test_next_after_saturates() {
        assert_eq!(
            UserId::next_after([UserId::new(u32::MAX)]),
            UserId::new(u32::MAX)
        );
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&UserId::new(42)).ok();
        assert_eq!(json.as_deref(), Some("42"));
    }
}
