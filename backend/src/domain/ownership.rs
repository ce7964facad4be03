//! Ownership scoping shared by every tenant-owned record.
//!
//! Services resolve records through an [`OwnerScope`] so a record owned by
//! someone else is indistinguishable from an absent one.

use super::UserId;

/// Records whose ownership chain ends at a user.
pub trait Owned {
    fn owner(&self) -> &UserId;
}

/// The principal a request acts on behalf of.
///
/// # Examples
/// ```
/// use faultline::domain::{OwnerScope, UserId};
///
/// let user = UserId::random();
/// let scope = OwnerScope::new(user);
/// assert_eq!(scope.user(), &user);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerScope(UserId);

impl OwnerScope {
    pub fn new(user: UserId) -> Self {
        Self(user)
    }

    pub fn user(&self) -> &UserId {
        &self.0
    }

    /// Whether `record` is visible to this principal.
    pub fn admits<T: Owned + ?Sized>(&self, record: &T) -> bool {
        record.owner() == &self.0
    }

    /// Keep `record` only when it is visible to this principal.
    pub fn filter<T: Owned>(&self, record: Option<T>) -> Option<T> {
        record.filter(|value| self.admits(value))
    }
}

impl From<UserId> for OwnerScope {
    fn from(value: UserId) -> Self {
        Self(value)
    }
}
