//! Port for the one-to-one subscription profile of each user.

use async_trait::async_trait;

use crate::domain::{AccountType, UserId, UserProfile};

use super::UserPersistenceError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    /// Fetch the profile (with its user) for `user`.
    async fn find_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProfile>, UserPersistenceError>;

    /// Change the account type and return the updated profile.
    ///
    /// Returns `None` when the user has no profile.
    async fn set_account_type(
        &self,
        user: &UserId,
        account_type: AccountType,
    ) -> Result<Option<UserProfile>, UserPersistenceError>;
}
