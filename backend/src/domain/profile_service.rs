//! Read and update the caller's subscription profile.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{UserPersistenceError, UserProfileRepository};
use crate::domain::{AccountType, Error, UserId, UserProfile};

#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn UserProfileRepository>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn UserProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn get(&self, user: &UserId) -> Result<UserProfile, Error> {
        self.profiles
            .find_profile(user)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(profile_not_found)
    }

    /// Change the account type. `None` returns the profile unchanged.
    pub async fn update(
        &self,
        user: &UserId,
        account_type: Option<AccountType>,
    ) -> Result<UserProfile, Error> {
        let Some(account_type) = account_type else {
            return self.get(user).await;
        };
        let profile = self
            .profiles
            .set_account_type(user, account_type)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(profile_not_found)?;
        info!(user_id = %user, account_type = %account_type, "updated account type");
        Ok(profile)
    }
}

fn profile_not_found() -> Error {
    Error::not_found("profile not found")
}

fn map_profile_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message }
        | UserPersistenceError::DuplicateUsername { username: message } => Error::internal(message),
    }
}
