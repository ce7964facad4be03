//! Port for API key persistence.

use async_trait::async_trait;

use crate::domain::{ApiKey, ApiKeyId, ApiKeySecret, ApiKeySummary, NewApiKey, ProjectId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by API key repository adapters.
    pub enum ApiKeyPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "api key repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "api key repository query failed: {message}",
        /// The generated secret collided with an existing key.
        DuplicateSecret => "api key secret already exists",
        /// The referenced project no longer exists.
        MissingProject => "api key references a missing project",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Insert a key and return the stored record.
    async fn create(&self, key: &NewApiKey) -> Result<ApiKey, ApiKeyPersistenceError>;

    /// Keys owned by `owner`, ordered by id ascending, joined with their
    /// project for display.
    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<ApiKeySummary>, ApiKeyPersistenceError>;

    /// Delete key `id` when owned by `owner`. Returns whether a row was
    /// removed.
    async fn delete_owned(&self, owner: &UserId, id: ApiKeyId)
    -> Result<bool, ApiKeyPersistenceError>;

    /// Key matching both `secret` and `project`.
    async fn find_for_project(
        &self,
        secret: ApiKeySecret,
        project: ProjectId,
    ) -> Result<Option<ApiKey>, ApiKeyPersistenceError>;
}
