//! Port for the append-only set of revoked refresh tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::TokenId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token blacklist adapters.
    pub enum TokenBlacklistError {
        /// Store connection could not be established.
        Connection { message: String } => "token blacklist connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token blacklist query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Revoke `jti`. Insertion is atomic: returns `true` only for the caller
    /// that actually added the entry.
    async fn revoke(
        &self,
        jti: TokenId,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, TokenBlacklistError>;

    /// Whether `jti` has been revoked.
    async fn is_revoked(&self, jti: TokenId) -> Result<bool, TokenBlacklistError>;
}
