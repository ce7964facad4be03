//! Driven ports for the hexagonal boundary.
//!
//! Domain services depend only on these traits; outbound adapters in
//! `crate::outbound` implement them for PostgreSQL, memory and crypto
//! backends.

mod macros;
pub(crate) use macros::define_port_error;

mod api_key_repository;
mod credential_hasher;
mod error_analyzer;
mod error_log_repository;
mod project_repository;
mod token_blacklist;
mod token_codec;
mod user_profile_repository;
mod user_repository;

#[cfg(test)]
pub use api_key_repository::MockApiKeyRepository;
pub use api_key_repository::{ApiKeyPersistenceError, ApiKeyRepository};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use error_analyzer::MockErrorAnalyzer;
pub use error_analyzer::{ErrorAnalyzer, ErrorAnalyzerError, PromptEchoAnalyzer};
#[cfg(test)]
pub use error_log_repository::MockErrorLogRepository;
pub use error_log_repository::{ErrorLogPersistenceError, ErrorLogRepository};
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{ProjectPersistenceError, ProjectRepository};
#[cfg(test)]
pub use token_blacklist::MockTokenBlacklist;
pub use token_blacklist::{TokenBlacklist, TokenBlacklistError};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{TokenCodec, TokenCodecError};
#[cfg(test)]
pub use user_profile_repository::MockUserProfileRepository;
pub use user_profile_repository::UserProfileRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewUser, StoredCredentials, UserPersistenceError, UserRepository};
