//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities shared by the HTTP and
//! persistence layers, the driven ports adapters implement, and the services
//! that apply ownership scoping on top of those ports. Types validate on
//! construction so handlers and adapters never see malformed values.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: API error payload and its stable codes.
//! - [`User`], [`Project`], [`ApiKey`], [`ErrorLog`]: tenant records.
//! - [`OwnerScope`]: the principal every scoped query filters on.
//! - `*Service`: use cases invoked by the inbound HTTP adapter.

pub mod analysis;
pub mod api_key;
pub mod api_key_service;
pub mod auth;
pub mod error;
pub mod error_log;
pub mod error_log_service;
pub mod ownership;
pub mod ports;
pub mod profile;
pub mod profile_service;
pub mod project;
pub mod project_service;
pub mod session_service;
pub mod trace_id;
pub mod user;

pub use self::analysis::{AnalysisPrompt, ErrorAnalysis};
pub use self::api_key::{ApiKey, ApiKeyId, ApiKeySecret, ApiKeySummary, IssuedApiKey, NewApiKey};
pub use self::api_key_service::ApiKeyService;
pub use self::auth::{
    CredentialValidationError, LoginCredentials, PASSWORD_MIN, PasswordHash, Registration,
    SessionClaims, TokenId, TokenKind, TokenPair, TokenPolicy,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::error_log::{
    ErrorGroup, ErrorGroupId, ErrorLog, ErrorLogId, ErrorLogValidationError, ErrorReport,
    NewErrorLog,
};
pub use self::error_log_service::{ErrorLogService, ErrorLogServiceDeps, IngestionGrant};
pub use self::ownership::{OwnerScope, Owned};
pub use self::profile::{AccountType, UnknownAccountType, UserProfile};
pub use self::profile_service::ProfileService;
pub use self::project::{
    NewProject, PROJECT_NAME_MAX, Project, ProjectId, ProjectName, ProjectUid,
    ProjectValidationError,
};
pub use self::project_service::ProjectService;
pub use self::session_service::{SessionService, SessionServiceDeps};
pub use self::trace_id::TraceId;
pub use self::user::{USERNAME_MAX, User, UserId, UserValidationError, Username};
