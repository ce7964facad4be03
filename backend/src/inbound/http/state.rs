//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ApiKeyRepository, CredentialHasher, ErrorAnalyzer, ErrorLogRepository, ProjectRepository,
    TokenBlacklist, TokenCodec, UserProfileRepository, UserRepository,
};
use crate::domain::{
    ApiKeyService, ErrorLogService, ErrorLogServiceDeps, ProfileService, ProjectService,
    SessionService, SessionServiceDeps, TokenPolicy,
};

/// Parameter object bundling every port implementation the services need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn UserProfileRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub api_keys: Arc<dyn ApiKeyRepository>,
    pub error_logs: Arc<dyn ErrorLogRepository>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub codec: Arc<dyn TokenCodec>,
    pub analyzer: Arc<dyn ErrorAnalyzer>,
    pub clock: Arc<dyn Clock>,
    pub token_policy: TokenPolicy,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub sessions: Arc<SessionService>,
    pub profiles: Arc<ProfileService>,
    pub projects: Arc<ProjectService>,
    pub api_keys: Arc<ApiKeyService>,
    pub error_logs: Arc<ErrorLogService>,
}

impl HttpState {
    /// Wire the domain services over a set of ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use faultline::domain::TokenPolicy;
    /// use faultline::domain::ports::PromptEchoAnalyzer;
    /// use faultline::inbound::http::state::{HttpState, HttpStatePorts};
    /// use faultline::outbound::memory::InMemoryStore;
    /// use faultline::outbound::security::{Argon2CredentialHasher, JwtTokenCodec};
    ///
    /// let store = Arc::new(InMemoryStore::default());
    /// let state = HttpState::new(HttpStatePorts {
    ///     users: store.clone(),
    ///     profiles: store.clone(),
    ///     projects: store.clone(),
    ///     api_keys: store.clone(),
    ///     error_logs: store.clone(),
    ///     blacklist: store,
    ///     hasher: Arc::new(Argon2CredentialHasher::default()),
    ///     codec: Arc::new(JwtTokenCodec::new(b"doc-secret")),
    ///     analyzer: Arc::new(PromptEchoAnalyzer),
    ///     clock: Arc::new(mockable::DefaultClock),
    ///     token_policy: TokenPolicy::default(),
    /// });
    /// let _sessions = state.sessions.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            profiles,
            projects,
            api_keys,
            error_logs,
            blacklist,
            hasher,
            codec,
            analyzer,
            clock,
            token_policy,
        } = ports;
        let sessions = SessionService::new(
            SessionServiceDeps {
                users,
                hasher,
                codec,
                blacklist,
                clock,
            },
            token_policy,
        );
        let error_logs = ErrorLogService::new(ErrorLogServiceDeps {
            logs: error_logs,
            projects: projects.clone(),
            keys: api_keys.clone(),
            analyzer,
        });
        Self {
            sessions: Arc::new(sessions),
            profiles: Arc::new(ProfileService::new(profiles)),
            projects: Arc::new(ProjectService::new(projects.clone())),
            api_keys: Arc::new(ApiKeyService::new(api_keys, projects)),
            error_logs: Arc::new(error_logs),
        }
    }
}
