//! Builders wiring port adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use faultline::domain::TokenPolicy;
use faultline::domain::ports::{CredentialHasher, ErrorAnalyzer, PromptEchoAnalyzer, TokenCodec};
use faultline::inbound::http::state::{HttpState, HttpStatePorts};
use faultline::outbound::memory::InMemoryStore;
use faultline::outbound::persistence::{
    DbPool, DieselApiKeyRepository, DieselErrorLogRepository, DieselProjectRepository,
    DieselTokenBlacklist, DieselUserRepository,
};
use faultline::outbound::security::{Argon2CredentialHasher, JwtTokenCodec};

use super::ServerConfig;

/// Ports that do not depend on the storage backend.
struct SharedPorts {
    hasher: Arc<dyn CredentialHasher>,
    codec: Arc<dyn TokenCodec>,
    analyzer: Arc<dyn ErrorAnalyzer>,
    clock: Arc<dyn Clock>,
    token_policy: TokenPolicy,
}

fn diesel_ports(pool: &DbPool, shared: SharedPorts) -> HttpStatePorts {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    HttpStatePorts {
        users: users.clone(),
        profiles: users,
        projects: Arc::new(DieselProjectRepository::new(pool.clone())),
        api_keys: Arc::new(DieselApiKeyRepository::new(pool.clone())),
        error_logs: Arc::new(DieselErrorLogRepository::new(pool.clone())),
        blacklist: Arc::new(DieselTokenBlacklist::new(pool.clone())),
        hasher: shared.hasher,
        codec: shared.codec,
        analyzer: shared.analyzer,
        clock: shared.clock,
        token_policy: shared.token_policy,
    }
}

fn memory_ports(shared: SharedPorts) -> HttpStatePorts {
    let store = Arc::new(InMemoryStore::new(shared.clock.clone()));
    HttpStatePorts {
        users: store.clone(),
        profiles: store.clone(),
        projects: store.clone(),
        api_keys: store.clone(),
        error_logs: store.clone(),
        blacklist: store,
        hasher: shared.hasher,
        codec: shared.codec,
        analyzer: shared.analyzer,
        clock: shared.clock,
        token_policy: shared.token_policy,
    }
}

/// Build the HTTP state, backed by PostgreSQL when a pool is configured and
/// by the in-memory store otherwise.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let shared = SharedPorts {
        hasher: Arc::new(Argon2CredentialHasher::default()),
        codec: Arc::new(JwtTokenCodec::new(&config.jwt_secret)),
        analyzer: Arc::new(PromptEchoAnalyzer),
        clock: Arc::new(DefaultClock),
        token_policy: config.token_policy,
    };
    let ports = match &config.db_pool {
        Some(pool) => diesel_ports(pool, shared),
        None => {
            warn!("no database configured; state is kept in memory and lost on restart");
            memory_ports(shared)
        }
    };
    web::Data::new(HttpState::new(ports))
}
