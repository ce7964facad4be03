//! Application settings loaded via OrthoConfig.
//!
//! Values come from `FAULTLINE_*` environment variables, an optional
//! configuration file and command-line flags. Absent values fall back to the
//! defaults exposed by the accessor methods.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::TokenPolicy;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACCESS_TTL_SECS: u64 = 300;
const DEFAULT_REFRESH_TTL_SECS: u64 = 86_400;
const EPHEMERAL_SECRET_LEN: usize = 32;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("failed to read JWT secret from {path}: {source}")]
    SecretFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JWT secret is empty")]
    EmptySecret,
    #[error("no JWT secret configured; set FAULTLINE_JWT_SECRET or FAULTLINE_JWT_SECRET_FILE")]
    MissingSecret,
    #[error("{name} must be positive")]
    NonPositiveTtl { name: &'static str },
    #[error("{name} is too large")]
    TtlOutOfRange { name: &'static str },
}

/// Top-level server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FAULTLINE")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: Option<String>,
    /// File holding the token signing secret.
    pub jwt_secret_file: Option<PathBuf>,
    /// Permit a random per-process signing secret in release builds.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
    pub access_token_ttl_secs: Option<u64>,
    pub refresh_token_ttl_secs: Option<u64>,
    /// Apply embedded migrations at start-up.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .max(1)
    }

    /// Token lifetimes derived from the configured TTLs.
    pub fn token_policy(&self) -> Result<TokenPolicy, SettingsError> {
        Ok(TokenPolicy {
            access_ttl: ttl(
                "access_token_ttl_secs",
                self.access_token_ttl_secs.unwrap_or(DEFAULT_ACCESS_TTL_SECS),
            )?,
            refresh_ttl: ttl(
                "refresh_token_ttl_secs",
                self.refresh_token_ttl_secs
                    .unwrap_or(DEFAULT_REFRESH_TTL_SECS),
            )?,
        })
    }

    /// Resolve the token signing secret.
    ///
    /// An inline secret wins over a secret file. Without either, debug
    /// builds and deployments that set `allow_ephemeral_secret` get a random
    /// secret; sessions then do not survive a restart.
    pub fn jwt_secret(&self) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
        if let Some(secret) = &self.jwt_secret {
            return non_empty(Zeroizing::new(secret.trim().as_bytes().to_vec()));
        }
        if let Some(path) = &self.jwt_secret_file {
            let bytes = std::fs::read(path).map_err(|source| SettingsError::SecretFile {
                path: path.clone(),
                source,
            })?;
            let text = Zeroizing::new(bytes);
            return non_empty(Zeroizing::new(text.trim_ascii().to_vec()));
        }
        if cfg!(debug_assertions) || self.allow_ephemeral_secret {
            warn!("no JWT secret configured; using an ephemeral secret");
            let mut secret = Zeroizing::new(vec![0u8; EPHEMERAL_SECRET_LEN]);
            OsRng.fill_bytes(&mut secret);
            return Ok(secret);
        }
        Err(SettingsError::MissingSecret)
    }
}

fn non_empty(secret: Zeroizing<Vec<u8>>) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
    if secret.is_empty() {
        return Err(SettingsError::EmptySecret);
    }
    Ok(secret)
}

fn ttl(name: &'static str, secs: u64) -> Result<TimeDelta, SettingsError> {
    if secs == 0 {
        return Err(SettingsError::NonPositiveTtl { name });
    }
    TimeDelta::from_std(Duration::from_secs(secs))
        .map_err(|_| SettingsError::TtlOutOfRange { name })
}
