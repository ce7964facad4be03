//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL through `diesel-async` and a `bb8` connection pool.
//!
//! - Repositories only translate between Diesel rows and domain types.
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//!   private to this module.
//! - Uniqueness and referential integrity are enforced by the schema;
//!   constraint violations are mapped to typed port errors.
//!
//! # Example
//!
//! ```no_run
//! use faultline::outbound::persistence::{DbPool, DieselProjectRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/faultline")).await?;
//! let projects = DieselProjectRepository::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_api_key_repository;
mod diesel_basic_error_mapping;
mod diesel_error_log_repository;
mod diesel_project_repository;
mod diesel_token_blacklist;
mod diesel_user_repository;
mod migrate;
mod models;
mod pool;
mod schema;

pub use diesel_api_key_repository::DieselApiKeyRepository;
pub use diesel_error_log_repository::DieselErrorLogRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_token_blacklist::DieselTokenBlacklist;
pub use diesel_user_repository::DieselUserRepository;
pub use migrate::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
