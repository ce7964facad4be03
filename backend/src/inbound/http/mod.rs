//! HTTP inbound adapter exposing REST endpoints.
//!
//! [`configure`] mounts every `/api` route together with the extractor
//! configuration that keeps malformed requests inside the error envelope.
//! Health probes are mounted separately by the server since they depend on
//! process state rather than domain services.

use actix_web::web;

pub mod analyzer;
pub mod api_keys;
pub mod auth;
pub mod error;
pub mod error_logs;
pub mod health;
pub mod projects;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register the `/api` scope and extractor configuration on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::path_config())
        .app_data(validation::query_config())
        .service(
            web::scope("/api")
                .service(users::register)
                .service(users::login)
                .service(users::refresh)
                .service(users::logout)
                .service(users::get_profile)
                .service(users::replace_profile)
                .service(users::update_profile)
                .service(projects::create_project)
                .service(projects::list_projects)
                .service(projects::get_project)
                .service(projects::replace_project)
                .service(projects::update_project)
                .service(projects::delete_project)
                .service(api_keys::create_api_key)
                .service(api_keys::list_api_keys)
                .service(api_keys::revoke_api_key)
                .service(error_logs::ingest_error_log)
                .service(error_logs::list_error_logs)
                .service(error_logs::list_error_groups)
                .service(analyzer::analyze_error_log),
        );
}
