//! Faultline backend library: a multi-tenant error logging service.
//!
//! Layout follows a ports-and-adapters split. [`domain`] owns entities,
//! ports and services; [`inbound`] exposes them over HTTP; [`outbound`]
//! implements the ports against PostgreSQL, memory and crypto libraries.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(test)]
mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
