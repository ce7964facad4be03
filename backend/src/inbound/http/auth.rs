//! Request extractors for the two credential schemes.
//!
//! Handlers name the principal they need in their signature:
//! [`AuthenticatedUser`] for bearer session tokens and [`ApiKeyHeader`] for
//! the ingestion key. Both reject with `401` before the handler body runs.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{Error, OwnerScope, UserId};

use super::state::HttpState;

/// Header carrying an ingestion API key.
pub const API_KEY_HEADER: &str = "API-Key";

const BEARER_PREFIX: &str = "Bearer ";

fn bearer_token(headers: &HeaderMap) -> Result<String, Error> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("authentication credentials were not provided"))?;
    let value = raw
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))
}

/// The user a verified access token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    pub fn id(&self) -> &UserId {
        &self.0
    }

    /// Ownership scope for queries made on behalf of this user.
    pub fn scope(&self) -> OwnerScope {
        OwnerScope::new(self.0)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req.headers());
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state = state.ok_or_else(|| Error::internal("http state is not configured"))?;
            let user = state.sessions.authenticate(&token).await?;
            Ok::<_, actix_web::Error>(AuthenticatedUser(user))
        })
    }
}

/// Raw `API-Key` header value, present and non-blank.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeyHeader(String);

impl ApiKeyHeader {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKeyHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKeyHeader(<redacted>)")
    }
}

impl FromRequest for ApiKeyHeader {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let key = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| ApiKeyHeader(value.to_owned()));
        ready(key.ok_or_else(|| {
            debug!("ingestion request without api key");
            Error::unauthorized("API key required").into()
        }))
    }
}
