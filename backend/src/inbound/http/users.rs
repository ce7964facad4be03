//! Account, session and profile handlers.
//!
//! ```text
//! POST /api/users/register/ {"username":"ada","password":"correct horse"}
//! POST /api/users/login/    {"username":"ada","password":"correct horse"}
//! POST /api/users/refresh/  {"refresh":"<token>"}
//! POST /api/users/logout/   {"refresh_token":"<token>"}
//! GET|PUT|PATCH /api/users/profile/
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AccountType, CredentialValidationError, Error, LoginCredentials, Registration, TokenPair,
    User, UserProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_choice_error, invalid_field_error, require,
};

const USERNAME: FieldName = FieldName::new("username");
const PASSWORD: FieldName = FieldName::new("password");
const REFRESH: FieldName = FieldName::new("refresh");
const REFRESH_TOKEN: FieldName = FieldName::new("refresh_token");
const ACCOUNT_TYPE: FieldName = FieldName::new("account_type");

/// Request body for registration and login.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Request body for `POST /api/users/refresh/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// Request body for `POST /api/users/logout/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Request body for profile updates.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ProfileRequest {
    #[schema(example = "premium")]
    pub account_type: Option<String>,
}

fn map_credential_error(err: CredentialValidationError) -> Error {
    let field = match err {
        CredentialValidationError::EmptyUsername | CredentialValidationError::InvalidUsername(_) => {
            USERNAME
        }
        CredentialValidationError::EmptyPassword
        | CredentialValidationError::PasswordTooShort { .. } => PASSWORD,
    };
    invalid_field_error(field, err.to_string())
}

fn parse_account_type(value: &str) -> Result<AccountType, Error> {
    AccountType::from_str(value).map_err(|_| {
        invalid_choice_error(
            ACCOUNT_TYPE,
            value,
            &[AccountType::Free.as_str(), AccountType::Premium.as_str()],
        )
    })
}

/// Create an account together with its free profile.
#[utoipa::path(
    post,
    path = "/api/users/register/",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username already taken", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users/register/")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let CredentialsRequest { username, password } = payload.into_inner();
    let username = require(username, USERNAME)?;
    let password = require(password, PASSWORD)?;
    let registration =
        Registration::try_from_parts(&username, &password).map_err(map_credential_error)?;
    let user = state.sessions.register(&registration).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Exchange credentials for an access/refresh token pair.
#[utoipa::path(
    post,
    path = "/api/users/login/",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token pair", body = TokenPair),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login/")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<TokenPair>> {
    let CredentialsRequest { username, password } = payload.into_inner();
    let username = require(username, USERNAME)?;
    let password = require(password, PASSWORD)?;
    let credentials =
        LoginCredentials::try_from_parts(&username, &password).map_err(map_credential_error)?;
    let pair = state.sessions.login(&credentials).await?;
    Ok(web::Json(pair))
}

/// Rotate a refresh token into a new token pair.
#[utoipa::path(
    post,
    path = "/api/users/refresh/",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Rotated token pair", body = TokenPair),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Refresh token rejected", body = Error)
    ),
    tags = ["users"],
    operation_id = "refresh",
    security([])
)]
#[post("/users/refresh/")]
pub async fn refresh(
    state: web::Data<HttpState>,
    payload: web::Json<RefreshRequest>,
) -> ApiResult<web::Json<TokenPair>> {
    let token = require(payload.into_inner().refresh, REFRESH)?;
    let pair = state.sessions.refresh(&token).await?;
    Ok(web::Json(pair))
}

/// Revoke one of the caller's refresh tokens.
#[utoipa::path(
    post,
    path = "/api/users/logout/",
    request_body = LogoutRequest,
    responses(
        (status = 205, description = "Session revoked"),
        (status = 400, description = "Invalid or foreign refresh token", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "logout",
    security(("bearer" = []))
)]
#[post("/users/logout/")]
pub async fn logout(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<LogoutRequest>,
) -> ApiResult<HttpResponse> {
    let token = require(payload.into_inner().refresh_token, REFRESH_TOKEN)?;
    state.sessions.logout(user.id(), &token).await?;
    Ok(HttpResponse::ResetContent().finish())
}

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/users/profile/",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "getProfile",
    security(("bearer" = []))
)]
#[get("/users/profile/")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<UserProfile>> {
    let profile = state.profiles.get(user.id()).await?;
    Ok(web::Json(profile))
}

/// Replace the caller's account type.
#[utoipa::path(
    put,
    path = "/api/users/profile/",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "replaceProfile",
    security(("bearer" = []))
)]
#[put("/users/profile/")]
pub async fn replace_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let raw = require(payload.into_inner().account_type, ACCOUNT_TYPE)?;
    let account_type = parse_account_type(&raw)?;
    let profile = state.profiles.update(user.id(), Some(account_type)).await?;
    Ok(web::Json(profile))
}

/// Partially update the caller's profile; an absent field is left unchanged.
#[utoipa::path(
    patch,
    path = "/api/users/profile/",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateProfile",
    security(("bearer" = []))
)]
#[patch("/users/profile/")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let account_type = payload
        .into_inner()
        .account_type
        .as_deref()
        .map(parse_account_type)
        .transpose()?;
    let profile = state.profiles.update(user.id(), account_type).await?;
    Ok(web::Json(profile))
}
