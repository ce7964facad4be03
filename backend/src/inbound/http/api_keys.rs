//! API key management handlers.
//!
//! The secret is returned once, by the create endpoint. Listings only carry
//! the key id and the project it belongs to.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApiKeyId, ApiKeySummary, Error, IssuedApiKey, ProjectUid};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, require};

const PROJECT: FieldName = FieldName::new("project");

/// Request body for `POST /api/project-integrations/api-keys/create/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateApiKeyRequest {
    #[schema(format = Uuid)]
    pub project: Option<String>,
}

/// Mint a key for one of the caller's projects.
#[utoipa::path(
    post,
    path = "/api/project-integrations/api-keys/create/",
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "Key issued", body = IssuedApiKey),
        (status = 400, description = "Missing, unknown or foreign project", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["api-keys"],
    operation_id = "createApiKey",
    security(("bearer" = []))
)]
#[post("/project-integrations/api-keys/create/")]
pub async fn create_api_key(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateApiKeyRequest>,
) -> ApiResult<HttpResponse> {
    let raw = require(payload.into_inner().project, PROJECT)?;
    let project = ProjectUid::from(parse_uuid(&raw, PROJECT)?);
    let issued = state.api_keys.issue(&user.scope(), project).await?;
    Ok(HttpResponse::Created().json(issued))
}

#[utoipa::path(
    get,
    path = "/api/project-integrations/api-keys/",
    responses(
        (status = 200, description = "Keys owned by the caller", body = [ApiKeySummary]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["api-keys"],
    operation_id = "listApiKeys",
    security(("bearer" = []))
)]
#[get("/project-integrations/api-keys/")]
pub async fn list_api_keys(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ApiKeySummary>>> {
    Ok(web::Json(state.api_keys.list(&user.scope()).await?))
}

#[utoipa::path(
    delete,
    path = "/api/project-integrations/api-keys/{id}/",
    params(("id" = i64, Path, description = "API key id")),
    responses(
        (status = 204, description = "Key revoked"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["api-keys"],
    operation_id = "revokeApiKey",
    security(("bearer" = []))
)]
#[delete("/project-integrations/api-keys/{id}/")]
pub async fn revoke_api_key(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = ApiKeyId::new(path.into_inner());
    state.api_keys.revoke(&user.scope(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}
