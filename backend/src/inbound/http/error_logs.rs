//! Error ingestion and browsing handlers.
//!
//! ```text
//! POST /api/error-tracker/error-logs/   API-Key: <key>  {"error_message": "...", "project": "<uid>"}
//! GET  /api/error-tracker/error-logs/?project=<uid>
//! GET  /api/error-tracker/error-groups/
//! ```
//!
//! Ingestion authenticates with the `API-Key` header alone. The key is
//! checked against the named project before the report body is validated.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, ErrorGroup, ErrorGroupId, ErrorLog, ErrorReport, ProjectUid};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, ApiKeyHeader};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_optional_uuid, parse_uuid, require,
};

const ERROR_MESSAGE: FieldName = FieldName::new("error_message");
const PROJECT: FieldName = FieldName::new("project");

/// Error event submitted by an instrumented application.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ErrorLogRequest {
    #[schema(example = "NullPointerException at Foo.java:42")]
    pub error_message: Option<String>,
    #[schema(example = "production")]
    pub environment: Option<String>,
    #[schema(format = Uuid)]
    pub project: Option<String>,
    pub error_group: Option<i64>,
}

/// Query parameters for the log listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ErrorLogQuery {
    /// Restrict the listing to one project, by external id.
    pub project: Option<String>,
}

/// Ingest an error event for the project the API key belongs to.
#[utoipa::path(
    post,
    path = "/api/error-tracker/error-logs/",
    request_body = ErrorLogRequest,
    responses(
        (status = 201, description = "Error log stored", body = ErrorLog),
        (status = 400, description = "Invalid request or unknown project", body = Error),
        (status = 401, description = "Missing key or key/project mismatch", body = Error)
    ),
    tags = ["error-logs"],
    operation_id = "ingestErrorLog",
    security(("api_key" = []))
)]
#[post("/error-tracker/error-logs/")]
pub async fn ingest_error_log(
    state: web::Data<HttpState>,
    key: ApiKeyHeader,
    payload: web::Json<ErrorLogRequest>,
) -> ApiResult<HttpResponse> {
    let ErrorLogRequest {
        error_message,
        environment,
        project,
        error_group,
    } = payload.into_inner();
    let project = ProjectUid::from(parse_uuid(&require(project, PROJECT)?, PROJECT)?);
    let grant = state
        .error_logs
        .authorize_ingestion(key.as_str(), project)
        .await?;
    let error_message = require(error_message, ERROR_MESSAGE)?;
    let report = ErrorReport::try_new(
        &error_message,
        environment.as_deref(),
        error_group.map(ErrorGroupId::new),
    )
    .map_err(|err| invalid_field_error(ERROR_MESSAGE, err.to_string()))?;
    let log = state.error_logs.ingest(&grant, report).await?;
    Ok(HttpResponse::Created().json(log))
}

/// List the caller's error logs, newest first.
#[utoipa::path(
    get,
    path = "/api/error-tracker/error-logs/",
    params(ErrorLogQuery),
    responses(
        (status = 200, description = "Error logs", body = [ErrorLog]),
        (status = 400, description = "Invalid project filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["error-logs"],
    operation_id = "listErrorLogs",
    security(("bearer" = []))
)]
#[get("/error-tracker/error-logs/")]
pub async fn list_error_logs(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<ErrorLogQuery>,
) -> ApiResult<web::Json<Vec<ErrorLog>>> {
    let project = parse_optional_uuid(query.project.as_deref(), PROJECT)?.map(ProjectUid::from);
    let logs = state.error_logs.list(&user.scope(), project).await?;
    Ok(web::Json(logs))
}

#[utoipa::path(
    get,
    path = "/api/error-tracker/error-groups/",
    responses(
        (status = 200, description = "Error groups", body = [ErrorGroup]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["error-logs"],
    operation_id = "listErrorGroups",
    security(("bearer" = []))
)]
#[get("/error-tracker/error-groups/")]
pub async fn list_error_groups(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ErrorGroup>>> {
    Ok(web::Json(state.error_logs.list_groups().await?))
}

#[cfg(test)]
mod tests;
