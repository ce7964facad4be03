//! Error analysis handler.

use actix_web::{get, web};

use crate::domain::{Error, ErrorAnalysis, ErrorLogId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;

/// Analyse one of the caller's error logs.
#[utoipa::path(
    get,
    path = "/api/analyzer/error-log/{id}/",
    params(("id" = i64, Path, description = "Error log id")),
    responses(
        (status = 200, description = "Analysis", body = ErrorAnalysis),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 503, description = "Analyzer unavailable", body = Error)
    ),
    tags = ["analyzer"],
    operation_id = "analyzeErrorLog",
    security(("bearer" = []))
)]
#[get("/analyzer/error-log/{id}/")]
pub async fn analyze_error_log(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ErrorAnalysis>> {
    let id = ErrorLogId::new(path.into_inner());
    let analysis = state.error_logs.analyze(&user.scope(), id).await?;
    Ok(web::Json(analysis))
}
