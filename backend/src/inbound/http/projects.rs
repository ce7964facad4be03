//! Project management handlers, scoped to the authenticated owner.
//!
//! Projects owned by someone else are indistinguishable from missing ones:
//! every lookup answers `404`.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Project, ProjectId, ProjectName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, require};

const NAME: FieldName = FieldName::new("name");

/// Request body for project creation and updates.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ProjectRequest {
    #[schema(example = "Sample")]
    pub name: Option<String>,
}

fn parse_name(raw: &str) -> Result<ProjectName, Error> {
    ProjectName::new(raw).map_err(|err| invalid_field_error(NAME, err.to_string()))
}

/// Create a project with a fresh external identifier.
#[utoipa::path(
    post,
    path = "/api/project-integrations/projects/",
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["projects"],
    operation_id = "createProject",
    security(("bearer" = []))
)]
#[post("/project-integrations/projects/")]
pub async fn create_project(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<ProjectRequest>,
) -> ApiResult<HttpResponse> {
    let name = parse_name(&require(payload.into_inner().name, NAME)?)?;
    let project = state.projects.create(&user.scope(), name).await?;
    Ok(HttpResponse::Created().json(project))
}

/// List the caller's projects.
#[utoipa::path(
    get,
    path = "/api/project-integrations/projects/",
    responses(
        (status = 200, description = "Projects", body = [Project]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["projects"],
    operation_id = "listProjects",
    security(("bearer" = []))
)]
#[get("/project-integrations/projects/")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<Project>>> {
    Ok(web::Json(state.projects.list(&user.scope()).await?))
}

#[utoipa::path(
    get,
    path = "/api/project-integrations/projects/{id}/",
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = Project),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["projects"],
    operation_id = "getProject",
    security(("bearer" = []))
)]
#[get("/project-integrations/projects/{id}/")]
pub async fn get_project(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Project>> {
    let id = ProjectId::new(path.into_inner());
    Ok(web::Json(state.projects.get(&user.scope(), id).await?))
}

/// Rename a project; `name` is required.
#[utoipa::path(
    put,
    path = "/api/project-integrations/projects/{id}/",
    params(("id" = i64, Path, description = "Project id")),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = Project),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["projects"],
    operation_id = "replaceProject",
    security(("bearer" = []))
)]
#[put("/project-integrations/projects/{id}/")]
pub async fn replace_project(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<ProjectRequest>,
) -> ApiResult<web::Json<Project>> {
    let name = parse_name(&require(payload.into_inner().name, NAME)?)?;
    let id = ProjectId::new(path.into_inner());
    let project = state.projects.update(&user.scope(), id, Some(name)).await?;
    Ok(web::Json(project))
}

/// Partially update a project; an absent name leaves it unchanged.
#[utoipa::path(
    patch,
    path = "/api/project-integrations/projects/{id}/",
    params(("id" = i64, Path, description = "Project id")),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = Project),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["projects"],
    operation_id = "updateProject",
    security(("bearer" = []))
)]
#[patch("/project-integrations/projects/{id}/")]
pub async fn update_project(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<ProjectRequest>,
) -> ApiResult<web::Json<Project>> {
    let name = payload
        .into_inner()
        .name
        .as_deref()
        .map(parse_name)
        .transpose()?;
    let id = ProjectId::new(path.into_inner());
    let project = state.projects.update(&user.scope(), id, name).await?;
    Ok(web::Json(project))
}

/// Delete a project along with its API keys and error logs.
#[utoipa::path(
    delete,
    path = "/api/project-integrations/projects/{id}/",
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["projects"],
    operation_id = "deleteProject",
    security(("bearer" = []))
)]
#[delete("/project-integrations/projects/{id}/")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = ProjectId::new(path.into_inner());
    state.projects.delete(&user.scope(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self as actix_test, TestRequest};
    use rstest::rstest;
    use serde_json::json;

    use crate::inbound::http::test_utils::{
        create_project, register_and_login, send_json, test_app, test_context,
    };

    fn project_uri(project: &serde_json::Value) -> String {
        format!("/api/project-integrations/projects/{}/", project["id"])
    }

    #[actix_web::test]
    async fn created_projects_belong_to_the_caller() {
        let ctx = test_context();
        let app = actix_test::init_service(test_app(ctx.state.clone())).await;
        let session = register_and_login(&app, "ada").await;

        let project = create_project(&app, &session, "  Sample ").await;

        assert_eq!(project["name"], "Sample");
        assert!(project["uid"].is_string());
        assert!(project["user"].is_string());
        assert!(project["created_at"].is_string());
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({"name": "   "}))]
    #[case(json!({"name": "x".repeat(101)}))]
    #[actix_web::test]
    async fn names_are_validated(#[case] payload: serde_json::Value) {
        let ctx = test_context();
        let app = actix_test::init_service(test_app(ctx.state.clone())).await;
        let session = register_and_login(&app, "ada").await;

        let (status, body) = send_json(
            &app,
            TestRequest::post()
                .uri("/api/project-integrations/projects/")
                .insert_header(session.bearer())
                .set_json(payload),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "name");
    }

    #[actix_web::test]
    async fn listing_only_shows_own_projects() {
        let ctx = test_context();
        let app = actix_test::init_service(test_app(ctx.state.clone())).await;
        let ada = register_and_login(&app, "ada").await;
        let grace = register_and_login(&app, "grace").await;
        create_project(&app, &ada, "Mine").await;
        create_project(&app, &grace, "Theirs").await;

        let (status, body) = send_json(
            &app,
            TestRequest::get()
                .uri("/api/project-integrations/projects/")
                .insert_header(ada.bearer()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body
            .as_array()
            .expect("array")
            .iter()
            .map(|project| project["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("Mine")]);
    }

    #[rstest]
    #[case("GET")]
    #[case("PUT")]
    #[case("DELETE")]
    #[actix_web::test]
    async fn foreign_projects_are_not_found(#[case] method: &str) {
        let ctx = test_context();
        let app = actix_test::init_service(test_app(ctx.state.clone())).await;
        let ada = register_and_login(&app, "ada").await;
        let grace = register_and_login(&app, "grace").await;
        let project = create_project(&app, &ada, "Mine").await;
        let uri = project_uri(&project);

        let request = match method {
            "GET" => TestRequest::get(),
            "PUT" => TestRequest::put().set_json(json!({"name": "Stolen"})),
            _ => TestRequest::delete(),
        };
        let (status, body) = send_json(&app, request.uri(&uri).insert_header(grace.bearer())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[actix_web::test]
    async fn rename_and_partial_update() {
        let ctx = test_context();
        let app = actix_test::init_service(test_app(ctx.state.clone())).await;
        let session = register_and_login(&app, "ada").await;
        let project = create_project(&app, &session, "Sample").await;
        let uri = project_uri(&project);

        let (status, renamed) = send_json(
            &app,
            TestRequest::put()
                .uri(&uri)
                .insert_header(session.bearer())
                .set_json(json!({"name": "Renamed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["name"], "Renamed");
        assert_eq!(renamed["uid"], project["uid"]);

        let (status, unchanged) = send_json(
            &app,
            TestRequest::patch()
                .uri(&uri)
                .insert_header(session.bearer())
                .set_json(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(unchanged["name"], "Renamed");
    }

    #[actix_web::test]
    async fn delete_then_get_is_not_found() {
        let ctx = test_context();
        let app = actix_test::init_service(test_app(ctx.state.clone())).await;
        let session = register_and_login(&app, "ada").await;
        let project = create_project(&app, &session, "Sample").await;
        let uri = project_uri(&project);

        let (status, _) = send_json(
            &app,
            TestRequest::delete().uri(&uri).insert_header(session.bearer()),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send_json(
            &app,
            TestRequest::get().uri(&uri).insert_header(session.bearer()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn non_numeric_ids_are_bad_requests() {
        let ctx = test_context();
        let app = actix_test::init_service(test_app(ctx.state.clone())).await;
        let session = register_and_login(&app, "ada").await;

        let (status, body) = send_json(
            &app,
            TestRequest::get()
                .uri("/api/project-integrations/projects/abc/")
                .insert_header(session.bearer()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn projects_require_authentication() {
        let ctx = test_context();
        let app = actix_test::init_service(test_app(ctx.state.clone())).await;

        let (status, _) = send_json(
            &app,
            TestRequest::get().uri("/api/project-integrations/projects/"),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
