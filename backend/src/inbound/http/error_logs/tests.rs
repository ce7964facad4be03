//! Tests for error ingestion and listing handlers.

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self as actix_test, TestRequest};
use chrono::TimeDelta;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::auth::API_KEY_HEADER;
use crate::inbound::http::test_utils::{
    Session, create_api_key, create_project, register_and_login, send_json, test_app,
    test_context,
};

/// A user with one project and a key for it.
struct Tenant {
    session: Session,
    project_uid: String,
    key: String,
}

async fn tenant(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    username: &str,
) -> Tenant {
    let session = register_and_login(app, username).await;
    let project = create_project(app, &session, "Sample").await;
    let project_uid = project["uid"].as_str().expect("uid").to_owned();
    let key = create_api_key(app, &session, &project_uid).await;
    Tenant {
        session,
        project_uid,
        key: key["key"].as_str().expect("key").to_owned(),
    }
}

fn ingest(key: Option<&str>, body: Value) -> TestRequest {
    let mut request = TestRequest::post()
        .uri("/api/error-tracker/error-logs/")
        .set_json(body);
    if let Some(key) = key {
        request = request.insert_header((API_KEY_HEADER, key));
    }
    request
}

#[actix_web::test]
async fn ingestion_attributes_logs_to_the_key_project() {
    let ctx = test_context();
    let app = actix_test::init_service(test_app(ctx.state.clone())).await;
    let ada = tenant(&app, "ada").await;

    let (status, log) = send_json(
        &app,
        ingest(
            Some(&ada.key),
            json!({
                "error_message": "NullPointerException",
                "environment": "production",
                "project": ada.project_uid,
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(log["project"], ada.project_uid.as_str());
    assert_eq!(log["environment"], "production");
    assert_eq!(log["error_group"], Value::Null);
    assert!(log.get("owner").is_none());
}

#[rstest]
#[case(None)]
#[case(Some("   "))]
#[actix_web::test]
async fn ingestion_requires_an_api_key(#[case] key: Option<&str>) {
    let ctx = test_context();
    let app = actix_test::init_service(test_app(ctx.state.clone())).await;
    let ada = tenant(&app, "ada").await;

    let (status, body) = send_json(
        &app,
        ingest(key, json!({"error_message": "boom", "project": ada.project_uid})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn keys_only_unlock_their_own_project() {
    let ctx = test_context();
    let app = actix_test::init_service(test_app(ctx.state.clone())).await;
    let ada = tenant(&app, "ada").await;
    let grace = tenant(&app, "grace").await;

    let (status, body) = send_json(
        &app,
        ingest(
            Some(&ada.key),
            json!({"error_message": "boom", "project": grace.project_uid}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid key or key/project mismatch");
}

#[rstest]
#[case("not-a-uuid-key")]
#[case("3fa85f64-5717-4562-b3fc-2c963f66afa6")]
#[actix_web::test]
async fn unknown_keys_are_unauthorized(#[case] key: &str) {
    let ctx = test_context();
    let app = actix_test::init_service(test_app(ctx.state.clone())).await;
    let ada = tenant(&app, "ada").await;

    let (status, _) = send_json(
        &app,
        ingest(Some(key), json!({"error_message": "boom", "project": ada.project_uid})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case(json!({"error_message": "boom"}), "missing required field: project")]
#[case(json!({"error_message": "boom", "project": "u1"}), "project must be a valid UUID")]
#[case(
    json!({"error_message": "boom", "project": "3fa85f64-5717-4562-b3fc-2c963f66afa6"}),
    "invalid project identifier"
)]
#[actix_web::test]
async fn project_must_resolve(#[case] body: Value, #[case] message: &str) {
    let ctx = test_context();
    let app = actix_test::init_service(test_app(ctx.state.clone())).await;
    let ada = tenant(&app, "ada").await;

    let (status, response) = send_json(&app, ingest(Some(&ada.key), body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], message);
}

#[rstest]
#[case(json!({}))]
#[case(json!({"error_message": "  "}))]
#[actix_web::test]
async fn error_message_is_required(#[case] body: Value) {
    let mut body = body;
    let ctx = test_context();
    let app = actix_test::init_service(test_app(ctx.state.clone())).await;
    let ada = tenant(&app, "ada").await;
    body["project"] = json!(ada.project_uid);

    let (status, response) = send_json(&app, ingest(Some(&ada.key), body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["details"]["field"], "error_message");
}

#[actix_web::test]
async fn error_groups_must_exist() {
    let ctx = test_context();
    let app = actix_test::init_service(test_app(ctx.state.clone())).await;
    let ada = tenant(&app, "ada").await;
    let group = ctx.store.add_error_group();

    let (status, _) = send_json(
        &app,
        ingest(
            Some(&ada.key),
            json!({"error_message": "boom", "project": ada.project_uid, "error_group": 999}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, log) = send_json(
        &app,
        ingest(
            Some(&ada.key),
            json!({
                "error_message": "boom",
                "project": ada.project_uid,
                "error_group": group.id.get(),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(log["error_group"], group.id.get());
}

#[actix_web::test]
async fn listing_is_owner_scoped_and_newest_first() {
    let ctx = test_context();
    let app = actix_test::init_service(test_app(ctx.state.clone())).await;
    let ada = tenant(&app, "ada").await;
    let grace = tenant(&app, "grace").await;
    for message in ["first", "second"] {
        send_json(
            &app,
            ingest(
                Some(&ada.key),
                json!({"error_message": message, "project": ada.project_uid}),
            ),
        )
        .await;
        ctx.clock.advance(TimeDelta::seconds(1));
    }
    send_json(
        &app,
        ingest(
            Some(&grace.key),
            json!({"error_message": "theirs", "project": grace.project_uid}),
        ),
    )
    .await;

    let (status, logs) = send_json(
        &app,
        TestRequest::get()
            .uri("/api/error-tracker/error-logs/")
            .insert_header(ada.session.bearer()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let messages: Vec<_> = logs
        .as_array()
        .expect("array")
        .iter()
        .map(|log| log["error_message"].clone())
        .collect();
    assert_eq!(messages, vec![json!("second"), json!("first")]);
}

#[actix_web::test]
async fn listing_filters_by_project() {
    let ctx = test_context();
    let app = actix_test::init_service(test_app(ctx.state.clone())).await;
    let ada = tenant(&app, "ada").await;
    let other = create_project(&app, &ada.session, "Other").await;
    let other_uid = other["uid"].as_str().expect("uid").to_owned();
    let other_key = create_api_key(&app, &ada.session, &other_uid).await;
    send_json(
        &app,
        ingest(
            Some(&ada.key),
            json!({"error_message": "sample", "project": ada.project_uid}),
        ),
    )
    .await;
    send_json(
        &app,
        ingest(
            other_key["key"].as_str(),
            json!({"error_message": "other", "project": other_uid}),
        ),
    )
    .await;

    let (status, logs) = send_json(
        &app,
        TestRequest::get()
            .uri(&format!("/api/error-tracker/error-logs/?project={other_uid}"))
            .insert_header(ada.session.bearer()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let logs = logs.as_array().expect("array");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["error_message"], "other");
}

#[actix_web::test]
async fn invalid_project_filter_is_rejected() {
    let ctx = test_context();
    let app = actix_test::init_service(test_app(ctx.state.clone())).await;
    let session = register_and_login(&app, "ada").await;

    let (status, body) = send_json(
        &app,
        TestRequest::get()
            .uri("/api/error-tracker/error-logs/?project=u1")
            .insert_header(session.bearer()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[actix_web::test]
async fn error_groups_are_listed_for_signed_in_users() {
    let ctx = test_context();
    let app = actix_test::init_service(test_app(ctx.state.clone())).await;
    let session = register_and_login(&app, "ada").await;
    let group = ctx.store.add_error_group();

    let (status, body) = send_json(
        &app,
        TestRequest::get()
            .uri("/api/error-tracker/error-groups/")
            .insert_header(session.bearer()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], group.id.get());

    let (status, _) = send_json(
        &app,
        TestRequest::get().uri("/api/error-tracker/error-groups/"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
