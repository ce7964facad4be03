//! Test helpers for inbound HTTP components.
//!
//! Handler tests run the real services over the in-memory store with a
//! JWT codec and a minimum-cost Argon2 hasher, so requests exercise the
//! same code paths as production without a database.

use std::sync::Arc;

use actix_http::Request;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use argon2::Params;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use crate::Trace;
use crate::domain::TokenPolicy;
use crate::domain::ports::PromptEchoAnalyzer;
use crate::inbound::http::configure;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::security::{Argon2CredentialHasher, JwtTokenCodec};
use crate::test_support::MutableClock;

/// In-memory state plus the handles tests use to inspect or steer it.
pub struct TestContext {
    pub store: InMemoryStore,
    pub clock: Arc<MutableClock>,
    pub state: web::Data<HttpState>,
}

pub fn test_context() -> TestContext {
    let start = Utc
        .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    let clock = Arc::new(MutableClock::new(start));
    let store = InMemoryStore::new(clock.clone());
    let shared = Arc::new(store.clone());
    let params = Params::new(Params::MIN_M_COST, 1, 1, None).expect("valid argon2 params");
    let state = HttpState::new(HttpStatePorts {
        users: shared.clone(),
        profiles: shared.clone(),
        projects: shared.clone(),
        api_keys: shared.clone(),
        error_logs: shared.clone(),
        blacklist: shared,
        hasher: Arc::new(Argon2CredentialHasher::with_params(params)),
        codec: Arc::new(JwtTokenCodec::new(b"test-secret")),
        analyzer: Arc::new(PromptEchoAnalyzer),
        clock: clock.clone(),
        token_policy: TokenPolicy::default(),
    });
    TestContext {
        store,
        clock,
        state: web::Data::new(state),
    }
}

pub fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).wrap(Trace).configure(configure)
}

/// Send a JSON request and decode the JSON response, if any.
pub async fn send_json(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: test::TestRequest,
) -> (StatusCode, Value) {
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("response body is JSON")
    };
    (status, value)
}

/// Access and refresh tokens issued to a freshly registered user.
pub struct Session {
    pub access: String,
    pub refresh: String,
}

impl Session {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.access))
    }
}

/// Register `username` and log in, returning the issued tokens.
pub async fn register_and_login(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    username: &str,
) -> Session {
    let credentials = json!({"username": username, "password": "correct horse"});
    let (status, _) = send_json(
        app,
        test::TestRequest::post()
            .uri("/api/users/register/")
            .set_json(&credentials),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration succeeds");

    let (status, tokens) = send_json(
        app,
        test::TestRequest::post()
            .uri("/api/users/login/")
            .set_json(&credentials),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login succeeds");
    Session {
        access: tokens["access"].as_str().expect("access token").to_owned(),
        refresh: tokens["refresh"].as_str().expect("refresh token").to_owned(),
    }
}

/// Create a project for `session` and return its JSON representation.
pub async fn create_project(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    session: &Session,
    name: &str,
) -> Value {
    let (status, project) = send_json(
        app,
        test::TestRequest::post()
            .uri("/api/project-integrations/projects/")
            .insert_header(session.bearer())
            .set_json(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "project created");
    project
}

/// Mint an API key for the project with external id `project_uid`.
pub async fn create_api_key(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    session: &Session,
    project_uid: &str,
) -> Value {
    let (status, key) = send_json(
        app,
        test::TestRequest::post()
            .uri("/api/project-integrations/api-keys/create/")
            .insert_header(session.bearer())
            .set_json(json!({"project": project_uid})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "api key created");
    key
}
