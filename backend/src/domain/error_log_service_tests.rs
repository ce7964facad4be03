//! Tests for ingestion authorization, ingestion and analysis.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockApiKeyRepository, MockErrorAnalyzer, MockErrorLogRepository, MockProjectRepository,
};
use crate::domain::{
    ApiKey, ApiKeyId, ErrorCode, ErrorGroupId, ProjectId, ProjectName, UserId,
};

const KEY: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

struct Mocks {
    logs: MockErrorLogRepository,
    projects: MockProjectRepository,
    keys: MockApiKeyRepository,
    analyzer: MockErrorAnalyzer,
}

impl Mocks {
    fn new() -> Self {
        Self {
            logs: MockErrorLogRepository::new(),
            projects: MockProjectRepository::new(),
            keys: MockApiKeyRepository::new(),
            analyzer: MockErrorAnalyzer::new(),
        }
    }

    fn into_service(self) -> ErrorLogService {
        ErrorLogService::new(ErrorLogServiceDeps {
            logs: Arc::new(self.logs),
            projects: Arc::new(self.projects),
            keys: Arc::new(self.keys),
            analyzer: Arc::new(self.analyzer),
        })
    }
}

fn sample_project(owner: UserId) -> Project {
    Project::new(
        ProjectId::new(3),
        ProjectUid::random(),
        ProjectName::new("Sample").expect("name"),
        owner,
        Utc::now(),
    )
}

fn stored_log(project: ProjectUid, owner: UserId) -> ErrorLog {
    ErrorLog {
        id: ErrorLogId::new(1),
        error_message: "NullPointerException".to_owned(),
        environment: Some("production".to_owned()),
        created_at: Utc
            .with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp"),
        project,
        error_group: None,
        owner,
    }
}

fn key_for(project: &Project) -> ApiKey {
    ApiKey {
        id: ApiKeyId::new(1),
        secret: ApiKeySecret::parse(KEY).expect("uuid key"),
        project_id: project.id(),
        owner: UserId::random(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn authorize_grants_matching_key() {
    let project = sample_project(UserId::random());
    let uid = project.uid();
    let key = key_for(&project);
    let mut mocks = Mocks::new();
    let found = project.clone();
    mocks
        .projects
        .expect_find_by_uid()
        .times(1)
        .return_once(move |_| Ok(Some(found)));
    mocks
        .keys
        .expect_find_for_project()
        .withf(|secret, project_id| {
            secret.to_string() == KEY && *project_id == ProjectId::new(3)
        })
        .times(1)
        .return_once(move |_, _| Ok(Some(key)));
    let service = mocks.into_service();

    let grant = service
        .authorize_ingestion(KEY, uid)
        .await
        .expect("grant");

    assert_eq!(grant.project(), &project);
}

#[tokio::test]
async fn authorize_rejects_unknown_project_as_bad_request() {
    let mut mocks = Mocks::new();
    mocks
        .projects
        .expect_find_by_uid()
        .times(1)
        .return_once(|_| Ok(None));
    mocks.keys.expect_find_for_project().never();
    let service = mocks.into_service();

    let error = service
        .authorize_ingestion(KEY, ProjectUid::random())
        .await
        .expect_err("unknown project");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "invalid project identifier");
}

#[rstest]
#[case::mismatched_key(KEY)]
#[case::malformed_key("not-a-uuid")]
#[tokio::test]
async fn authorize_rejects_keys_not_bound_to_project(#[case] raw_key: &str) {
    let project = sample_project(UserId::random());
    let uid = project.uid();
    let mut mocks = Mocks::new();
    mocks
        .projects
        .expect_find_by_uid()
        .times(1)
        .return_once(move |_| Ok(Some(project)));
    mocks
        .keys
        .expect_find_for_project()
        .returning(|_, _| Ok(None));
    let service = mocks.into_service();

    let error = service
        .authorize_ingestion(raw_key, uid)
        .await
        .expect_err("rejected key");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "invalid key or key/project mismatch");
}

#[tokio::test]
async fn ingest_attributes_log_to_granted_project() {
    let owner = UserId::random();
    let project = sample_project(owner);
    let uid = project.uid();
    let mut mocks = Mocks::new();
    mocks.logs.expect_group_exists().never();
    mocks
        .logs
        .expect_insert()
        .withf(|new_log| new_log.project_id == ProjectId::new(3))
        .times(1)
        .returning(move |_| Ok(stored_log(uid, owner)));
    let service = mocks.into_service();
    let grant = IngestionGrant { project };
    let report =
        ErrorReport::try_new("NullPointerException", Some("production"), None).expect("report");

    let log = service.ingest(&grant, report).await.expect("stored");

    assert_eq!(log.project, uid);
}

#[tokio::test]
async fn ingest_rejects_unknown_error_group() {
    let mut mocks = Mocks::new();
    mocks
        .logs
        .expect_group_exists()
        .times(1)
        .return_once(|_| Ok(false));
    mocks.logs.expect_insert().never();
    let service = mocks.into_service();
    let grant = IngestionGrant {
        project: sample_project(UserId::random()),
    };
    let report =
        ErrorReport::try_new("boom", None, Some(ErrorGroupId::new(99))).expect("report");

    let error = service.ingest(&grant, report).await.expect_err("bad group");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn analyze_passes_rendered_prompt_to_analyzer() {
    let owner = UserId::random();
    let log = stored_log(ProjectUid::random(), owner);
    let expected_prompt = AnalysisPrompt::for_log(&log);
    let mut mocks = Mocks::new();
    mocks
        .logs
        .expect_find_owned()
        .times(1)
        .return_once(move |_, _| Ok(Some(log)));
    mocks
        .analyzer
        .expect_analyze()
        .withf(move |prompt| prompt == &expected_prompt)
        .times(1)
        .returning(|_| Ok("check for null references".to_owned()));
    let service = mocks.into_service();

    let analysis = service
        .analyze(&OwnerScope::new(owner), ErrorLogId::new(1))
        .await
        .expect("analysis");

    assert_eq!(analysis.analysis, "check for null references");
}

#[tokio::test]
async fn analyze_hides_foreign_logs() {
    let mut mocks = Mocks::new();
    mocks
        .logs
        .expect_find_owned()
        .times(1)
        .return_once(|_, _| Ok(None));
    mocks.analyzer.expect_analyze().never();
    let service = mocks.into_service();

    let error = service
        .analyze(&OwnerScope::new(UserId::random()), ErrorLogId::new(1))
        .await
        .expect_err("hidden");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(ErrorLogPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(ErrorLogPersistenceError::query("boom"), ErrorCode::InternalError)]
#[case(ErrorLogPersistenceError::missing_reference("project"), ErrorCode::InvalidRequest)]
fn persistence_errors_map_to_codes(
    #[case] error: ErrorLogPersistenceError,
    #[case] expected: ErrorCode,
) {
    assert_eq!(map_error_log_error(error).code(), expected);
}
