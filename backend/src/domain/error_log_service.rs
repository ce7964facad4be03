//! Error ingestion through API keys, owner-scoped listing and analysis.
//!
//! Ingestion is a two-step flow. [`ErrorLogService::authorize_ingestion`]
//! resolves the named project and checks that the presented key belongs to
//! it, yielding an [`IngestionGrant`]. Only a grant can be turned into a
//! stored log, so attribution always follows the key's project.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::api_key_service::map_api_key_error;
use crate::domain::ports::{
    ApiKeyRepository, ErrorAnalyzer, ErrorAnalyzerError, ErrorLogPersistenceError,
    ErrorLogRepository, ProjectRepository,
};
use crate::domain::project_service::map_project_error;
use crate::domain::{
    AnalysisPrompt, ApiKeySecret, Error, ErrorAnalysis, ErrorGroup, ErrorLog, ErrorLogId,
    ErrorReport, OwnerScope, Project, ProjectUid, api_key,
};

/// Collaborators required by [`ErrorLogService`].
#[derive(Clone)]
pub struct ErrorLogServiceDeps {
    pub logs: Arc<dyn ErrorLogRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub keys: Arc<dyn ApiKeyRepository>,
    pub analyzer: Arc<dyn ErrorAnalyzer>,
}

#[derive(Clone)]
pub struct ErrorLogService {
    logs: Arc<dyn ErrorLogRepository>,
    projects: Arc<dyn ProjectRepository>,
    keys: Arc<dyn ApiKeyRepository>,
    analyzer: Arc<dyn ErrorAnalyzer>,
}

/// Proof that an API key was accepted for a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionGrant {
    project: Project,
}

impl IngestionGrant {
    pub fn project(&self) -> &Project {
        &self.project
    }
}

impl ErrorLogService {
    pub fn new(deps: ErrorLogServiceDeps) -> Self {
        let ErrorLogServiceDeps {
            logs,
            projects,
            keys,
            analyzer,
        } = deps;
        Self {
            logs,
            projects,
            keys,
            analyzer,
        }
    }

    /// Check that `raw_key` is a key for the project identified by `project`.
    ///
    /// Unknown projects are request errors. Unknown keys, malformed keys and
    /// keys bound to another project are all rejected as unauthorized.
    pub async fn authorize_ingestion(
        &self,
        raw_key: &str,
        project: ProjectUid,
    ) -> Result<IngestionGrant, Error> {
        let target = self
            .projects
            .find_by_uid(project)
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| Error::invalid_request("invalid project identifier"))?;
        let key = match ApiKeySecret::parse(raw_key) {
            Some(secret) => self
                .keys
                .find_for_project(secret, target.id())
                .await
                .map_err(map_api_key_error)?,
            None => None,
        };
        if key.is_none() {
            warn!(
                project = %project,
                key = %api_key::fingerprint(raw_key.as_bytes()),
                "api key rejected for project"
            );
            return Err(Error::unauthorized("invalid key or key/project mismatch"));
        }
        Ok(IngestionGrant { project: target })
    }

    /// Store a report against the granted project.
    pub async fn ingest(&self, grant: &IngestionGrant, report: ErrorReport) -> Result<ErrorLog, Error> {
        if let Some(group) = report.error_group() {
            let exists = self
                .logs
                .group_exists(group)
                .await
                .map_err(map_error_log_error)?;
            if !exists {
                return Err(Error::invalid_request(format!(
                    "error group {group} does not exist"
                )));
            }
        }
        let log = self
            .logs
            .insert(&report.for_project(grant.project.id()))
            .await
            .map_err(map_error_log_error)?;
        info!(project_id = %grant.project.id(), error_log_id = log.id.get(), "ingested error log");
        Ok(log)
    }

    /// The scoped user's logs, newest first.
    pub async fn list(
        &self,
        scope: &OwnerScope,
        project: Option<ProjectUid>,
    ) -> Result<Vec<ErrorLog>, Error> {
        self.logs
            .list_for_owner(scope.user(), project)
            .await
            .map_err(map_error_log_error)
    }

    pub async fn list_groups(&self) -> Result<Vec<ErrorGroup>, Error> {
        self.logs.list_groups().await.map_err(map_error_log_error)
    }

    /// Analyse one of the scoped user's logs.
    pub async fn analyze(&self, scope: &OwnerScope, id: ErrorLogId) -> Result<ErrorAnalysis, Error> {
        let log = self
            .logs
            .find_owned(scope.user(), id)
            .await
            .map_err(map_error_log_error)?;
        let Some(log) = scope.filter(log) else {
            return Err(Error::not_found("error log not found"));
        };
        let prompt = AnalysisPrompt::for_log(&log);
        let analysis = self
            .analyzer
            .analyze(&prompt)
            .await
            .map_err(map_analyzer_error)?;
        Ok(ErrorAnalysis { analysis })
    }
}

fn map_error_log_error(error: ErrorLogPersistenceError) -> Error {
    match error {
        ErrorLogPersistenceError::Connection { message } => Error::service_unavailable(message),
        ErrorLogPersistenceError::Query { message } => Error::internal(message),
        ErrorLogPersistenceError::MissingReference { message } => Error::invalid_request(message),
    }
}

fn map_analyzer_error(error: ErrorAnalyzerError) -> Error {
    match error {
        ErrorAnalyzerError::Unavailable { message } => Error::service_unavailable(message),
        ErrorAnalyzerError::Failed { message } => Error::internal(message),
    }
}

#[cfg(test)]
#[path = "error_log_service_tests.rs"]
mod tests;
