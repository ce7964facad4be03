//! Minting, listing and revoking per-project API keys.
//!
//! Keys may only be minted by the owner of the target project. Referencing
//! a project that does not exist and referencing someone else's project are
//! both request errors, distinguished by their detail code.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    ApiKeyPersistenceError, ApiKeyRepository, ProjectRepository,
};
use crate::domain::project_service::map_project_error;
use crate::domain::{
    ApiKeyId, ApiKeySecret, ApiKeySummary, Error, IssuedApiKey, NewApiKey, OwnerScope, ProjectUid,
};

#[derive(Clone)]
pub struct ApiKeyService {
    keys: Arc<dyn ApiKeyRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl ApiKeyService {
    pub fn new(keys: Arc<dyn ApiKeyRepository>, projects: Arc<dyn ProjectRepository>) -> Self {
        Self { keys, projects }
    }

    /// Mint a key for `project`, which must belong to the scoped user.
    pub async fn issue(
        &self,
        scope: &OwnerScope,
        project: ProjectUid,
    ) -> Result<IssuedApiKey, Error> {
        let target = self
            .projects
            .find_by_uid(project)
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| project_field_error(project, "does_not_exist", "project does not exist"))?;
        if !scope.admits(&target) {
            warn!(user_id = %scope.user(), project = %project, "api key requested for foreign project");
            return Err(project_field_error(
                project,
                "not_owner",
                "you do not own this project",
            ));
        }
        let stored = self
            .keys
            .create(&NewApiKey {
                secret: ApiKeySecret::random(),
                project_id: target.id(),
                owner: *scope.user(),
            })
            .await
            .map_err(map_api_key_error)?;
        info!(
            user_id = %scope.user(),
            project_id = %target.id(),
            key = %stored.secret.fingerprint(),
            "issued api key"
        );
        Ok(IssuedApiKey {
            id: stored.id,
            key: stored.secret,
            project,
        })
    }

    pub async fn list(&self, scope: &OwnerScope) -> Result<Vec<ApiKeySummary>, Error> {
        self.keys
            .list_for_owner(scope.user())
            .await
            .map_err(map_api_key_error)
    }

    /// Delete a key. Absent and foreign keys are both reported as not found.
    pub async fn revoke(&self, scope: &OwnerScope, id: ApiKeyId) -> Result<(), Error> {
        let removed = self
            .keys
            .delete_owned(scope.user(), id)
            .await
            .map_err(map_api_key_error)?;
        if !removed {
            return Err(Error::not_found("api key not found"));
        }
        info!(user_id = %scope.user(), key_id = %id, "revoked api key");
        Ok(())
    }
}

fn project_field_error(project: ProjectUid, code: &str, message: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": "project",
        "code": code,
        "value": project.to_string(),
    }))
}

pub(crate) fn map_api_key_error(error: ApiKeyPersistenceError) -> Error {
    match error {
        ApiKeyPersistenceError::Connection { message } => Error::service_unavailable(message),
        ApiKeyPersistenceError::Query { message } => Error::internal(message),
        ApiKeyPersistenceError::DuplicateSecret => Error::conflict("api key already exists"),
        ApiKeyPersistenceError::MissingProject => Error::invalid_request("project does not exist"),
    }
}
