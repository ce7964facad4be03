//! Process-local store implementing every persistence port.
//!
//! Used when no database URL is configured and by the HTTP and BDD tests.
//! The store mirrors the relational constraints of the PostgreSQL schema:
//! usernames, project UIDs and key secrets are unique, and deleting a
//! project removes its keys and logs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    ApiKeyPersistenceError, ApiKeyRepository, ErrorLogPersistenceError, ErrorLogRepository,
    NewUser, ProjectPersistenceError, ProjectRepository, StoredCredentials, TokenBlacklist,
    TokenBlacklistError, UserPersistenceError, UserProfileRepository, UserRepository,
};
use crate::domain::{
    AccountType, ApiKey, ApiKeyId, ApiKeySecret, ApiKeySummary, ErrorGroup, ErrorGroupId,
    ErrorLog, ErrorLogId, NewApiKey, NewErrorLog, NewProject, Owned, PasswordHash, Project,
    ProjectId, ProjectName, ProjectUid, TokenId, User, UserId, UserProfile,
};

struct UserRecord {
    user: User,
    password_hash: PasswordHash,
    account_type: AccountType,
}

struct LogRecord {
    id: ErrorLogId,
    error_message: String,
    environment: Option<String>,
    project_id: ProjectId,
    error_group: Option<ErrorGroupId>,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: Vec<UserRecord>,
    projects: Vec<Project>,
    api_keys: Vec<ApiKey>,
    error_groups: Vec<ErrorGroup>,
    error_logs: Vec<LogRecord>,
    revoked: HashMap<TokenId, DateTime<Utc>>,
    next_project_id: i64,
    next_api_key_id: i64,
    next_error_group_id: i64,
    next_error_log_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl State {
    fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id() == id)
    }

    fn scoped_log(&self, record: &LogRecord) -> Option<ErrorLog> {
        let project = self.project(record.project_id)?;
        Some(ErrorLog {
            id: record.id,
            error_message: record.error_message.clone(),
            environment: record.environment.clone(),
            created_at: record.created_at,
            project: project.uid(),
            error_group: record.error_group,
            owner: *project.owner(),
        })
    }

    fn profile(&self, user: &UserId) -> Option<UserProfile> {
        self.users
            .iter()
            .find(|record| record.user.id() == user)
            .map(|record| UserProfile {
                user: record.user.clone(),
                account_type: record.account_type,
            })
    }
}

/// Shared in-memory implementation of the persistence ports.
///
/// Cloning yields another handle onto the same state.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryStore {
    /// Create an empty store stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new error group and return it.
    ///
    /// Groups are provisioned out of band; the HTTP surface only reads them.
    pub fn add_error_group(&self) -> ErrorGroup {
        let created_at = self.clock.utc();
        let mut state = self.lock();
        let group = ErrorGroup {
            id: ErrorGroupId::new(next_id(&mut state.next_error_group_id)),
            created_at,
        };
        state.error_groups.push(group.clone());
        group
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let created_at = self.clock.utc();
        let mut state = self.lock();
        if state
            .users
            .iter()
            .any(|record| record.user.username() == &user.username)
        {
            return Err(UserPersistenceError::duplicate_username(
                user.username.to_string(),
            ));
        }
        let stored = User::new(user.id, user.username.clone(), created_at);
        state.users.push(UserRecord {
            user: stored.clone(),
            password_hash: user.password_hash.clone(),
            account_type: AccountType::default(),
        });
        Ok(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|record| record.user.id() == id)
            .map(|record| record.user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|record| record.user.username().as_ref() == username)
            .map(|record| StoredCredentials {
                user: record.user.clone(),
                password_hash: record.password_hash.clone(),
            }))
    }
}

#[async_trait]
impl UserProfileRepository for InMemoryStore {
    async fn find_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        Ok(self.lock().profile(user))
    }

    async fn set_account_type(
        &self,
        user: &UserId,
        account_type: AccountType,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        let mut state = self.lock();
        if let Some(record) = state
            .users
            .iter_mut()
            .find(|record| record.user.id() == user)
        {
            record.account_type = account_type;
        }
        Ok(state.profile(user))
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn create(&self, project: &NewProject) -> Result<Project, ProjectPersistenceError> {
        let created_at = self.clock.utc();
        let mut state = self.lock();
        if state.projects.iter().any(|stored| stored.uid() == project.uid) {
            return Err(ProjectPersistenceError::duplicate_uid(
                project.uid.to_string(),
            ));
        }
        let stored = Project::new(
            ProjectId::new(next_id(&mut state.next_project_id)),
            project.uid,
            project.name.clone(),
            project.owner,
            created_at,
        );
        state.projects.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Project>, ProjectPersistenceError> {
        Ok(self
            .lock()
            .projects
            .iter()
            .filter(|project| project.owner() == owner)
            .cloned()
            .collect())
    }

    async fn find_owned(
        &self,
        owner: &UserId,
        id: ProjectId,
    ) -> Result<Option<Project>, ProjectPersistenceError> {
        Ok(self
            .lock()
            .project(id)
            .filter(|project| project.owner() == owner)
            .cloned())
    }

    async fn find_by_uid(
        &self,
        uid: ProjectUid,
    ) -> Result<Option<Project>, ProjectPersistenceError> {
        Ok(self
            .lock()
            .projects
            .iter()
            .find(|project| project.uid() == uid)
            .cloned())
    }

    async fn rename_owned(
        &self,
        owner: &UserId,
        id: ProjectId,
        name: &ProjectName,
    ) -> Result<Option<Project>, ProjectPersistenceError> {
        let mut state = self.lock();
        let Some(slot) = state
            .projects
            .iter_mut()
            .find(|project| project.id() == id && project.owner() == owner)
        else {
            return Ok(None);
        };
        *slot = Project::new(
            slot.id(),
            slot.uid(),
            name.clone(),
            *slot.owner(),
            slot.created_at(),
        );
        Ok(Some(slot.clone()))
    }

    async fn delete_owned(
        &self,
        owner: &UserId,
        id: ProjectId,
    ) -> Result<bool, ProjectPersistenceError> {
        let mut state = self.lock();
        let before = state.projects.len();
        state
            .projects
            .retain(|project| !(project.id() == id && project.owner() == owner));
        if state.projects.len() == before {
            return Ok(false);
        }
        state.api_keys.retain(|key| key.project_id != id);
        state.error_logs.retain(|log| log.project_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryStore {
    async fn create(&self, key: &NewApiKey) -> Result<ApiKey, ApiKeyPersistenceError> {
        let created_at = self.clock.utc();
        let mut state = self.lock();
        if state.project(key.project_id).is_none() {
            return Err(ApiKeyPersistenceError::missing_project());
        }
        if state.api_keys.iter().any(|stored| stored.secret == key.secret) {
            return Err(ApiKeyPersistenceError::duplicate_secret());
        }
        let stored = ApiKey {
            id: ApiKeyId::new(next_id(&mut state.next_api_key_id)),
            secret: key.secret,
            project_id: key.project_id,
            owner: key.owner,
            created_at,
        };
        state.api_keys.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<ApiKeySummary>, ApiKeyPersistenceError> {
        let state = self.lock();
        Ok(state
            .api_keys
            .iter()
            .filter(|key| &key.owner == owner)
            .filter_map(|key| {
                let project = state.project(key.project_id)?;
                Some(ApiKeySummary {
                    id: key.id,
                    project_name: project.name().to_string(),
                    project: project.uid(),
                    created_at: key.created_at,
                })
            })
            .collect())
    }

    async fn delete_owned(
        &self,
        owner: &UserId,
        id: ApiKeyId,
    ) -> Result<bool, ApiKeyPersistenceError> {
        let mut state = self.lock();
        let before = state.api_keys.len();
        state
            .api_keys
            .retain(|key| !(key.id == id && &key.owner == owner));
        Ok(state.api_keys.len() != before)
    }

    async fn find_for_project(
        &self,
        secret: ApiKeySecret,
        project: ProjectId,
    ) -> Result<Option<ApiKey>, ApiKeyPersistenceError> {
        Ok(self
            .lock()
            .api_keys
            .iter()
            .find(|key| key.secret == secret && key.project_id == project)
            .cloned())
    }
}

#[async_trait]
impl ErrorLogRepository for InMemoryStore {
    async fn insert(&self, log: &NewErrorLog) -> Result<ErrorLog, ErrorLogPersistenceError> {
        let created_at = self.clock.utc();
        let mut state = self.lock();
        if state.project(log.project_id).is_none() {
            return Err(ErrorLogPersistenceError::missing_reference("project"));
        }
        let group_missing = log
            .error_group
            .is_some_and(|group| !state.error_groups.iter().any(|stored| stored.id == group));
        if group_missing {
            return Err(ErrorLogPersistenceError::missing_reference("error group"));
        }
        let record = LogRecord {
            id: ErrorLogId::new(next_id(&mut state.next_error_log_id)),
            error_message: log.error_message.clone(),
            environment: log.environment.clone(),
            project_id: log.project_id,
            error_group: log.error_group,
            created_at,
        };
        let stored = state
            .scoped_log(&record)
            .ok_or_else(|| ErrorLogPersistenceError::missing_reference("project"))?;
        state.error_logs.push(record);
        Ok(stored)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        project: Option<ProjectUid>,
    ) -> Result<Vec<ErrorLog>, ErrorLogPersistenceError> {
        let state = self.lock();
        let mut logs: Vec<ErrorLog> = state
            .error_logs
            .iter()
            .filter_map(|record| state.scoped_log(record))
            .filter(|log| &log.owner == owner)
            .filter(|log| project.is_none_or(|uid| log.project == uid))
            .collect();
        logs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.get().cmp(&a.id.get()))
        });
        Ok(logs)
    }

    async fn find_owned(
        &self,
        owner: &UserId,
        id: ErrorLogId,
    ) -> Result<Option<ErrorLog>, ErrorLogPersistenceError> {
        let state = self.lock();
        Ok(state
            .error_logs
            .iter()
            .filter(|record| record.id == id)
            .find_map(|record| state.scoped_log(record))
            .filter(|log| &log.owner == owner))
    }

    async fn group_exists(&self, id: ErrorGroupId) -> Result<bool, ErrorLogPersistenceError> {
        Ok(self.lock().error_groups.iter().any(|group| group.id == id))
    }

    async fn list_groups(&self) -> Result<Vec<ErrorGroup>, ErrorLogPersistenceError> {
        Ok(self.lock().error_groups.clone())
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryStore {
    async fn revoke(
        &self,
        jti: TokenId,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, TokenBlacklistError> {
        let mut state = self.lock();
        if state.revoked.contains_key(&jti) {
            return Ok(false);
        }
        state.revoked.insert(jti, expires_at);
        Ok(true)
    }

    async fn is_revoked(&self, jti: TokenId) -> Result<bool, TokenBlacklistError> {
        Ok(self.lock().revoked.contains_key(&jti))
    }
}
