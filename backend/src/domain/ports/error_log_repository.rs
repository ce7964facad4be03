//! Port for error log and error group persistence.

use async_trait::async_trait;

use crate::domain::{ErrorGroup, ErrorGroupId, ErrorLog, ErrorLogId, NewErrorLog, ProjectUid, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by error log repository adapters.
    pub enum ErrorLogPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "error log repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "error log repository query failed: {message}",
        /// The log referenced a project or group that does not exist.
        MissingReference { message: String } => "error log reference missing: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ErrorLogRepository: Send + Sync {
    /// Insert a log and return the stored record.
    async fn insert(&self, log: &NewErrorLog) -> Result<ErrorLog, ErrorLogPersistenceError>;

    /// Logs of projects owned by `owner`, newest first, optionally narrowed
    /// to one project.
    async fn list_for_owner(
        &self,
        owner: &UserId,
        project: Option<ProjectUid>,
    ) -> Result<Vec<ErrorLog>, ErrorLogPersistenceError>;

    /// Log `id` when its project is owned by `owner`.
    async fn find_owned(
        &self,
        owner: &UserId,
        id: ErrorLogId,
    ) -> Result<Option<ErrorLog>, ErrorLogPersistenceError>;

    /// Whether group `id` exists.
    async fn group_exists(&self, id: ErrorGroupId) -> Result<bool, ErrorLogPersistenceError>;

    /// Every error group, ordered by id ascending.
    async fn list_groups(&self) -> Result<Vec<ErrorGroup>, ErrorLogPersistenceError>;
}
