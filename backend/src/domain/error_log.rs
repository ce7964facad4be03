//! Ingested error events and their (placeholder) groups.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Owned, ProjectId, ProjectUid, UserId};

/// Validation errors for ingestion payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLogValidationError {
    EmptyMessage,
}

impl fmt::Display for ErrorLogValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error_message must not be empty"),
        }
    }
}

impl std::error::Error for ErrorLogValidationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorLogId(i64);

impl ErrorLogId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorGroupId(i64);

impl ErrorGroupId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ErrorGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated ingestion payload, before it is bound to a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    error_message: String,
    environment: Option<String>,
    error_group: Option<ErrorGroupId>,
}

impl ErrorReport {
    /// Validate the client-supplied parts of an error event.
    ///
    /// Blank environments are treated as absent.
    ///
    /// # Examples
    /// ```
    /// use faultline::domain::ErrorReport;
    ///
    /// let report = ErrorReport::try_new("NullPointerException", Some(" "), None).unwrap();
    /// assert_eq!(report.environment(), None);
    /// assert!(ErrorReport::try_new("  ", None, None).is_err());
    /// ```
    pub fn try_new(
        error_message: &str,
        environment: Option<&str>,
        error_group: Option<ErrorGroupId>,
    ) -> Result<Self, ErrorLogValidationError> {
        if error_message.trim().is_empty() {
            return Err(ErrorLogValidationError::EmptyMessage);
        }
        let environment = environment
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        Ok(Self {
            error_message: error_message.to_owned(),
            environment,
            error_group,
        })
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    pub fn error_group(&self) -> Option<ErrorGroupId> {
        self.error_group
    }

    /// Bind the report to the project resolved from the caller's API key.
    pub fn for_project(self, project_id: ProjectId) -> NewErrorLog {
        NewErrorLog {
            error_message: self.error_message,
            environment: self.environment,
            project_id,
            error_group: self.error_group,
        }
    }
}

/// Values required to insert an error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewErrorLog {
    pub error_message: String,
    pub environment: Option<String>,
    pub project_id: ProjectId,
    pub error_group: Option<ErrorGroupId>,
}

/// Stored error event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorLog {
    #[schema(value_type = i64)]
    pub id: ErrorLogId,
    pub error_message: String,
    pub environment: Option<String>,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = Uuid)]
    pub project: ProjectUid,
    #[schema(value_type = Option<i64>)]
    pub error_group: Option<ErrorGroupId>,
    #[serde(skip)]
    pub owner: UserId,
}

impl Owned for ErrorLog {
    fn owner(&self) -> &UserId {
        &self.owner
    }
}

/// Clustering target for error logs. Never populated by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorGroup {
    #[schema(value_type = i64)]
    pub id: ErrorGroupId,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_messages_are_rejected(#[case] message: &str) {
        assert_eq!(
            ErrorReport::try_new(message, None, None),
            Err(ErrorLogValidationError::EmptyMessage)
        );
    }

    #[rstest]
    fn for_project_keeps_report_fields() {
        let report = ErrorReport::try_new(
            "NullPointerException",
            Some("production"),
            Some(ErrorGroupId::new(3)),
        )
        .expect("valid report");

        let new_log = report.for_project(ProjectId::new(9));

        assert_eq!(new_log.error_message, "NullPointerException");
        assert_eq!(new_log.environment.as_deref(), Some("production"));
        assert_eq!(new_log.project_id, ProjectId::new(9));
        assert_eq!(new_log.error_group, Some(ErrorGroupId::new(3)));
    }
}
