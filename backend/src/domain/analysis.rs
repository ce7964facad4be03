//! Prompt construction for error analysis.

use chrono::SecondsFormat;
use serde::Serialize;
use utoipa::ToSchema;

use super::ErrorLog;

/// Prompt handed to an [`crate::domain::ports::ErrorAnalyzer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt(String);

impl AnalysisPrompt {
    /// Render the analysis prompt for `log`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use faultline::domain::{
    ///     AnalysisPrompt, ErrorLog, ErrorLogId, ProjectUid, UserId,
    /// };
    ///
    /// let log = ErrorLog {
    ///     id: ErrorLogId::new(1),
    ///     error_message: "NullPointerException".into(),
    ///     environment: None,
    ///     created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
    ///     project: ProjectUid::random(),
    ///     error_group: None,
    ///     owner: UserId::random(),
    /// };
    /// let prompt = AnalysisPrompt::for_log(&log);
    /// assert!(prompt.as_str().contains("Environment: N/A"));
    /// ```
    pub fn for_log(log: &ErrorLog) -> Self {
        let environment = log.environment.as_deref().unwrap_or("N/A");
        let timestamp = log.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        Self(format!(
            "Analyze the following error log:\n\n\
             Error Message: {message}\n\
             Environment: {environment}\n\
             Timestamp: {timestamp}\n\n\
             What could be the possible cause of this error, and what steps can fix it?",
            message = log.error_message,
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Response body of the analyzer endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorAnalysis {
    pub analysis: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorLogId, ProjectUid, UserId};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn log(environment: Option<&str>) -> ErrorLog {
        ErrorLog {
            id: ErrorLogId::new(4),
            error_message: "KeyError: 'id'".to_owned(),
            environment: environment.map(str::to_owned),
            created_at: Utc
                .with_ymd_and_hms(2024, 5, 6, 7, 8, 9)
                .single()
                .expect("valid timestamp"),
            project: ProjectUid::random(),
            error_group: None,
            owner: UserId::random(),
        }
    }

    #[rstest]
    fn renders_full_template() {
        let prompt = AnalysisPrompt::for_log(&log(Some("staging")));
        assert_eq!(
            prompt.as_str(),
            "Analyze the following error log:\n\n\
             Error Message: KeyError: 'id'\n\
             Environment: staging\n\
             Timestamp: 2024-05-06T07:08:09Z\n\n\
             What could be the possible cause of this error, and what steps can fix it?"
        );
    }

    #[rstest]
    fn missing_environment_renders_placeholder() {
        let prompt = AnalysisPrompt::for_log(&log(None));
        assert!(prompt.as_str().contains("Environment: N/A\n"));
    }
}
