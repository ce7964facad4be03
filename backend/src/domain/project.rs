//! Project registry model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Owned, UserId};

/// Maximum project name length in characters.
pub const PROJECT_NAME_MAX: usize = 100;

/// Validation errors for project names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    EmptyName,
    NameTooLong { max: usize },
}

impl fmt::Display for ProjectValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "project name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "project name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for ProjectValidationError {}

/// Internal surrogate key used in paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(i64);

impl ProjectId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable external identifier clients use to address a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectUid(Uuid);

impl ProjectUid {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ProjectUid {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProjectUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human readable project name.
///
/// ## Invariants
/// - trimmed and non-empty;
/// - at most [`PROJECT_NAME_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectName(String);

impl ProjectName {
    /// Validate and construct a [`ProjectName`].
    ///
    /// # Examples
    /// ```
    /// use faultline::domain::ProjectName;
    ///
    /// assert_eq!(ProjectName::new(" Sample ").unwrap().as_ref(), "Sample");
    /// assert!(ProjectName::new("   ").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProjectValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }
        if trimmed.chars().count() > PROJECT_NAME_MAX {
            return Err(ProjectValidationError::NameTooLong {
                max: PROJECT_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ProjectName> for String {
    fn from(value: ProjectName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProjectName {
    type Error = ProjectValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Project {
    #[schema(value_type = i64, example = 1)]
    id: ProjectId,
    #[schema(value_type = String, format = Uuid)]
    uid: ProjectUid,
    #[schema(value_type = String, example = "Sample")]
    name: ProjectName,
    #[serde(rename = "user")]
    #[schema(value_type = String, format = Uuid)]
    owner: UserId,
    created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        id: ProjectId,
        uid: ProjectUid,
        name: ProjectName,
        owner: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            uid,
            name,
            owner,
            created_at,
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn uid(&self) -> ProjectUid {
        self.uid
    }

    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Owned for Project {
    fn owner(&self) -> &UserId {
        &self.owner
    }
}

/// Values required to insert a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub uid: ProjectUid,
    pub name: ProjectName,
    pub owner: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", ProjectValidationError::EmptyName)]
    #[case(" \t ", ProjectValidationError::EmptyName)]
    fn blank_names_are_rejected(#[case] raw: &str, #[case] expected: ProjectValidationError) {
        assert_eq!(ProjectName::new(raw), Err(expected));
    }

    #[rstest]
    fn name_length_is_bounded() {
        assert!(ProjectName::new("x".repeat(PROJECT_NAME_MAX)).is_ok());
        assert_eq!(
            ProjectName::new("x".repeat(PROJECT_NAME_MAX + 1)),
            Err(ProjectValidationError::NameTooLong {
                max: PROJECT_NAME_MAX
            })
        );
    }

    #[rstest]
    fn project_serialises_uid_as_string() {
        let project = Project::new(
            ProjectId::new(7),
            ProjectUid::from(Uuid::nil()),
            ProjectName::new("Sample").expect("name"),
            UserId::from(Uuid::nil()),
            Utc::now(),
        );
        let value = serde_json::to_value(&project).expect("serialise project");
        assert_eq!(value["id"], 7);
        assert_eq!(value["uid"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(value["name"], "Sample");
        assert_eq!(value["user"], "00000000-0000-0000-0000-000000000000");
    }
}
