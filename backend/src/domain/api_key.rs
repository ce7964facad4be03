//! API keys minted per project for ingestion clients.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Owned, ProjectId, ProjectUid, UserId};

/// Internal surrogate key used in paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyId(i64);

impl ApiKeyId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque secret presented in the `API-Key` header.
///
/// `Debug` never prints the secret; use [`ApiKeySecret::fingerprint`] in
/// logs instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeySecret(Uuid);

impl ApiKeySecret {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a presented header value. Anything other than a UUID cannot
    /// name a stored key.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short SHA-256 fingerprint safe to emit in logs.
    ///
    /// # Examples
    /// ```
    /// use faultline::domain::ApiKeySecret;
    ///
    /// let secret = ApiKeySecret::random();
    /// assert_eq!(secret.fingerprint().len(), 16);
    /// ```
    pub fn fingerprint(&self) -> String {
        fingerprint(self.0.to_string().as_bytes())
    }
}

/// Hex-encoded prefix of the SHA-256 digest of `raw`.
pub fn fingerprint(raw: &[u8]) -> String {
    let digest = Sha256::digest(raw);
    hex::encode(&digest[..8])
}

impl From<Uuid> for ApiKeySecret {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Debug for ApiKeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKeySecret({})", self.fingerprint())
    }
}

impl fmt::Display for ApiKeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub secret: ApiKeySecret,
    pub project_id: ProjectId,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
}

impl Owned for ApiKey {
    fn owner(&self) -> &UserId {
        &self.owner
    }
}

/// Values required to insert an API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApiKey {
    pub secret: ApiKeySecret,
    pub project_id: ProjectId,
    pub owner: UserId,
}

/// A freshly minted key. This is the only time the secret leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IssuedApiKey {
    #[schema(value_type = i64)]
    pub id: ApiKeyId,
    #[schema(value_type = String, format = Uuid)]
    pub key: ApiKeySecret,
    #[schema(value_type = String, format = Uuid)]
    pub project: ProjectUid,
}

/// Listing entry for an API key; never carries the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ApiKeySummary {
    #[schema(value_type = i64)]
    pub id: ApiKeyId,
    pub project_name: String,
    #[schema(value_type = String, format = Uuid)]
    pub project: ProjectUid,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn debug_output_uses_fingerprint() {
        let secret = ApiKeySecret::random();
        let rendered = format!("{secret:?}");
        assert!(!rendered.contains(&secret.to_string()));
        assert!(rendered.contains(&secret.fingerprint()));
    }

    #[rstest]
    #[case("not-a-key", false)]
    #[case("", false)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6 ", true)]
    fn parse_accepts_only_uuids(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(ApiKeySecret::parse(raw).is_some(), expected);
    }

    #[rstest]
    fn fingerprint_is_stable() {
        let secret = ApiKeySecret::from(Uuid::nil());
        assert_eq!(secret.fingerprint(), secret.fingerprint());
        assert_ne!(secret.fingerprint(), ApiKeySecret::random().fingerprint());
    }
}
