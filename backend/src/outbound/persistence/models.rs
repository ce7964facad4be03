//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    api_keys, error_groups, error_logs, projects, revoked_tokens, user_profiles, users,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_profiles)]
pub(crate) struct NewUserProfileRow<'a> {
    pub user_id: Uuid,
    pub account_type: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: i64,
    pub uid: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub(crate) struct NewProjectRow<'a> {
    pub uid: Uuid,
    pub name: &'a str,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = api_keys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApiKeyRow {
    pub id: i64,
    pub secret: Uuid,
    pub project_id: i64,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = api_keys)]
pub(crate) struct NewApiKeyRow {
    pub secret: Uuid,
    pub project_id: i64,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = error_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ErrorGroupRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = error_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ErrorLogRow {
    pub id: i64,
    pub error_message: String,
    pub environment: Option<String>,
    pub project_id: i64,
    pub error_group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = error_logs)]
pub(crate) struct NewErrorLogRow<'a> {
    pub error_message: &'a str,
    pub environment: Option<&'a str>,
    pub project_id: i64,
    pub error_group_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = revoked_tokens)]
pub(crate) struct NewRevokedTokenRow {
    pub jti: Uuid,
    pub expires_at: DateTime<Utc>,
}
