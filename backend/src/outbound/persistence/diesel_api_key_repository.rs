//! PostgreSQL-backed `ApiKeyRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ApiKeyPersistenceError, ApiKeyRepository};
use crate::domain::{
    ApiKey, ApiKeyId, ApiKeySecret, ApiKeySummary, NewApiKey, ProjectId, ProjectUid, UserId,
};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{ApiKeyRow, NewApiKeyRow};
use super::pool::{DbPool, PoolError};
use super::schema::{api_keys, projects};

#[derive(Clone)]
pub struct DieselApiKeyRepository {
    pool: DbPool,
}

impl DieselApiKeyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ApiKeyPersistenceError {
    map_basic_pool_error(error, ApiKeyPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ApiKeyPersistenceError {
    match constraint_violation(&error) {
        Some(ConstraintViolation::Unique { .. }) => ApiKeyPersistenceError::duplicate_secret(),
        Some(ConstraintViolation::ForeignKey { .. }) => ApiKeyPersistenceError::missing_project(),
        None => map_basic_diesel_error(
            error,
            ApiKeyPersistenceError::query,
            ApiKeyPersistenceError::connection,
        ),
    }
}

fn row_to_api_key(row: ApiKeyRow) -> ApiKey {
    ApiKey {
        id: ApiKeyId::new(row.id),
        secret: ApiKeySecret::from(row.secret),
        project_id: ProjectId::new(row.project_id),
        owner: UserId::from(row.owner_id),
        created_at: row.created_at,
    }
}

#[async_trait]
impl ApiKeyRepository for DieselApiKeyRepository {
    async fn create(&self, key: &NewApiKey) -> Result<ApiKey, ApiKeyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewApiKeyRow {
            secret: *key.secret.as_uuid(),
            project_id: key.project_id.get(),
            owner_id: *key.owner.as_uuid(),
        };
        diesel::insert_into(api_keys::table)
            .values(&row)
            .returning(ApiKeyRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_api_key)
            .map_err(map_diesel_error)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<ApiKeySummary>, ApiKeyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(i64, String, uuid::Uuid, chrono::DateTime<chrono::Utc>)> = api_keys::table
            .inner_join(projects::table)
            .filter(api_keys::owner_id.eq(owner.as_uuid()))
            .order_by(api_keys::id.asc())
            .select((
                api_keys::id,
                projects::name,
                projects::uid,
                api_keys::created_at,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(id, project_name, uid, created_at)| ApiKeySummary {
                id: ApiKeyId::new(id),
                project_name,
                project: ProjectUid::from(uid),
                created_at,
            })
            .collect())
    }

    async fn delete_owned(
        &self,
        owner: &UserId,
        id: ApiKeyId,
    ) -> Result<bool, ApiKeyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            api_keys::table
                .filter(api_keys::id.eq(id.get()))
                .filter(api_keys::owner_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn find_for_project(
        &self,
        secret: ApiKeySecret,
        project: ProjectId,
    ) -> Result<Option<ApiKey>, ApiKeyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        api_keys::table
            .filter(api_keys::secret.eq(secret.as_uuid()))
            .filter(api_keys::project_id.eq(project.get()))
            .select(ApiKeyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(row_to_api_key))
            .map_err(map_diesel_error)
    }
}
