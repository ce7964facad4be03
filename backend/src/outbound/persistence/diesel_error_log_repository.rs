//! PostgreSQL-backed `ErrorLogRepository`.
//!
//! Logs are stored against the internal project id; reads join `projects`
//! to expose the external project UID and to scope by owner.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ErrorLogPersistenceError, ErrorLogRepository};
use crate::domain::{
    ErrorGroup, ErrorGroupId, ErrorLog, ErrorLogId, NewErrorLog, ProjectUid, UserId,
};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{ErrorGroupRow, ErrorLogRow, NewErrorLogRow};
use super::pool::{DbPool, PoolError};
use super::schema::{error_groups, error_logs, projects};

#[derive(Clone)]
pub struct DieselErrorLogRepository {
    pool: DbPool,
}

impl DieselErrorLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ErrorLogPersistenceError {
    map_basic_pool_error(error, ErrorLogPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ErrorLogPersistenceError {
    match constraint_violation(&error) {
        Some(ConstraintViolation::ForeignKey { constraint }) => {
            ErrorLogPersistenceError::missing_reference(
                constraint.unwrap_or_else(|| "foreign key".to_owned()),
            )
        }
        _ => map_basic_diesel_error(
            error,
            ErrorLogPersistenceError::query,
            ErrorLogPersistenceError::connection,
        ),
    }
}

type ScopedLogRow = (ErrorLogRow, Uuid, Uuid);

fn row_to_error_log((row, project_uid, owner_id): ScopedLogRow) -> ErrorLog {
    ErrorLog {
        id: ErrorLogId::new(row.id),
        error_message: row.error_message,
        environment: row.environment,
        created_at: row.created_at,
        project: ProjectUid::from(project_uid),
        error_group: row.error_group_id.map(ErrorGroupId::new),
        owner: UserId::from(owner_id),
    }
}

fn row_to_error_group(row: ErrorGroupRow) -> ErrorGroup {
    ErrorGroup {
        id: ErrorGroupId::new(row.id),
        created_at: row.created_at,
    }
}

#[async_trait]
impl ErrorLogRepository for DieselErrorLogRepository {
    async fn insert(&self, log: &NewErrorLog) -> Result<ErrorLog, ErrorLogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewErrorLogRow {
            error_message: &log.error_message,
            environment: log.environment.as_deref(),
            project_id: log.project_id.get(),
            error_group_id: log.error_group.map(ErrorGroupId::get),
        };
        let scoped: ScopedLogRow = conn
            .transaction(|conn| {
                async move {
                    let inserted: ErrorLogRow = diesel::insert_into(error_logs::table)
                        .values(&row)
                        .returning(ErrorLogRow::as_returning())
                        .get_result(conn)
                        .await?;
                    let (uid, owner_id): (Uuid, Uuid) = projects::table
                        .find(inserted.project_id)
                        .select((projects::uid, projects::owner_id))
                        .first(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((inserted, uid, owner_id))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_error_log(scoped))
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
        project: Option<ProjectUid>,
    ) -> Result<Vec<ErrorLog>, ErrorLogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = error_logs::table
            .inner_join(projects::table)
            .filter(projects::owner_id.eq(*owner.as_uuid()))
            .select((ErrorLogRow::as_select(), projects::uid, projects::owner_id))
            .order_by((error_logs::created_at.desc(), error_logs::id.desc()))
            .into_boxed();
        if let Some(uid) = project {
            query = query.filter(projects::uid.eq(*uid.as_uuid()));
        }
        let rows: Vec<ScopedLogRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_error_log).collect())
    }

    async fn find_owned(
        &self,
        owner: &UserId,
        id: ErrorLogId,
    ) -> Result<Option<ErrorLog>, ErrorLogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ScopedLogRow> = error_logs::table
            .inner_join(projects::table)
            .filter(error_logs::id.eq(id.get()))
            .filter(projects::owner_id.eq(owner.as_uuid()))
            .select((ErrorLogRow::as_select(), projects::uid, projects::owner_id))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_error_log))
    }

    async fn group_exists(&self, id: ErrorGroupId) -> Result<bool, ErrorLogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(error_groups::table.find(id.get())))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn list_groups(&self) -> Result<Vec<ErrorGroup>, ErrorLogPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ErrorGroupRow> = error_groups::table
            .order_by(error_groups::id.asc())
            .select(ErrorGroupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_error_group).collect())
    }
}
