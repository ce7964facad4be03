//! PostgreSQL-backed `ProjectRepository`.
//!
//! Owner-scoped statements carry the owner in their `WHERE` clause, so a
//! foreign project is never loaded. Deleting a project relies on the
//! `ON DELETE CASCADE` foreign keys to remove its keys and logs.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProjectPersistenceError, ProjectRepository};
use crate::domain::{NewProject, Project, ProjectId, ProjectName, ProjectUid, UserId};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewProjectRow, ProjectRow};
use super::pool::{DbPool, PoolError};
use super::schema::projects;

#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProjectPersistenceError {
    map_basic_pool_error(error, ProjectPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProjectPersistenceError {
    map_basic_diesel_error(
        error,
        ProjectPersistenceError::query,
        ProjectPersistenceError::connection,
    )
}

fn row_to_project(row: ProjectRow) -> Result<Project, ProjectPersistenceError> {
    let name = ProjectName::new(&row.name).map_err(|err| {
        ProjectPersistenceError::query(format!("stored project name is invalid: {err}"))
    })?;
    Ok(Project::new(
        ProjectId::new(row.id),
        ProjectUid::from(row.uid),
        name,
        UserId::from(row.owner_id),
        row.created_at,
    ))
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn create(&self, project: &NewProject) -> Result<Project, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewProjectRow {
            uid: *project.uid.as_uuid(),
            name: project.name.as_ref(),
            owner_id: *project.owner.as_uuid(),
        };
        let inserted = diesel::insert_into(projects::table)
            .values(&row)
            .returning(ProjectRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match constraint_violation(&err) {
                Some(ConstraintViolation::Unique { .. }) => {
                    ProjectPersistenceError::duplicate_uid(project.uid.to_string())
                }
                _ => map_diesel_error(err),
            })?;
        row_to_project(inserted)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProjectRow> = projects::table
            .filter(projects::owner_id.eq(owner.as_uuid()))
            .order_by(projects::id.asc())
            .select(ProjectRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_project).collect()
    }

    async fn find_owned(
        &self,
        owner: &UserId,
        id: ProjectId,
    ) -> Result<Option<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        projects::table
            .filter(projects::id.eq(id.get()))
            .filter(projects::owner_id.eq(owner.as_uuid()))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_project)
            .transpose()
    }

    async fn find_by_uid(
        &self,
        uid: ProjectUid,
    ) -> Result<Option<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        projects::table
            .filter(projects::uid.eq(uid.as_uuid()))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_project)
            .transpose()
    }

    async fn rename_owned(
        &self,
        owner: &UserId,
        id: ProjectId,
        name: &ProjectName,
    ) -> Result<Option<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            projects::table
                .filter(projects::id.eq(id.get()))
                .filter(projects::owner_id.eq(owner.as_uuid())),
        )
        .set(projects::name.eq(name.as_ref()))
        .returning(ProjectRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .map(row_to_project)
        .transpose()
    }

    async fn delete_owned(
        &self,
        owner: &UserId,
        id: ProjectId,
    ) -> Result<bool, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            projects::table
                .filter(projects::id.eq(id.get()))
                .filter(projects::owner_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
