//! PostgreSQL-backed user and profile repositories.
//!
//! A user row and its `free` profile row are written in one transaction so
//! every account always has exactly one profile.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{
    NewUser, StoredCredentials, UserPersistenceError, UserProfileRepository, UserRepository,
};
use crate::domain::{AccountType, PasswordHash, User, UserId, UserProfile, Username};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserProfileRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{user_profiles, users};

/// Diesel implementation of [`UserRepository`] and [`UserProfileRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_user(row: &UserRow) -> Result<User, UserPersistenceError> {
    let username = Username::new(&row.username).map_err(|err| {
        UserPersistenceError::query(format!("stored username is invalid: {err}"))
    })?;
    Ok(User::new(UserId::from(row.id), username, row.created_at))
}

fn parse_account_type(user_id: &UserId, raw: &str) -> AccountType {
    raw.parse().unwrap_or_else(|err| {
        warn!(user_id = %user_id, error = %err, "unrecognised account type, treating as free");
        AccountType::Free
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_ref(),
            password_hash: user.password_hash.as_str(),
        };
        let profile_row = NewUserProfileRow {
            user_id: *user.id.as_uuid(),
            account_type: AccountType::Free.as_str(),
        };

        let inserted: UserRow = conn
            .transaction(|conn| {
                async move {
                    let row = diesel::insert_into(users::table)
                        .values(&user_row)
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await?;
                    diesel::insert_into(user_profiles::table)
                        .values(&profile_row)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| match constraint_violation(&err) {
                Some(ConstraintViolation::Unique { .. }) => {
                    UserPersistenceError::duplicate_username(user.username.as_ref())
                }
                _ => map_diesel_error(err),
            })?;

        row_to_user(&inserted)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(StoredCredentials {
            user: row_to_user(&row)?,
            password_hash: PasswordHash::new(row.password_hash),
        }))
    }
}

#[async_trait]
impl UserProfileRepository for DieselUserRepository {
    async fn find_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(UserRow, String)> = users::table
            .inner_join(user_profiles::table)
            .filter(users::id.eq(user.as_uuid()))
            .select((UserRow::as_select(), user_profiles::account_type))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(user_row, account_type)| {
            Ok(UserProfile {
                account_type: parse_account_type(user, &account_type),
                user: row_to_user(&user_row)?,
            })
        })
        .transpose()
    }

    async fn set_account_type(
        &self,
        user: &UserId,
        account_type: AccountType,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let updated = diesel::update(user_profiles::table.find(user.as_uuid()))
                .set(user_profiles::account_type.eq(account_type.as_str()))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            if updated == 0 {
                return Ok(None);
            }
        }
        self.find_profile(user).await
    }
}
