//! PostgreSQL-backed session token blacklist.
//!
//! `revoke` inserts with `ON CONFLICT DO NOTHING` and reports whether a row
//! was written, so two concurrent refreshes of one token cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::TokenId;
use crate::domain::ports::{TokenBlacklist, TokenBlacklistError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewRevokedTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::revoked_tokens;

#[derive(Clone)]
pub struct DieselTokenBlacklist {
    pool: DbPool,
}

impl DieselTokenBlacklist {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TokenBlacklistError {
    map_basic_pool_error(error, TokenBlacklistError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TokenBlacklistError {
    map_basic_diesel_error(
        error,
        TokenBlacklistError::query,
        TokenBlacklistError::connection,
    )
}

#[async_trait]
impl TokenBlacklist for DieselTokenBlacklist {
    async fn revoke(
        &self,
        jti: TokenId,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, TokenBlacklistError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(revoked_tokens::table)
            .values(&NewRevokedTokenRow {
                jti: *jti.as_uuid(),
                expires_at,
            })
            .on_conflict(revoked_tokens::jti)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }

    async fn is_revoked(&self, jti: TokenId) -> Result<bool, TokenBlacklistError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(revoked_tokens::table.find(jti.as_uuid())))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
