//! Insert-once distributed lock.
//!
//! A lock row, once inserted, is never updated or deleted here. Keys
//! that must be taken more than once need to be unique per attempt
//! (e.g., job name plus scheduling tick).

use crate::Tables;
use cronstore_core::{Error, Result};
use sqlx::PgPool;
use std::time::Duration;

/// PostgreSQL lock table.
pub struct PgLockRepo {
    pool: PgPool,
    acquire_sql: String,
}

impl PgLockRepo {
    pub fn new(pool: PgPool, tables: &Tables) -> Self {
        Self {
            pool,
            acquire_sql: format!(
                r#"
                INSERT INTO {} (name, expired_at, updated_at)
                VALUES ($1, now(), now())
                ON CONFLICT (name) DO NOTHING
                RETURNING 1
                "#,
                tables.locks
            ),
        }
    }

    /// Try to insert the lock row for `key`.
    ///
    /// `Ok(true)` when this call inserted it, `Ok(false)` when the row
    /// already existed. `_ttl` is accepted but existing rows never expire.
    pub async fn acquire(&self, key: &str, _ttl: Duration) -> Result<bool> {
        let inserted: Option<i32> = sqlx::query_scalar(&self.acquire_sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::query)?;
        Ok(inserted.is_some())
    }
}
