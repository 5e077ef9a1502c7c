//! Idempotent schema provisioning.

use crate::Tables;
use cronstore_core::{Error, Result};
use sqlx::PgPool;
use tracing::debug;

/// DDL for the store, in execution order.
pub fn statements(tables: &Tables) -> Vec<String> {
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", tables.schema),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                name TEXT PRIMARY KEY,
                data JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
            tables.jobs
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                job TEXT NOT NULL,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
            tables.logs
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (job, id DESC)",
            tables.logs_index, tables.logs
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                name TEXT PRIMARY KEY,
                expired_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
            tables.locks
        ),
    ]
}

/// Create the schema, tables and index if they do not exist.
///
/// Runs in one transaction holding an advisory lock keyed on the jobs
/// table, so instances starting together provision one at a time.
pub async fn provision(pool: &PgPool, tables: &Tables) -> Result<()> {
    let mut tx = pool.begin().await.map_err(Error::query)?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(&tables.jobs)
        .execute(&mut *tx)
        .await
        .map_err(Error::query)?;

    for sql in statements(tables) {
        sqlx::query(&sql)
            .execute(&mut *tx)
            .await
            .map_err(Error::query)?;
    }

    tx.commit().await.map_err(Error::query)?;
    debug!(jobs = %tables.jobs, logs = %tables.logs, locks = %tables.locks, "Schema provisioned");
    Ok(())
}
