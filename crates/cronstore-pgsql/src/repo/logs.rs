//! Execution log store.

use crate::Tables;
use chrono::{DateTime, Utc};
use cronstore_core::{Error, LogEntry, LogRecord, Pagination, Result};
use sqlx::PgPool;

/// A raw log row before its document is decoded.
#[derive(Debug, sqlx::FromRow)]
struct LogRow {
    id: i64,
    job: String,
    data: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl LogRow {
    fn into_record(self) -> Result<LogRecord> {
        let entry = serde_json::from_value::<LogEntry>(self.data)
            .map_err(|source| Error::Decode {
                id: self.id,
                source,
            })?;
        Ok(LogRecord {
            id: self.id,
            job: self.job,
            entry,
            created_at: self.created_at,
        })
    }
}

/// PostgreSQL append-only log store.
pub struct PgLogRepo {
    pool: PgPool,
    insert_sql: String,
    count_sql: String,
    page_sql: String,
}

impl PgLogRepo {
    pub fn new(pool: PgPool, tables: &Tables) -> Self {
        Self {
            pool,
            insert_sql: format!(
                "INSERT INTO {} (job, data, created_at) VALUES ($1, $2, now())",
                tables.logs
            ),
            count_sql: format!("SELECT count(1) FROM {} WHERE job = $1", tables.logs),
            page_sql: format!(
                r#"
                SELECT id, job, data, created_at
                FROM {}
                WHERE job = $1
                ORDER BY id DESC
                OFFSET $2 LIMIT $3
                "#,
                tables.logs
            ),
        }
    }

    /// Append one entry under `entry.job`.
    pub async fn append(&self, mut entry: LogEntry) -> Result<()> {
        entry.strip_reserved();
        let data = serde_json::to_value(&entry)?;

        sqlx::query(&self.insert_sql)
            .bind(&entry.job)
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(Error::query)?;
        Ok(())
    }

    /// Total entries for `job` and one page of them, newest first.
    ///
    /// Any entry that fails to decode fails the whole call.
    pub async fn history(
        &self,
        job: &str,
        offset: i64,
        limit: i64,
    ) -> Result<(i64, Vec<LogRecord>)> {
        let total: i64 = sqlx::query_scalar(&self.count_sql)
            .bind(job)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::query)?;
        if total == 0 {
            return Ok((0, Vec::new()));
        }

        let page = Pagination::normalize(offset, limit, total);
        let rows = sqlx::query_as::<_, LogRow>(&self.page_sql)
            .bind(job)
            .bind(page.offset)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::query)?;

        let records = rows
            .into_iter()
            .map(LogRow::into_record)
            .collect::<Result<Vec<_>>>()?;
        Ok((total, records))
    }
}
