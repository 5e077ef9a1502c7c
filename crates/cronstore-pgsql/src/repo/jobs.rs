//! Job registry.

use crate::Tables;
use cronstore_core::{Error, Job, Result};
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::debug;

/// PostgreSQL job registry.
pub struct PgJobRepo {
    pool: PgPool,
    upsert_sql: String,
    set_disabled_sql: String,
    delete_sql: String,
    delete_logs_sql: String,
    list_sql: String,
}

impl PgJobRepo {
    pub fn new(pool: PgPool, tables: &Tables) -> Self {
        Self {
            pool,
            upsert_sql: format!(
                r#"
                INSERT INTO {} (name, data, updated_at) VALUES ($1, $2, now())
                ON CONFLICT (name) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
                "#,
                tables.jobs
            ),
            set_disabled_sql: format!(
                r#"
                UPDATE {}
                SET data = jsonb_set(data, '{{disabled}}', to_jsonb($2::boolean), true), updated_at = now()
                WHERE name = $1
                "#,
                tables.jobs
            ),
            delete_sql: format!("DELETE FROM {} WHERE name = $1", tables.jobs),
            delete_logs_sql: format!("DELETE FROM {} WHERE job = $1", tables.logs),
            list_sql: format!("SELECT name, data FROM {}", tables.jobs),
        }
    }

    /// Insert the job or replace its whole document.
    pub async fn upsert(&self, name: &str, job: Job) -> Result<()> {
        let data = encode(name, job)?;

        sqlx::query(&self.upsert_sql)
            .bind(name)
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(Error::query)?;
        Ok(())
    }

    /// Set `disabled` inside the stored document, leaving other fields alone.
    /// Returns the number of rows touched (0 when the job does not exist).
    pub async fn set_disabled(&self, name: &str, disabled: bool) -> Result<u64> {
        let result = sqlx::query(&self.set_disabled_sql)
            .bind(name)
            .bind(disabled)
            .execute(&self.pool)
            .await
            .map_err(Error::query)?;
        Ok(result.rows_affected())
    }

    /// Delete the job and its log entries in one transaction.
    pub async fn remove(&self, name: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::query)?;

        sqlx::query(&self.delete_sql)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(Error::query)?;

        let logs = sqlx::query(&self.delete_logs_sql)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(Error::query)?;

        tx.commit().await.map_err(Error::query)?;
        debug!(job = %name, logs = logs.rows_affected(), "Removed job");
        Ok(())
    }

    /// All jobs keyed by name. Rows whose document does not decode are skipped.
    pub async fn list(&self) -> Result<BTreeMap<String, Job>> {
        let rows = sqlx::query_as::<_, (String, serde_json::Value)>(&self.list_sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::query)?;

        let mut jobs = BTreeMap::new();
        for (name, data) in rows {
            match serde_json::from_value::<Job>(data) {
                Ok(mut job) => {
                    job.name = name.clone();
                    jobs.insert(name, job);
                }
                Err(e) => {
                    debug!(job = %name, error = %e, "Skipping undecodable job document");
                }
            }
        }
        Ok(jobs)
    }
}

/// The stored form of `job` under `name`.
fn encode(name: &str, mut job: Job) -> Result<serde_json::Value> {
    job.name = name.to_string();
    job.strip_reserved();
    Ok(serde_json::to_value(&job)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cronstore_config::{Settings, StoreSettings};
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    fn repo() -> PgJobRepo {
        let settings = StoreSettings::resolve(&Settings::new()).unwrap();
        let pool = PgPoolOptions::new().connect_lazy(&settings.dsn).unwrap();
        PgJobRepo::new(pool, &Tables::new(&settings))
    }

    #[tokio::test]
    async fn test_statements_target_quoted_tables() {
        let repo = repo();
        assert!(repo.upsert_sql.contains("INSERT INTO \"public\".\"cron_jobs\""));
        assert!(repo.upsert_sql.contains("ON CONFLICT (name) DO UPDATE"));
        assert!(repo.set_disabled_sql.contains("'{disabled}'"));
        assert_eq!(repo.delete_sql, "DELETE FROM \"public\".\"cron_jobs\" WHERE name = $1");
        assert_eq!(
            repo.delete_logs_sql,
            "DELETE FROM \"public\".\"cron_logs\" WHERE job = $1"
        );
    }

    #[test]
    fn test_encode_uses_given_name() {
        let data = encode("backup", Job::new("stale").with_field("schedule", "@daily")).unwrap();
        assert_eq!(
            data,
            json!({"name": "backup", "disabled": false, "schedule": "@daily"})
        );
    }

    #[test]
    fn test_encode_ignores_reserved_keys_in_data() {
        let mut job = Job::new("backup");
        job.disabled = true;
        job.data.insert("name".to_string(), json!("other"));
        job.data.insert("disabled".to_string(), json!("no"));

        let data = encode("backup", job).unwrap();
        assert_eq!(data, json!({"name": "backup", "disabled": true}));

        let decoded: Job = serde_json::from_value(data).unwrap();
        assert_eq!(decoded.name, "backup");
        assert!(decoded.disabled);
    }
}
