//! Connection lifecycle and the `CronConnection` implementation.

use crate::repo::{PgJobRepo, PgLockRepo, PgLogRepo};
use crate::{Tables, create_pool, schema};
use async_trait::async_trait;
use cronstore_config::{Settings, StoreSettings};
use cronstore_core::{
    CronConnection, Driver, Error, Job, LogEntry, LogRecord, Result,
};
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Everything that exists only while the connection is open.
struct Store {
    pool: PgPool,
    jobs: PgJobRepo,
    logs: PgLogRepo,
    locks: PgLockRepo,
}

/// A PostgreSQL-backed cron store.
pub struct PgConnection {
    settings: StoreSettings,
    tables: Tables,
    store: RwLock<Option<Arc<Store>>>,
}

impl PgConnection {
    pub fn new(settings: StoreSettings) -> Self {
        let tables = Tables::new(&settings);
        Self {
            settings,
            tables,
            store: RwLock::new(None),
        }
    }

    /// Resolve raw host options and build an unopened connection.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(StoreSettings::resolve(settings)?))
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub async fn is_open(&self) -> bool {
        self.store.read().await.is_some()
    }

    async fn store(&self) -> Result<Arc<Store>> {
        self.store.read().await.clone().ok_or(Error::NotOpen)
    }

    /// Run `op` under the operation deadline.
    async fn run<T>(&self, op: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.settings.operation_timeout, op).await {
            Ok(result) => result.map_err(|e| self.classify(e)),
            Err(_) => Err(Error::Timeout(self.settings.operation_timeout)),
        }
    }

    /// Report pool acquisition timeouts as timeouts rather than query errors.
    fn classify(&self, err: Error) -> Error {
        match err {
            Error::Query(source)
                if matches!(
                    source.downcast_ref::<sqlx::Error>(),
                    Some(sqlx::Error::PoolTimedOut)
                ) =>
            {
                Error::Timeout(self.settings.connect_timeout)
            }
            other => other,
        }
    }
}

#[async_trait]
impl CronConnection for PgConnection {
    fn name(&self) -> &'static str {
        "pgsql"
    }

    async fn open(&self) -> Result<()> {
        let pool = create_pool(&self.settings).await?;

        if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
            pool.close().await;
            return Err(Error::connection(e));
        }

        if let Err(e) = self.run(schema::provision(&pool, &self.tables)).await {
            pool.close().await;
            return Err(e);
        }

        let store = Store {
            jobs: PgJobRepo::new(pool.clone(), &self.tables),
            logs: PgLogRepo::new(pool.clone(), &self.tables),
            locks: PgLockRepo::new(pool.clone(), &self.tables),
            pool,
        };

        let previous = self.store.write().await.replace(Arc::new(store));
        if let Some(previous) = previous {
            warn!("Connection opened twice, closing the previous pool");
            previous.pool.close().await;
        }

        debug!(schema = %self.settings.schema, "Cron store opened");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let store = self.store.write().await.take();
        if let Some(store) = store {
            store.pool.close().await;
            debug!("Cron store closed");
        }
        Ok(())
    }

    async fn add(&self, name: &str, job: Job) -> Result<()> {
        let store = self.store().await?;
        self.run(store.jobs.upsert(name, job)).await
    }

    async fn enable(&self, name: &str) -> Result<()> {
        let store = self.store().await?;
        self.run(store.jobs.set_disabled(name, false)).await?;
        Ok(())
    }

    async fn disable(&self, name: &str) -> Result<()> {
        let store = self.store().await?;
        self.run(store.jobs.set_disabled(name, true)).await?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let store = self.store().await?;
        self.run(store.jobs.remove(name)).await
    }

    async fn list(&self) -> Result<BTreeMap<String, Job>> {
        let store = self.store().await?;
        self.run(store.jobs.list()).await
    }

    async fn append_log(&self, entry: LogEntry) -> Result<()> {
        let store = self.store().await?;
        self.run(store.logs.append(entry)).await
    }

    async fn history(
        &self,
        job: &str,
        offset: i64,
        limit: i64,
    ) -> Result<(i64, Vec<LogRecord>)> {
        let store = self.store().await?;
        self.run(store.logs.history(job, offset, limit)).await
    }

    async fn lock(&self, key: &str, ttl: Duration) -> Result<bool> {
        let store = self.store().await?;
        self.run(store.locks.acquire(key, ttl)).await
    }
}

/// Driver producing [`PgConnection`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct PgDriver;

impl Driver for PgDriver {
    fn connection(&self, settings: &Settings) -> Result<Box<dyn CronConnection>> {
        Ok(Box::new(PgConnection::from_settings(settings)?))
    }
}
