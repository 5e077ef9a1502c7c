//! The storage boundary consumed by the scheduler.

use crate::{Job, LogEntry, LogRecord, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

/// Durable state and coordination for a distributed scheduler.
///
/// Implementations hold nothing but a pooled handle; every call goes to
/// the backing store, so concurrent callers always see current state.
#[async_trait]
pub trait CronConnection: Send + Sync {
    /// Driver name (e.g., "pgsql").
    fn name(&self) -> &'static str;

    /// Connect, verify reachability and provision the schema.
    async fn open(&self) -> Result<()>;

    /// Release pooled resources. A no-op when not open.
    async fn close(&self) -> Result<()>;

    /// Insert or fully replace the job stored under `name`.
    async fn add(&self, name: &str, job: Job) -> Result<()>;

    /// Clear the job's `disabled` flag. Missing jobs are ignored.
    async fn enable(&self, name: &str) -> Result<()>;

    /// Set the job's `disabled` flag. Missing jobs are ignored.
    async fn disable(&self, name: &str) -> Result<()>;

    /// Delete a job and all of its log entries atomically.
    async fn remove(&self, name: &str) -> Result<()>;

    /// Every job that decodes, keyed by name.
    async fn list(&self) -> Result<BTreeMap<String, Job>>;

    /// Append an execution record for `entry.job`.
    async fn append_log(&self, entry: LogEntry) -> Result<()>;

    /// Total count and one page of a job's log, most recent first.
    async fn history(&self, job: &str, offset: i64, limit: i64)
    -> Result<(i64, Vec<LogRecord>)>;

    /// Try once to take the lock `key`. Contention yields `Ok(false)`.
    async fn lock(&self, key: &str, ttl: Duration) -> Result<bool>;
}

/// Offset/limit after applying the history paging policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

impl Pagination {
    /// Negative offsets start from the beginning; a non-positive limit
    /// means "everything", i.e. `total` rows.
    pub fn normalize(offset: i64, limit: i64, total: i64) -> Self {
        Self {
            offset: offset.max(0),
            limit: if limit <= 0 { total } else { limit },
        }
    }
}
