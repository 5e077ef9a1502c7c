//! Job and execution log documents.
//!
//! Both are stored as schema-less JSON objects. Only the keys this crate
//! needs (`name`, `disabled`, `job`) are typed; everything else the
//! scheduler puts in a document is carried through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque structured document.
pub type Document = serde_json::Map<String, Value>;

/// Keys of a job document held by typed fields rather than `data`.
const JOB_KEYS: [&str; 2] = ["name", "disabled"];

/// A named, schedulable unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
    /// Scheduler-defined fields (schedule expression, payload, ...).
    #[serde(flatten)]
    pub data: Document,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set a field, routing `name` and `disabled` to their typed slots.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            "name" => {
                if let Value::String(name) = value {
                    self.name = name;
                }
            }
            "disabled" => {
                if let Value::Bool(disabled) = value {
                    self.disabled = disabled;
                }
            }
            _ => {
                self.data.insert(key, value);
            }
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Remove `data` entries that would shadow `name` or `disabled` when
    /// the job is encoded; flattened keys are written after typed ones.
    pub fn strip_reserved(&mut self) {
        for key in JOB_KEYS {
            self.data.remove(key);
        }
    }
}

/// One execution record, as appended by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Name of the job this entry belongs to.
    #[serde(default)]
    pub job: String,
    #[serde(flatten)]
    pub data: Document,
}

impl LogEntry {
    pub fn new(job: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            data: Document::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if key == "job" {
            if let Value::String(job) = value {
                self.job = job;
            }
        } else {
            self.data.insert(key, value);
        }
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Remove a `job` entry from `data` so it cannot shadow the typed field.
    pub fn strip_reserved(&mut self) {
        self.data.remove("job");
    }
}

/// A stored log entry together with its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Surrogate key; higher ids were inserted later.
    pub id: i64,
    pub job: String,
    pub entry: LogEntry,
    pub created_at: DateTime<Utc>,
}
