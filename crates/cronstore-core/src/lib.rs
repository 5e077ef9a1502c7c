//! Core domain types and traits for the cronstore scheduler backend.
//!
//! This crate contains:
//! - Job and execution log documents
//! - The connection trait implemented by storage drivers
//! - The driver registry owned by the host scheduler
//! - Error types shared by every driver

pub mod connection;
pub mod document;
pub mod error;
pub mod registry;

pub use connection::{CronConnection, Pagination};
pub use document::{Document, Job, LogEntry, LogRecord};
pub use error::{BoxError, Error, Result};
pub use registry::{Driver, DriverRegistry};
