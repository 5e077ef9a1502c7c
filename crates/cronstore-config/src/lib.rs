//! Connection settings for the cronstore scheduler backend.
//!
//! This crate handles:
//! - The loosely-typed option map handed over by the host scheduler
//! - Loading that map from KDL text
//! - Resolving it into a DSN, table names and pool limits

pub mod error;
pub mod settings;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use settings::{Settings, parse_settings};
pub use store::{StoreSettings, keyword_dsn_to_url, normalize_url, resolve_dsn};
