//! PostgreSQL driver for the cronstore scheduler backend.
//!
//! Stores job definitions and execution logs as JSONB documents and
//! implements the insert-once lock on top of a unique key.

pub mod connection;
pub mod ident;
pub mod repo;
pub mod schema;

pub use connection::{PgConnection, PgDriver};
pub use ident::{Tables, quote_ident};
pub use repo::*;

use cronstore_config::StoreSettings;
use cronstore_core::{DriverRegistry, Error, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

/// Names the driver is registered under.
pub const DRIVER_NAMES: [&str; 2] = ["pgsql", "postgres"];

/// Create a new database connection pool.
pub async fn create_pool(settings: &StoreSettings) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.connect_timeout)
        .connect(&settings.dsn)
        .await
        .map_err(Error::connection)?;
    Ok(pool)
}

/// Register the PostgreSQL driver under each of [`DRIVER_NAMES`].
pub fn register(registry: &mut DriverRegistry) -> Result<()> {
    let driver = Arc::new(PgDriver);
    for name in DRIVER_NAMES {
        registry.register(name, driver.clone())?;
    }
    Ok(())
}
