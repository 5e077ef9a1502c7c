//! Named storage drivers.
//!
//! The host builds a [`DriverRegistry`] at startup, registers the drivers
//! it links against, and asks it for connections by name.

use crate::{CronConnection, Error, Result};
use cronstore_config::Settings;
use std::collections::HashMap;
use std::sync::Arc;

/// Factory for connections of one storage backend.
pub trait Driver: Send + Sync {
    /// Build an unopened connection from the host's options.
    fn connection(&self, settings: &Settings) -> Result<Box<dyn CronConnection>>;
}

/// Registry mapping driver names to drivers.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn Driver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `driver` under `name`. Names are unique.
    pub fn register(&mut self, name: impl Into<String>, driver: Arc<dyn Driver>) -> Result<()> {
        let name = name.into();
        if self.drivers.contains_key(&name) {
            return Err(Error::DuplicateDriver(name));
        }
        self.drivers.insert(name, driver);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.drivers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build an unopened connection through the driver registered as `name`.
    pub fn connect(&self, name: &str, settings: &Settings) -> Result<Box<dyn CronConnection>> {
        let driver = self
            .drivers
            .get(name)
            .ok_or_else(|| Error::UnknownDriver(name.to_string()))?;
        driver.connection(settings)
    }

    /// Drop every registration.
    pub fn teardown(&mut self) {
        self.drivers.clear();
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}
