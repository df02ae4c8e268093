//! Session builder.
//!
//! Assembles a [`Session`] from a configuration and, optionally, a table
//! source that is loaded before the session is handed out.

use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use crate::storage::{CsvFile, TableSource};
use std::path::PathBuf;

/// Builder for a session with a custom configuration and reference table.
#[derive(Debug)]
pub struct SessionBuilder {
    config: Config,
    source: Option<Box<dyn TableSource>>,
    radius_km: Option<f64>,
}

impl SessionBuilder {
    /// Create a builder with the default configuration and no table.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            source: None,
            radius_km: None,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Load the reference table from `source` when building.
    pub fn table<S: TableSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Load the reference table from a CSV file when building.
    pub fn table_path<P: Into<PathBuf>>(self, path: P) -> Self {
        self.table(CsvFile(path.into()))
    }

    /// Start with this radius instead of the configured default.
    pub fn radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = Some(radius_km);
        self
    }

    /// Build the session, loading the table if one was given.
    pub fn build(self) -> Result<Session> {
        let mut session = Session::new(self.config)?;
        if let Some(radius_km) = self.radius_km {
            session.set_radius(radius_km)?;
        }
        if let Some(source) = self.source {
            session.load_table(source.as_ref())?;
        }
        Ok(session)
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
