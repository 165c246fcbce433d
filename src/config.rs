//! Store configuration
//!
//! Passed explicitly to `RecordStore::open` so every caller (CLI, tests)
//! owns an isolated database.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

pub const DEFAULT_DATABASE_FILE: &str = "cdr_data.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    InMemory,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub location: DatabaseLocation,
    /// Delete an existing database file before connecting
    pub reset: bool,
}

impl StoreConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DatabaseLocation::File(path.into()),
            reset: false,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: DatabaseLocation::InMemory,
            reset: false,
        }
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// sqlx connection URL
    pub fn database_url(&self) -> String {
        match &self.location {
            DatabaseLocation::File(path) => format!("sqlite:{}?mode=rwc", path.display()),
            DatabaseLocation::InMemory => "sqlite::memory:".to_string(),
        }
    }

    /// Pool settings for this location.
    ///
    /// An in-memory database lives only as long as its connection, so that
    /// pool holds exactly one connection and never reaps it.
    pub fn pool_options(&self) -> SqlitePoolOptions {
        match self.location {
            DatabaseLocation::File(_) => SqlitePoolOptions::new().max_connections(5),
            DatabaseLocation::InMemory => SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>),
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        match &self.location {
            DatabaseLocation::File(path) => Some(path),
            DatabaseLocation::InMemory => None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::file(DEFAULT_DATABASE_FILE)
    }
}
