//! Error kinds shared by every core operation
//!
//! - `Validation` - missing/empty case attributes or column assignments; caller re-collects input
//! - `NotFound` - a referenced case, tower or call event does not exist
//! - `Io` - a CSV input or report output could not be opened, read or written
//! - `Serialization` - a stored extra-field blob failed to round-trip

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("extra field blob is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Error::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::not_found("case", 42);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "case not found: 42");
    }

    #[test]
    fn test_io_message_includes_path() {
        let err = Error::io(
            "/tmp/towers.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/tmp/towers.csv"));
        assert!(!err.is_not_found());
    }
}
