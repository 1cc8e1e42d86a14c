//! Typed failures callers are expected to branch on.
//!
//! Everything else travels as `anyhow::Error` with context. These variants are
//! wrapped into `anyhow::Error` as well; use `downcast_ref::<WaypointError>()`
//! to tell a missing input apart from a malformed one.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaypointError {
    /// A source directory, document, config file or log the caller named does not exist.
    #[error("{what} not found: {path}")]
    NotFound { what: &'static str, path: PathBuf },

    /// A persisted document is not valid JSON or does not match the document schema.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The log holds no `START` entry, so there is no journey to resume.
    #[error("no active waypoint journey in {log} (run `waypoint start` first)")]
    NoActiveJourney { log: String },
}

impl WaypointError {
    pub fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        WaypointError::NotFound {
            what,
            path: path.into(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        WaypointError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
