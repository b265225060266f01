//! Crate-level error type.
//!
//! Only fatal conditions surface here. Malformed feed lines are logged and
//! skipped by the ingester; they become a `SimError` only when a caller
//! parses a feed strictly.

use std::path::PathBuf;

use thiserror::Error;

use crate::feed::FeedError;
use crate::validation::ValidationError;

/// Errors that abort a simulation before or while it runs.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration rejected at startup.
    #[error("invalid configuration: {}", join(.0))]
    InvalidConfig(Vec<ValidationError>),

    /// The feed could not be opened.
    #[error("cannot read feed {}: {source}", .path.display())]
    FeedUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A feed line was rejected by strict parsing.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// A worker thread could not be started.
    #[error("failed to start {name} worker: {source}")]
    WorkerSpawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked.
    #[error("{0} worker panicked")]
    WorkerPanicked(&'static str),
}

impl From<Vec<ValidationError>> for SimError {
    fn from(errors: Vec<ValidationError>) -> Self {
        SimError::InvalidConfig(errors)
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
