//! Error types for lexa-pipeline.

use std::fmt;
use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Optional features of a [`ResultSet`](crate::ResultSet) switched on by configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    Annotations,
    Export,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Annotations => write!(f, "annotations"),
            Capability::Export => write!(f, "export"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The top-level archive could not be opened. The only fatal run outcome.
    #[error("failed to open archive '{name}': {source}")]
    ArchiveOpen {
        name: String,
        #[source]
        source: lexa_archive::Error,
    },

    #[error("import cancelled")]
    Cancelled,

    #[error("{0} capability is disabled")]
    CapabilityDisabled(Capability),

    #[error("no result at '{0}'")]
    UnknownResult(String),

    #[error("scoring client unavailable: {0}")]
    Scoring(#[from] lexa_score::ScoreError),

    #[error("background task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ArchiveOpen { .. })
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Task(e.to_string())
    }
}
