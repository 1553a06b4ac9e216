//! Error types for the task store and mutation operations.
//!
//! `NoTasksExist` and `TaskNotFound` are ordinary outcomes the caller reports
//! to the user. Everything else aborts the current invocation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::task::TaskId;

/// Exit codes for the CLI layer
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIGURATION: i32 = 1;
    pub const STORAGE: i32 = 2;
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("no tasks created yet")]
    NoTasksExist,

    #[error("task not found (ID: {0})")]
    TaskNotFound(TaskId),

    #[error("task data in {path} is corrupt: {source}")]
    CorruptData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not resolve the working directory: {0}")]
    Configuration(#[source] io::Error),

    #[error("could not lock {0}: another invocation is still running")]
    LockFailed(PathBuf),

    #[error("no task ids left to assign")]
    IdsExhausted,
}

impl Error {
    /// Whether this is an expected outcome rather than a failure of the invocation.
    pub fn is_expected(&self) -> bool {
        matches!(self, Error::NoTasksExist | Error::TaskNotFound(_))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NoTasksExist | Error::TaskNotFound(_) => exit_codes::SUCCESS,
            Error::Configuration(_) => exit_codes::CONFIGURATION,
            Error::CorruptData { .. }
            | Error::ReadFailure { .. }
            | Error::WriteFailure { .. }
            | Error::LockFailed(_)
            | Error::IdsExhausted => exit_codes::STORAGE,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::WriteFailure {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
