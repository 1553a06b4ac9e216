use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_FILE_NAME: &str = "data.json";

/// Where the storage file lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StorageLocator {
    /// `data.json` in the process's working directory.
    #[default]
    WorkingDir,
    /// `data.json` in the given directory.
    Dir(PathBuf),
    /// An explicit storage file.
    File(PathBuf),
}

impl StorageLocator {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        StorageLocator::Dir(dir.into())
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        StorageLocator::File(path.into())
    }

    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            StorageLocator::WorkingDir => {
                let cwd = env::current_dir().map_err(Error::Configuration)?;
                Ok(cwd.join(DEFAULT_FILE_NAME))
            }
            StorageLocator::Dir(dir) => Ok(dir.join(DEFAULT_FILE_NAME)),
            StorageLocator::File(path) => Ok(path.clone()),
        }
    }
}
