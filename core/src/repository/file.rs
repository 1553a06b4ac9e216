use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::collection::TaskCollection;
use crate::repository::lock::{FileLock, DEFAULT_LOCK_TIMEOUT};
use crate::repository::locator::StorageLocator;
use crate::repository::traits::TaskStore;

/// JSON file store: a single object mapping task id to record.
///
/// Mutations lock a sibling `<file>.lock` that is created on first use and
/// left in place afterwards; only its lock state matters, never its content.
/// Saves go through a sibling `<file>.tmp` that is renamed over the store.
#[derive(Debug, Clone)]
pub struct FileTaskStore {
    file_path: PathBuf,
    lock_timeout: Duration,
}

impl FileTaskStore {
    pub fn new(locator: &StorageLocator) -> Result<Self> {
        Ok(Self::at(locator.resolve()?))
    }

    pub fn at(file_path: impl Into<PathBuf>) -> Self {
        FileTaskStore {
            file_path: file_path.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.file_path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn write_atomic(&self, collection: &TaskCollection) -> io::Result<()> {
        let temp_path = self.sibling(".tmp");
        let result = (|| {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, collection)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            fs::rename(&temp_path, &self.file_path)
        })();
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }
}

impl TaskStore for FileTaskStore {
    type Guard = FileLock;

    fn exists(&self) -> bool {
        self.file_path.is_file()
    }

    fn load(&self) -> Result<TaskCollection> {
        let content = match fs::read(&self.file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(TaskCollection::new()),
            Err(source) => {
                return Err(Error::ReadFailure {
                    path: self.file_path.clone(),
                    source,
                })
            }
        };
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(TaskCollection::new());
        }

        let collection: TaskCollection =
            serde_json::from_slice(&content).map_err(|source| Error::CorruptData {
                path: self.file_path.clone(),
                source,
            })?;
        debug!(path = %self.file_path.display(), tasks = collection.len(), "loaded tasks");
        Ok(collection)
    }

    fn save(&self, collection: &TaskCollection) -> Result<()> {
        self.write_atomic(collection)
            .map_err(|e| Error::write(&self.file_path, e))?;
        debug!(path = %self.file_path.display(), tasks = collection.len(), "saved tasks");
        Ok(())
    }

    fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(self.sibling(".lock"), self.lock_timeout)
    }
}
