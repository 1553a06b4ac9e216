pub mod file;
pub mod lock;
pub mod locator;
pub mod memory;
pub mod traits;

// Re-export
pub use file::FileTaskStore;
pub use locator::{StorageLocator, DEFAULT_FILE_NAME};
pub use memory::MemoryTaskStore;
pub use traits::TaskStore;
