pub mod error;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;

pub use error::{Error, Result};
pub use model::collection::TaskCollection;
pub use model::task::{Status, Task, TaskId, TaskRecord};
pub use repository::{
    FileTaskStore, MemoryTaskStore, StorageLocator, TaskStore, DEFAULT_FILE_NAME,
};
pub use service::id_allocator::IdAllocator;
pub use service::task_service::TaskService;
pub use time::{Clock, SystemClock};
