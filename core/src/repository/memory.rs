use std::cell::{Cell, RefCell};

use crate::error::Result;
use crate::model::collection::TaskCollection;
use crate::repository::traits::TaskStore;

/// In-process store. `None` means nothing has been saved yet.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    saved: RefCell<Option<TaskCollection>>,
    saves: Cell<usize>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(collection: TaskCollection) -> Self {
        Self {
            saved: RefCell::new(Some(collection)),
            saves: Cell::new(0),
        }
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl TaskStore for MemoryTaskStore {
    type Guard = ();

    fn exists(&self) -> bool {
        self.saved.borrow().is_some()
    }

    fn load(&self) -> Result<TaskCollection> {
        Ok(self.saved.borrow().clone().unwrap_or_default())
    }

    fn save(&self, collection: &TaskCollection) -> Result<()> {
        *self.saved.borrow_mut() = Some(collection.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn lock(&self) -> Result<()> {
        Ok(())
    }
}
