use crate::error::Result;
use crate::model::collection::TaskCollection;

/// Whole-collection persistence. Every mutation is one `load` and one `save`.
pub trait TaskStore {
    /// Held for the duration of a load-mutate-save cycle.
    type Guard;

    fn exists(&self) -> bool;
    /// Returns an empty collection when nothing has been stored yet.
    fn load(&self) -> Result<TaskCollection>;
    /// Replaces the stored collection in full.
    fn save(&self, collection: &TaskCollection) -> Result<()>;
    fn lock(&self) -> Result<Self::Guard>;
}

impl<T: TaskStore + ?Sized> TaskStore for &T {
    type Guard = T::Guard;

    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn load(&self) -> Result<TaskCollection> {
        (**self).load()
    }

    fn save(&self, collection: &TaskCollection) -> Result<()> {
        (**self).save(collection)
    }

    fn lock(&self) -> Result<Self::Guard> {
        (**self).lock()
    }
}
