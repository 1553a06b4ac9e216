use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::collection::TaskCollection;
use crate::model::task::TaskId;

/// How a new task's id is derived from the current collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdAllocator {
    /// `len + 1`. After a deletion this can hand out an id that is still in
    /// use, and the new task then replaces the old one.
    CollectionSize,
    /// One past the highest live id. Never collides with a live task.
    #[default]
    HighWaterMark,
}

impl IdAllocator {
    /// Fails with `IdsExhausted` rather than wrapping past `TaskId::MAX`.
    pub fn next_id(&self, collection: &TaskCollection) -> Result<TaskId> {
        let next = match self {
            IdAllocator::CollectionSize => TaskId::try_from(collection.len())
                .ok()
                .and_then(|len| len.checked_add(1)),
            IdAllocator::HighWaterMark => match collection.max_id() {
                Some(max) => max.checked_add(1),
                None => Some(1),
            },
        };
        next.ok_or(Error::IdsExhausted)
    }
}

impl fmt::Display for IdAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdAllocator::CollectionSize => f.write_str("count"),
            IdAllocator::HighWaterMark => f.write_str("max"),
        }
    }
}

impl FromStr for IdAllocator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "count" => Ok(IdAllocator::CollectionSize),
            "max" => Ok(IdAllocator::HighWaterMark),
            _ => Err(format!("unknown id strategy '{}' (expected count or max)", s)),
        }
    }
}
