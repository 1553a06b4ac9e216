use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::task::{Task, TaskId, TaskRecord};

/// All known tasks keyed by id. Iteration is in ascending id order.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct TaskCollection {
    records: BTreeMap<TaskId, TaskRecord>,
}

impl<'de> Deserialize<'de> for TaskCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = BTreeMap::<TaskId, TaskRecord>::deserialize(deserializer)?;
        if records.contains_key(&0) {
            return Err(D::Error::custom("task ids must be positive, found 0"));
        }
        if let Some((id, _)) = records.iter().find(|(_, r)| r.updated_at < r.created_at) {
            return Err(D::Error::custom(format!(
                "task {} was updated before it was created",
                id
            )));
        }
        Ok(Self { records })
    }
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn max_id(&self) -> Option<TaskId> {
        self.records.keys().next_back().copied()
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.records
            .get(&id)
            .cloned()
            .map(|record| Task::from_record(id, record))
    }

    /// Inserts or replaces the task stored under `task.id`, returning the replaced one.
    pub fn insert(&mut self, task: Task) -> Option<Task> {
        let (id, record) = task.into_record();
        self.records
            .insert(id, record)
            .map(|old| Task::from_record(id, old))
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        self.records
            .remove(&id)
            .map(|record| Task::from_record(id, record))
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.records
            .iter()
            .map(|(id, record)| Task::from_record(*id, record.clone()))
            .collect()
    }
}

impl FromIterator<Task> for TaskCollection {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        let mut collection = TaskCollection::new();
        for task in iter {
            collection.insert(task);
        }
        collection
    }
}
