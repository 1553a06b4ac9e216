use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::collection::TaskCollection;
use crate::model::task::{Status, Task, TaskId};
use crate::repository::TaskStore;
use crate::service::id_allocator::IdAllocator;
use crate::time::{Clock, SystemClock};

/// Applies one change per call: load the whole collection, change it, save it back.
/// Nothing is cached between calls.
pub struct TaskService<S: TaskStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    allocator: IdAllocator,
}

impl<S: TaskStore> TaskService<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: TaskStore, C: Clock> TaskService<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            allocator: IdAllocator::default(),
        }
    }

    pub fn with_allocator(mut self, allocator: IdAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a `todo` task and returns its id. Creates the storage file if needed.
    pub fn add_task(&self, description: impl Into<String>) -> Result<TaskId> {
        let _guard = self.store.lock()?;
        let mut tasks = self.store.load()?;

        let id = self.allocator.next_id(&tasks)?;
        let task = Task::new(id, description.into(), self.clock.now());
        if let Some(replaced) = tasks.insert(task) {
            warn!(
                id,
                replaced = %replaced.description,
                "new task reused a live id and replaced it"
            );
        }

        self.store.save(&tasks)?;
        info!(id, "task added");
        Ok(id)
    }

    pub fn update_task(&self, id: TaskId, description: impl Into<String>) -> Result<()> {
        let description = description.into();
        self.modify(id, "update", |tasks, mut task, now| {
            task.set_description(description, now);
            tasks.insert(task);
        })
    }

    pub fn delete_task(&self, id: TaskId) -> Result<()> {
        self.modify(id, "delete", |tasks, task, _| {
            tasks.remove(task.id);
        })
    }

    pub fn mark_in_progress(&self, id: TaskId) -> Result<()> {
        self.set_status(id, Status::InProgress)
    }

    pub fn mark_done(&self, id: TaskId) -> Result<()> {
        self.set_status(id, Status::Done)
    }

    pub fn set_status(&self, id: TaskId, status: Status) -> Result<()> {
        self.modify(id, status.as_str(), |tasks, mut task, now| {
            task.set_status(status, now);
            tasks.insert(task);
        })
    }

    /// All tasks in ascending id order. Empty when nothing is stored.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.store.load()?.tasks())
    }

    pub fn list_by_status(&self, status: Status) -> Result<Vec<Task>> {
        let mut tasks = self.list_tasks()?;
        tasks.retain(|t| t.status == status);
        Ok(tasks)
    }

    pub fn get_task(&self, id: TaskId) -> Result<Task> {
        if !self.store.exists() {
            return Err(Error::NoTasksExist);
        }
        self.store.load()?.get(id).ok_or(Error::TaskNotFound(id))
    }

    // The absence check runs before locking so a missing store stays missing.
    fn modify<F>(&self, id: TaskId, operation: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut TaskCollection, Task, DateTime<Utc>),
    {
        if !self.store.exists() {
            return Err(Error::NoTasksExist);
        }
        let _guard = self.store.lock()?;
        let mut tasks = self.store.load()?;
        let task = tasks.get(id).ok_or(Error::TaskNotFound(id))?;

        apply(&mut tasks, task, self.clock.now());

        self.store.save(&tasks)?;
        info!(id, operation, "task modified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{FileTaskStore, MemoryTaskStore, StorageLocator};
    use crate::time::SteppingClock;
    use chrono::{Duration, TimeZone};
    use std::fs;
    use tempfile::TempDir;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn service() -> TaskService<MemoryTaskStore, SteppingClock> {
        TaskService::with_clock(
            MemoryTaskStore::new(),
            SteppingClock::new(start(), Duration::seconds(1)),
        )
    }

    fn file_service(dir: &TempDir) -> TaskService<FileTaskStore, SteppingClock> {
        let store = FileTaskStore::new(&StorageLocator::in_dir(dir.path())).unwrap();
        TaskService::with_clock(store, SteppingClock::new(start(), Duration::seconds(1)))
    }

    #[test]
    fn test_add_to_empty_storage() {
        let dir = TempDir::new().unwrap();
        let service = file_service(&dir);

        let id = service.add_task("buy milk").unwrap();
        assert_eq!(id, 1);

        let tasks = service.store().load().unwrap();
        assert_eq!(tasks.len(), 1);
        let task = tasks.get(1).unwrap();
        assert_eq!(task.description, "buy milk");
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.created_at, task.updated_at);

        let content = fs::read_to_string(dir.path().join("data.json")).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(raw["1"]["status"], "todo");
    }

    #[test]
    fn test_add_second_task() {
        let service = service();
        service.add_task("buy milk").unwrap();
        assert_eq!(service.add_task("walk dog").unwrap(), 2);

        let descriptions: Vec<String> = service
            .list_tasks()
            .unwrap()
            .into_iter()
            .map(|t| t.description)
            .collect();
        assert_eq!(descriptions, vec!["buy milk", "walk dog"]);
    }

    #[test]
    fn test_add_accepts_empty_description() {
        let service = service();
        let id = service.add_task("").unwrap();
        assert_eq!(service.get_task(id).unwrap().description, "");
    }

    #[test]
    fn test_size_based_ids_overwrite_after_delete() {
        let service = service().with_allocator(IdAllocator::CollectionSize);
        service.add_task("first").unwrap();
        service.add_task("second").unwrap();

        service.delete_task(1).unwrap();
        let id = service.add_task("new task").unwrap();
        assert_eq!(id, 2);

        // the new task took id 2 and replaced "second"
        let tasks = service.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 2);
        assert_eq!(tasks[0].description, "new task");
    }

    #[test]
    fn test_high_water_mark_ids_do_not_collide() {
        let service = service();
        service.add_task("first").unwrap();
        service.add_task("second").unwrap();

        service.delete_task(1).unwrap();
        let id = service.add_task("new task").unwrap();
        assert_eq!(id, 3);

        let tasks = service.list_tasks().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(service.get_task(2).unwrap().description, "second");
    }

    #[test]
    fn test_add_fails_when_ids_run_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{"18446744073709551615":{"description":"x","status":"todo","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}}"#,
        )
        .unwrap();
        let before = fs::read(&path).unwrap();
        let service = file_service(&dir);

        assert!(matches!(service.add_task("y"), Err(Error::IdsExhausted)));
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(service.list_tasks().unwrap().len(), 1);
    }

    #[test]
    fn test_update_description() {
        let service = service();
        let id = service.add_task("x").unwrap();
        let before = service.get_task(id).unwrap();

        service.update_task(id, "y").unwrap();
        let after = service.get_task(id).unwrap();
        assert_eq!(after.description, "y");
        assert_eq!(after.status, Status::Todo);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn test_missing_id_leaves_storage_untouched() {
        let dir = TempDir::new().unwrap();
        let service = file_service(&dir);
        service.add_task("x").unwrap();
        let path = dir.path().join("data.json");
        let before = fs::read(&path).unwrap();

        assert!(matches!(service.update_task(99, "z"), Err(Error::TaskNotFound(99))));
        assert!(matches!(service.delete_task(99), Err(Error::TaskNotFound(99))));
        assert!(matches!(service.mark_in_progress(99), Err(Error::TaskNotFound(99))));
        assert!(matches!(service.mark_done(99), Err(Error::TaskNotFound(99))));

        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_no_storage_guard_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let service = file_service(&dir);

        assert!(matches!(service.update_task(1, "z"), Err(Error::NoTasksExist)));
        assert!(matches!(service.delete_task(1), Err(Error::NoTasksExist)));
        assert!(matches!(service.mark_in_progress(1), Err(Error::NoTasksExist)));
        assert!(matches!(service.mark_done(1), Err(Error::NoTasksExist)));
        assert!(matches!(service.get_task(1), Err(Error::NoTasksExist)));

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_mark_done_twice() {
        let service = service();
        let id = service.add_task("x").unwrap();

        service.mark_done(id).unwrap();
        assert_eq!(service.get_task(id).unwrap().status, Status::Done);
        service.mark_done(id).unwrap();
        assert_eq!(service.get_task(id).unwrap().status, Status::Done);
    }

    #[test]
    fn test_done_back_to_in_progress() {
        let service = service();
        let id = service.add_task("x").unwrap();
        service.mark_done(id).unwrap();
        service.mark_in_progress(id).unwrap();
        assert_eq!(service.get_task(id).unwrap().status, Status::InProgress);
    }

    #[test]
    fn test_timestamps_survive_clock_going_back() {
        let store = MemoryTaskStore::new();
        let service =
            TaskService::with_clock(&store, SteppingClock::new(start(), Duration::minutes(-5)));
        let id = service.add_task("x").unwrap();

        service.mark_in_progress(id).unwrap();
        service.update_task(id, "y").unwrap();

        let task = service.get_task(id).unwrap();
        assert_eq!(task.created_at, start());
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn test_each_mutation_saves_once() {
        let service = service();
        let id = service.add_task("x").unwrap();
        service.update_task(id, "y").unwrap();
        service.mark_in_progress(id).unwrap();
        service.mark_done(id).unwrap();
        service.delete_task(id).unwrap();
        assert_eq!(service.store().save_count(), 5);

        let _ = service.delete_task(id);
        let _ = service.list_tasks();
        assert_eq!(service.store().save_count(), 5);
    }

    #[test]
    fn test_delete_leaves_gap() {
        let service = service();
        for name in ["a", "b", "c"] {
            service.add_task(name).unwrap();
        }
        service.delete_task(2).unwrap();

        let ids: Vec<TaskId> = service.list_tasks().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(matches!(service.get_task(2), Err(Error::TaskNotFound(2))));
    }

    #[test]
    fn test_list_by_status() {
        let service = service();
        let a = service.add_task("a").unwrap();
        let b = service.add_task("b").unwrap();
        service.add_task("c").unwrap();
        service.mark_in_progress(a).unwrap();
        service.mark_done(b).unwrap();

        let todo = service.list_by_status(Status::Todo).unwrap();
        assert_eq!(todo.len(), 1);
        assert_eq!(todo[0].description, "c");
        assert_eq!(service.list_by_status(Status::Done).unwrap()[0].id, b);
    }

    #[test]
    fn test_list_without_storage_is_empty() {
        let service = service();
        assert!(service.list_tasks().unwrap().is_empty());
        assert!(!service.store().exists());
    }

    #[test]
    fn test_corrupt_storage_aborts_mutation() {
        let dir = TempDir::new().unwrap();
        let service = file_service(&dir);
        fs::write(dir.path().join("data.json"), "{not json").unwrap();

        assert!(matches!(service.add_task("x"), Err(Error::CorruptData { .. })));
        assert!(matches!(service.mark_done(1), Err(Error::CorruptData { .. })));
        assert_eq!(fs::read_to_string(dir.path().join("data.json")).unwrap(), "{not json");
    }

    #[test]
    fn test_state_persists_across_services() {
        let dir = TempDir::new().unwrap();
        let id = file_service(&dir).add_task("x").unwrap();
        file_service(&dir).mark_in_progress(id).unwrap();
        assert_eq!(file_service(&dir).get_task(id).unwrap().status, Status::InProgress);
    }
}
