//! Persistence boundary for taskdeck: the whole task collection as one blob.

mod error;
mod file;
mod memory;

pub use error::{Result, StoreError};
pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;

use std::collections::HashSet;
use taskdeck_core::Task;
use tracing::{debug, info, warn};

/// Byte-oriented storage holding a single serialized blob.
pub trait BlobStore {
    /// Return the previously saved blob, or `None` when nothing was saved yet.
    ///
    /// # Errors
    /// Returns a store-specific error when the medium cannot be read.
    fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the saved blob.
    ///
    /// # Errors
    /// Returns a store-specific error when the blob cannot be written.
    fn save(&self, blob: &[u8]) -> Result<()>;
}

impl<B: BlobStore + ?Sized> BlobStore for Box<B> {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        (**self).load()
    }

    fn save(&self, blob: &[u8]) -> Result<()> {
        (**self).save(blob)
    }
}

/// Serialize the collection as a JSON array of task records.
///
/// # Errors
/// Returns [`StoreError::Encode`] if serialization fails.
pub fn encode_tasks(tasks: &[Task]) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(tasks).map_err(StoreError::Encode)
}

/// Parse a JSON array of task records.
///
/// Records repeating an earlier task id are dropped.
///
/// # Errors
/// Returns [`StoreError::Decode`] if the blob is not a valid task array.
pub fn decode_tasks(blob: &[u8]) -> Result<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_slice(blob).map_err(StoreError::Decode)?;
    let mut seen = HashSet::with_capacity(tasks.len());
    let before = tasks.len();
    let unique: Vec<Task> = tasks.into_iter().filter(|task| seen.insert(task.id)).collect();
    if unique.len() != before {
        warn!(dropped = before - unique.len(), "Dropped tasks with duplicate ids");
    }
    Ok(unique)
}

/// Loads and saves the task collection through a [`BlobStore`].
#[derive(Debug, Clone)]
pub struct PersistenceAdapter<B> {
    blob: B,
}

impl<B: BlobStore> PersistenceAdapter<B> {
    /// Wrap a blob store.
    #[must_use]
    pub const fn new(blob: B) -> Self {
        Self { blob }
    }

    /// Load the saved collection.
    ///
    /// Never fails: a missing blob yields an empty collection, and unreadable
    /// or corrupt data is logged and discarded.
    #[must_use]
    pub fn load_tasks(&self) -> Vec<Task> {
        let blob = match self.blob.load() {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("No saved tasks; starting empty");
                return Vec::new();
            }
            Err(err) => {
                warn!(error = %err, "Failed to read saved tasks; starting empty");
                return Vec::new();
            }
        };

        match decode_tasks(&blob) {
            Ok(tasks) => {
                info!(count = tasks.len(), "Loaded tasks");
                tasks
            }
            Err(err) => {
                warn!(error = %err, "Saved tasks are corrupt; starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize and write the full collection.
    ///
    /// # Errors
    /// Returns an error when encoding or writing fails.
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        let blob = encode_tasks(tasks)?;
        self.blob.save(&blob)?;
        debug!(count = tasks.len(), bytes = blob.len(), "Saved tasks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::id::{IdGenerator, SequentialIdGenerator};
    use taskdeck_core::query::{FilterCounts, TaskFilter, ViewConfig, query};
    use taskdeck_core::{Priority, Subtask, Task};
    use time::macros::datetime;

    fn sample() -> Vec<Task> {
        let mut ids = SequentialIdGenerator::default();
        let mut first = Task::new(ids.next_task_id(), "first", datetime!(2025-01-01 08:00 UTC));
        first.priority = Priority::High;
        first.due_date = Some(datetime!(2025-01-05 17:30:15.25 +1));
        first.tags = ["home", "work"].into_iter().collect();
        first.subtasks.push(Subtask::new(ids.next_subtask_id(), "step"));
        let second = Task::new(ids.next_task_id(), "second", datetime!(2025-01-02 08:00 UTC));
        vec![first, second]
    }

    #[test]
    fn save_then_load_roundtrips() {
        let store = MemoryBlobStore::new();
        let adapter = PersistenceAdapter::new(store);
        let tasks = sample();
        adapter
            .save_tasks(&tasks)
            .unwrap_or_else(|err| panic!("save must succeed: {err}"));
        assert_eq!(adapter.load_tasks(), tasks);
    }

    #[test]
    fn missing_blob_loads_empty() {
        let adapter = PersistenceAdapter::new(MemoryBlobStore::new());
        assert!(adapter.load_tasks().is_empty());
    }

    #[test]
    fn corrupt_blob_loads_empty() {
        let store = MemoryBlobStore::with_contents(b"{not json".to_vec());
        let adapter = PersistenceAdapter::new(store);
        assert!(adapter.load_tasks().is_empty());

        let wrong_shape = MemoryBlobStore::with_contents(br#"{"tasks": []}"#.to_vec());
        assert!(PersistenceAdapter::new(wrong_shape).load_tasks().is_empty());
    }

    #[test]
    fn unreadable_store_loads_empty() {
        let store = MemoryBlobStore::with_contents(b"[]".to_vec());
        store.set_failing(true);
        assert!(PersistenceAdapter::new(store).load_tasks().is_empty());
    }

    #[test]
    fn save_failure_is_reported() {
        let store = MemoryBlobStore::new();
        store.set_failing(true);
        let adapter = PersistenceAdapter::new(store);
        let err = adapter.save_tasks(&[]).err();
        assert!(matches!(err, Some(StoreError::Unavailable(_))));
    }

    #[test]
    fn decode_drops_duplicate_task_ids() {
        let blob = br#"[
            {"id": "3b241101-e2bb-4255-8caf-4136c566a962", "title": "a", "createdAt": "2025-01-01T00:00:00Z"},
            {"id": "3b241101-e2bb-4255-8caf-4136c566a962", "title": "b", "createdAt": "2025-01-01T00:00:00Z"}
        ]"#;
        let tasks = decode_tasks(blob).unwrap_or_else(|err| panic!("decode: {err}"));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks.first().map(|t| t.title.as_str()), Some("a"));
    }

    #[test]
    fn stamp_style_subtask_ids_still_load() {
        let blob = br#"[
            {
                "id": "3b241101-e2bb-4255-8caf-4136c566a962",
                "title": "Trip",
                "createdAt": "2025-01-01T00:00:00.000Z",
                "subtasks": [
                    {"id": "1735689600000", "title": "Tickets", "completed": true},
                    {"id": "1735689600001", "title": "Hotel", "completed": false}
                ]
            }
        ]"#;
        let tasks = decode_tasks(blob).unwrap_or_else(|err| panic!("decode: {err}"));
        let task = tasks.first().unwrap_or_else(|| panic!("one task"));
        assert_eq!(task.subtasks.len(), 2);
        assert_eq!(task.completion_percentage(), 50);

        let again = decode_tasks(blob).unwrap_or_else(|err| panic!("decode: {err}"));
        assert_eq!(again, tasks);
    }

    #[test]
    fn far_future_due_dates_decode_and_query_cleanly() {
        let blob = br#"[
            {
                "id": "3b241101-e2bb-4255-8caf-4136c566a962",
                "title": "Someday",
                "createdAt": "2025-01-01T00:00:00Z",
                "dueDate": "9999-12-31T23:30:00Z"
            }
        ]"#;
        let tasks = decode_tasks(blob).unwrap_or_else(|err| panic!("decode: {err}"));
        let now = datetime!(2025-06-10 09:00 +2);
        let view = |filter| ViewConfig {
            filter,
            ..ViewConfig::default()
        };

        assert_eq!(query(&tasks, &view(TaskFilter::Upcoming), now).len(), 1);
        assert!(query(&tasks, &view(TaskFilter::Today), now).is_empty());
        assert_eq!(FilterCounts::compute(&tasks, now).get(TaskFilter::Overdue), 0);
    }

    #[test]
    fn encoded_blob_is_a_json_array() {
        let blob = encode_tasks(&sample()).unwrap_or_else(|err| panic!("encode: {err}"));
        let value: serde_json::Value =
            serde_json::from_slice(&blob).unwrap_or_else(|err| panic!("parse: {err}"));
        let records = value.as_array().unwrap_or_else(|| panic!("expected array"));
        assert_eq!(records.len(), 2);
        assert!(records[0]["dueDate"].is_string());
        assert_eq!(records[0]["tags"], serde_json::json!(["home", "work"]));
        assert_eq!(records[1]["reminderDate"], serde_json::Value::Null);
    }
}
