//! Canonical in-memory task collection with write-through persistence.

use taskdeck_core::clock::{Clock, SystemClock};
use taskdeck_core::id::{IdGenerator, SubtaskId, TaskId, UuidGenerator};
use taskdeck_core::{Priority, Recurrence, Subtask, TagSet, Task, compute_tags};
use taskdeck_store::{BlobStore, PersistenceAdapter, StoreError};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::task_patch::TaskUpdate;

/// Attempts at drawing an unused id from the injected generator before
/// falling back to a fresh UUID.
const MAX_ID_ATTEMPTS: usize = 8;

/// Errors raised by [`TaskStore`] commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskStoreError {
    /// The task payload is unusable.
    #[error("invalid task: {reason}")]
    InvalidTask {
        /// What is wrong with the payload.
        reason: &'static str,
    },
    /// A reorder index does not address an existing task.
    #[error("index {index} is out of range for {len} tasks")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Collection length at the time of the call.
        len: usize,
    },
}

/// Result alias for task store commands.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Input for [`TaskStore::create`]. Omitted fields take the task defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    /// Required, non-blank title.
    pub title: String,
    /// Notes; empty when omitted.
    pub description: Option<String>,
    /// Importance; medium when omitted.
    pub priority: Option<Priority>,
    /// Optional due instant.
    pub due_date: Option<OffsetDateTime>,
    /// Initial tags.
    pub tags: Vec<String>,
    /// Titles of initial subtasks, in order.
    pub subtasks: Vec<String>,
    /// Repeat setting.
    pub recurrence: Recurrence,
    /// Optional reminder instant.
    pub reminder_at: Option<OffsetDateTime>,
}

impl NewTask {
    /// Payload with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Owns the task collection and keeps it consistent.
///
/// Every mutation that changes the collection is written through to the
/// persistence adapter. A failed save is logged and recorded but never
/// undoes the in-memory change.
pub struct TaskStore<B> {
    tasks: Vec<Task>,
    persistence: PersistenceAdapter<B>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    last_save_error: Option<StoreError>,
}

impl<B: BlobStore> TaskStore<B> {
    /// Load the saved collection using the system clock and UUID ids.
    #[must_use]
    pub fn open(blob: B) -> Self {
        Self::with_parts(blob, SystemClock, UuidGenerator)
    }

    /// Load the saved collection with injected collaborators.
    #[must_use]
    pub fn with_parts(
        blob: B,
        clock: impl Clock + 'static,
        ids: impl IdGenerator + 'static,
    ) -> Self {
        let persistence = PersistenceAdapter::new(blob);
        let tasks = persistence.load_tasks();
        Self {
            tasks,
            persistence,
            clock: Box::new(clock),
            ids: Box::new(ids),
            last_save_error: None,
        }
    }

    /// Every task in collection order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Sorted distinct tags, recomputed from the collection.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        compute_tags(&self.tasks)
    }

    /// Current time from the injected clock.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Error from the most recent save, cleared by the next successful one.
    #[must_use]
    pub const fn last_save_error(&self) -> Option<&StoreError> {
        self.last_save_error.as_ref()
    }

    /// Append a new task and return its id.
    ///
    /// # Errors
    /// Returns [`TaskStoreError::InvalidTask`] when the title is blank.
    pub fn create(&mut self, input: NewTask) -> TaskStoreResult<TaskId> {
        ensure_title(&input.title)?;

        let id = self.fresh_task_id();
        let mut task = Task::new(id, input.title, self.clock.now());
        task.description = input.description.unwrap_or_default();
        task.priority = input.priority.unwrap_or_default();
        task.due_date = input.due_date;
        task.tags = input.tags.into_iter().collect::<TagSet>();
        task.recurrence = input.recurrence;
        task.reminder_at = input.reminder_at;
        for title in input.subtasks {
            let sub = fresh_subtask_id(self.ids.as_mut(), &task);
            task.subtasks.push(Subtask::new(sub, title));
        }

        debug!(task = %id, "Created task");
        self.tasks.push(task);
        self.persist();
        Ok(id)
    }

    /// Merge `update` into the task. Returns `Ok(false)` when the task is absent.
    ///
    /// # Errors
    /// Returns [`TaskStoreError::InvalidTask`] when the update sets a blank title.
    pub fn update(&mut self, id: TaskId, update: TaskUpdate) -> TaskStoreResult<bool> {
        if let Some(title) = &update.title {
            ensure_title(title)?;
        }
        let Some(task) = self.task_mut(id) else {
            return Ok(false);
        };
        if update.apply(task) {
            debug!(task = %id, "Updated task");
            self.persist();
        }
        Ok(true)
    }

    /// Remove a task. Returns whether it existed.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            debug!(task = %id, "Deleted task");
            self.persist();
        }
        removed
    }

    /// Flip the completion flag. Subtasks are left untouched.
    pub fn toggle_completion(&mut self, id: TaskId) -> bool {
        let Some(task) = self.task_mut(id) else {
            return false;
        };
        task.completed = !task.completed;
        debug!(task = %id, completed = task.completed, "Toggled task");
        self.persist();
        true
    }

    /// Append an unchecked subtask. Returns its id, or `None` when the task is absent.
    pub fn add_subtask(&mut self, task_id: TaskId, title: impl Into<String>) -> Option<SubtaskId> {
        let index = self.tasks.iter().position(|task| task.id == task_id)?;
        let task = self.tasks.get_mut(index)?;
        let id = fresh_subtask_id(self.ids.as_mut(), task);
        task.subtasks.push(Subtask::new(id, title));
        debug!(task = %task_id, subtask = %id, "Added subtask");
        self.persist();
        Some(id)
    }

    /// Flip a subtask's completion flag. Returns whether both ids were found.
    pub fn toggle_subtask(&mut self, task_id: TaskId, subtask_id: SubtaskId) -> bool {
        let Some(sub) = self
            .task_mut(task_id)
            .and_then(|task| task.subtasks.iter_mut().find(|sub| sub.id == subtask_id))
        else {
            return false;
        };
        sub.completed = !sub.completed;
        debug!(task = %task_id, subtask = %subtask_id, "Toggled subtask");
        self.persist();
        true
    }

    /// Remove a subtask. Returns whether both ids were found.
    pub fn delete_subtask(&mut self, task_id: TaskId, subtask_id: SubtaskId) -> bool {
        let Some(task) = self.task_mut(task_id) else {
            return false;
        };
        let before = task.subtasks.len();
        task.subtasks.retain(|sub| sub.id != subtask_id);
        if task.subtasks.len() == before {
            return false;
        }
        debug!(task = %task_id, subtask = %subtask_id, "Deleted subtask");
        self.persist();
        true
    }

    /// Move the task at `from` so it ends up at `to` (indexing after removal).
    ///
    /// # Errors
    /// Returns [`TaskStoreError::IndexOutOfRange`] when either index is not
    /// below the collection length; the collection is left unchanged.
    pub fn reorder(&mut self, from: usize, to: usize) -> TaskStoreResult<()> {
        let len = self.tasks.len();
        for index in [from, to] {
            if index >= len {
                return Err(TaskStoreError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        debug!(from, to, "Reordered tasks");
        self.persist();
        Ok(())
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    fn fresh_task_id(&mut self) -> TaskId {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_task_id();
            if self.get(id).is_none() {
                return id;
            }
            warn!(task = %id, "Id generator returned an id already in use");
        }
        loop {
            let id = UuidGenerator.next_task_id();
            if self.get(id).is_none() {
                return id;
            }
        }
    }

    fn persist(&mut self) {
        match self.persistence.save_tasks(&self.tasks) {
            Ok(()) => self.last_save_error = None,
            Err(err) => {
                warn!(error = %err, "Failed to save tasks; keeping in-memory state");
                self.last_save_error = Some(err);
            }
        }
    }
}

fn ensure_title(title: &str) -> TaskStoreResult<()> {
    if title.trim().is_empty() {
        return Err(TaskStoreError::InvalidTask {
            reason: "title must not be blank",
        });
    }
    Ok(())
}

fn fresh_subtask_id(ids: &mut dyn IdGenerator, task: &Task) -> SubtaskId {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = ids.next_subtask_id();
        if task.subtask(id).is_none() {
            return id;
        }
    }
    loop {
        let id = UuidGenerator.next_subtask_id();
        if task.subtask(id).is_none() {
            return id;
        }
    }
}
