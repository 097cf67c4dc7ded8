//! Command surface shared by presentation frontends.

use taskdeck_core::calendar::{self, DayAgenda, Week};
use taskdeck_core::id::{SubtaskId, TaskId};
use taskdeck_core::{FilterCounts, SortDirection, SortKey, Task, TaskFilter, query};
use taskdeck_store::BlobStore;

use crate::task_patch::TaskUpdate;
use crate::task_store::{NewTask, TaskStore, TaskStoreResult};
use crate::view_state::ViewState;

/// Wraps the task store and the session view state.
pub struct TaskService<B> {
    store: TaskStore<B>,
    view: ViewState,
}

impl<B: BlobStore> TaskService<B> {
    /// Construct a service with the default view.
    #[must_use]
    pub fn new(store: TaskStore<B>) -> Self {
        Self::with_view(store, ViewState::new())
    }

    /// Construct a service starting from `view`.
    #[must_use]
    pub const fn with_view(store: TaskStore<B>, view: ViewState) -> Self {
        Self { store, view }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &TaskStore<B> {
        &self.store
    }

    /// Borrow the current view state.
    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    // Task commands

    /// Create a task.
    ///
    /// # Errors
    /// Propagates validation failures from [`TaskStore::create`].
    pub fn create_task(&mut self, input: NewTask) -> TaskStoreResult<TaskId> {
        self.store.create(input)
    }

    /// Merge a partial update into a task.
    ///
    /// # Errors
    /// Propagates validation failures from [`TaskStore::update`].
    pub fn update_task(&mut self, id: TaskId, update: TaskUpdate) -> TaskStoreResult<bool> {
        self.store.update(id, update)
    }

    /// Delete a task.
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        self.store.delete(id)
    }

    /// Toggle a task's completion.
    pub fn toggle_task(&mut self, id: TaskId) -> bool {
        self.store.toggle_completion(id)
    }

    /// Add a subtask.
    pub fn add_subtask(&mut self, task: TaskId, title: impl Into<String>) -> Option<SubtaskId> {
        self.store.add_subtask(task, title)
    }

    /// Toggle a subtask.
    pub fn toggle_subtask(&mut self, task: TaskId, subtask: SubtaskId) -> bool {
        self.store.toggle_subtask(task, subtask)
    }

    /// Delete a subtask.
    pub fn delete_subtask(&mut self, task: TaskId, subtask: SubtaskId) -> bool {
        self.store.delete_subtask(task, subtask)
    }

    /// Move a task within the collection.
    ///
    /// # Errors
    /// Returns an error for out-of-range indexes.
    pub fn reorder(&mut self, from: usize, to: usize) -> TaskStoreResult<()> {
        self.store.reorder(from, to)
    }

    // View commands

    /// Switch the primary filter.
    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.view.set_filter(filter);
    }

    /// Replace the search text.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.view.set_search_query(query);
    }

    /// Select a sort key; repeating the active key flips the direction.
    pub fn set_sort(&mut self, key: SortKey) {
        self.view.set_sort_by(key);
    }

    /// Force a sort direction.
    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.view.set_sort_direction(direction);
    }

    /// Toggle a tag in the selection.
    pub fn toggle_tag(&mut self, tag: &str) {
        self.view.toggle_tag(tag);
    }

    /// Replace the tag selection; repeated tags count once.
    pub fn select_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.view.select_tags(tags);
    }

    /// Restore the default view.
    pub fn reset_filters(&mut self) {
        self.view.reset();
    }

    // Reads

    /// Raw collection in stored order.
    #[must_use]
    pub fn all_tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    /// Tasks passing the current view, sorted, evaluated at the store clock's `now`.
    #[must_use]
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        query(self.store.tasks(), self.view.config(), self.store.now())
    }

    /// Sorted distinct tags.
    #[must_use]
    pub fn all_tags(&self) -> Vec<String> {
        self.store.tags()
    }

    /// Per-filter totals for the whole collection.
    #[must_use]
    pub fn filter_counts(&self) -> FilterCounts {
        FilterCounts::compute(self.store.tasks(), self.store.now())
    }

    /// Tasks due on each day of the week containing `anchor` (today when `None`).
    #[must_use]
    pub fn week_agenda(&self, anchor: Option<time::Date>) -> (Week, Vec<DayAgenda<'_>>) {
        let now = self.store.now();
        let week = Week::containing(anchor.unwrap_or_else(|| now.date()));
        (week, calendar::agenda(self.store.tasks(), week, now.offset()))
    }
}
