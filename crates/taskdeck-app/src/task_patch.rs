use std::collections::HashSet;

use taskdeck_core::{Priority, Recurrence, Subtask, TagSet, Task};
use time::OffsetDateTime;

/// Patch for a nullable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// Overwrite with a value.
    Set(T),
    /// Reset to unset.
    Clear,
}

impl<T> FieldPatch<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Clear => None,
        }
    }
}

/// Partial task update. Only `Some` fields are merged.
///
/// `id` and `created_at` are not part of the payload and never change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Overwrite the title.
    pub title: Option<String>,
    /// Overwrite the description.
    pub description: Option<String>,
    /// Overwrite the completion flag.
    pub completed: Option<bool>,
    /// Overwrite the priority.
    pub priority: Option<Priority>,
    /// Set or clear the due date.
    pub due_date: Option<FieldPatch<OffsetDateTime>>,
    /// Replace the whole tag set.
    pub tags: Option<Vec<String>>,
    /// Replace the subtask list.
    pub subtasks: Option<Vec<Subtask>>,
    /// Overwrite the recurrence setting.
    pub recurrence: Option<Recurrence>,
    /// Set or clear the reminder.
    pub reminder_at: Option<FieldPatch<OffsetDateTime>>,
}

impl TaskUpdate {
    /// Returns true when the update carries no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
            && self.subtasks.is_none()
            && self.recurrence.is_none()
            && self.reminder_at.is_none()
    }

    /// Merge the supplied fields into `task`. Returns whether anything changed.
    ///
    /// Blank tags are dropped and repeated subtask ids keep their first entry.
    pub fn apply(self, task: &mut Task) -> bool {
        let mut changed = false;

        if let Some(title) = self.title {
            changed |= replace(&mut task.title, title);
        }
        if let Some(description) = self.description {
            changed |= replace(&mut task.description, description);
        }
        if let Some(completed) = self.completed {
            changed |= replace(&mut task.completed, completed);
        }
        if let Some(priority) = self.priority {
            changed |= replace(&mut task.priority, priority);
        }
        if let Some(due) = self.due_date {
            changed |= replace(&mut task.due_date, due.into_option());
        }
        if let Some(tags) = self.tags {
            changed |= replace(&mut task.tags, tags.into_iter().collect::<TagSet>());
        }
        if let Some(subtasks) = self.subtasks {
            let mut seen = HashSet::new();
            let unique = subtasks.into_iter().filter(|sub| seen.insert(sub.id)).collect();
            changed |= replace(&mut task.subtasks, unique);
        }
        if let Some(recurrence) = self.recurrence {
            changed |= replace(&mut task.recurrence, recurrence);
        }
        if let Some(reminder) = self.reminder_at {
            changed |= replace(&mut task.reminder_at, reminder.into_option());
        }

        changed
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
