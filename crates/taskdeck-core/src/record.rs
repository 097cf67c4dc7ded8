//! Wire shape of a task in the persisted blob.
//!
//! The blob keeps the flat `isRecurring` / `recurringType` pair and camelCase
//! keys so previously saved data keeps loading.

use crate::id::TaskId;
use crate::{Priority, Recurrence, RecurrencePeriod, Subtask, TagSet, Task};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskRecord {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    due_date: Option<OffsetDateTime>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    subtasks: Option<Vec<Subtask>>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(default)]
    is_recurring: bool,
    #[serde(default)]
    recurring_type: Option<RecurrencePeriod>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    reminder_date: Option<OffsetDateTime>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let recurrence = if record.is_recurring {
            // A recurring record without a period falls back to daily.
            Recurrence::Recurring {
                period: record.recurring_type.unwrap_or(RecurrencePeriod::Daily),
            }
        } else {
            Recurrence::NotRecurring
        };

        let mut seen = HashSet::new();
        let subtasks = record
            .subtasks
            .unwrap_or_default()
            .into_iter()
            .filter(|sub| seen.insert(sub.id))
            .collect();

        Self {
            id: record.id,
            title: record.title,
            description: record.description.unwrap_or_default(),
            completed: record.completed,
            priority: record.priority.unwrap_or_default(),
            due_date: record.due_date,
            tags: record.tags.unwrap_or_default().into_iter().collect::<TagSet>(),
            subtasks,
            created_at: record.created_at,
            recurrence,
            reminder_at: record.reminder_date,
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: Some(task.description),
            completed: task.completed,
            priority: Some(task.priority),
            due_date: task.due_date,
            tags: Some(task.tags.iter().map(str::to_owned).collect()),
            subtasks: Some(task.subtasks),
            created_at: task.created_at,
            is_recurring: task.recurrence.is_recurring(),
            recurring_type: task.recurrence.period(),
            reminder_date: task.reminder_at,
        }
    }
}
