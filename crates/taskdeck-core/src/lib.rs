//! Domain types, derived views, and query logic for taskdeck.

/// Weekly calendar grouping.
pub mod calendar;
/// Time sources.
pub mod clock;
/// Identifier types and generators.
pub mod id;
/// Filter/sort pipeline over the task collection.
pub mod query;
mod record;
/// Tag index derivation.
pub mod tags;
/// Case-insensitive search matching.
pub mod text_matcher;

use crate::id::{SubtaskId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::OffsetDateTime;

pub use crate::query::{FilterCounts, SortDirection, SortKey, TaskFilter, ViewConfig, query};
pub use crate::tags::compute_tags;

/// Error returned when a user-facing token does not name a known value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseValueError {
    /// Which kind of value was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseValueError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Normalize a free-form token for enum lookups (`High-Priority` -> `high_priority`).
pub(crate) fn normalize_token(token: &str) -> String {
    token.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

/// Task importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default importance.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl Priority {
    /// Numeric rank used for sorting (`low=1 < medium=2 < high=3`).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseValueError::new("priority", s)),
        }
    }
}

/// How often a recurring task repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePeriod {
    /// Every day.
    Daily,
    /// Every week.
    Weekly,
    /// Every month.
    Monthly,
}

impl RecurrencePeriod {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RecurrencePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrencePeriod {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ParseValueError::new("recurrence period", s)),
        }
    }
}

/// Recurrence setting; a period only exists for recurring tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Recurrence {
    /// One-off task.
    #[default]
    NotRecurring,
    /// Repeats with the given period.
    Recurring {
        /// Repeat interval.
        period: RecurrencePeriod,
    },
}

impl Recurrence {
    /// Whether the task repeats.
    #[must_use]
    pub const fn is_recurring(self) -> bool {
        matches!(self, Self::Recurring { .. })
    }

    /// Repeat interval, if any.
    #[must_use]
    pub const fn period(self) -> Option<RecurrencePeriod> {
        match self {
            Self::NotRecurring => None,
            Self::Recurring { period } => Some(period),
        }
    }
}

impl From<Option<RecurrencePeriod>> for Recurrence {
    fn from(period: Option<RecurrencePeriod>) -> Self {
        period.map_or(Self::NotRecurring, |period| Self::Recurring { period })
    }
}

/// Set of trimmed, non-blank tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Empty tag set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Insert a tag after trimming. Blank input is ignored.
    ///
    /// Returns `true` when the set changed.
    pub fn insert(&mut self, tag: &str) -> bool {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.0.insert(trimmed.to_owned())
    }

    /// Whether the exact tag is present.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Iterate in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether no tags are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any tag is shared with `other`.
    #[must_use]
    pub fn intersects(&self, other: &BTreeSet<String>) -> bool {
        self.0.iter().any(|tag| other.contains(tag))
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}

/// Checklist item owned by a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// Identifier, unique within the parent task.
    pub id: SubtaskId,
    /// Short label.
    pub title: String,
    /// Whether the item is checked off.
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    /// New unchecked subtask.
    #[must_use]
    pub fn new(id: SubtaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
        }
    }
}

/// A tracked unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "record::TaskRecord", into = "record::TaskRecord")]
pub struct Task {
    /// Identifier, immutable once assigned.
    pub id: TaskId,
    /// Human-readable title.
    pub title: String,
    /// Free-form notes (may be empty).
    pub description: String,
    /// Completion flag. Independent of subtask state.
    pub completed: bool,
    /// Importance.
    pub priority: Priority,
    /// Optional due instant.
    pub due_date: Option<OffsetDateTime>,
    /// Attached tags.
    pub tags: TagSet,
    /// Ordered checklist.
    pub subtasks: Vec<Subtask>,
    /// Creation instant, immutable once assigned.
    pub created_at: OffsetDateTime,
    /// Repeat setting.
    pub recurrence: Recurrence,
    /// Optional reminder instant. Only stored; nothing fires on it.
    pub reminder_at: Option<OffsetDateTime>,
}

impl Task {
    /// Task with every optional field at its default.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            completed: false,
            priority: Priority::default(),
            due_date: None,
            tags: TagSet::new(),
            subtasks: Vec::new(),
            created_at,
            recurrence: Recurrence::NotRecurring,
            reminder_at: None,
        }
    }

    /// Percentage of checked subtasks, or 0/100 from `completed` when there are none.
    #[must_use]
    pub fn completion_percentage(&self) -> u8 {
        let total = self.subtasks.len();
        if total == 0 {
            return if self.completed { 100 } else { 0 };
        }
        let done = self.subtasks.iter().filter(|sub| sub.completed).count();
        // Rounded half up; done <= total keeps the result within 0..=100.
        let pct = (done * 200 + total) / (total * 2);
        u8::try_from(pct).unwrap_or(100)
    }

    /// Whether the task is unfinished and due on a day before `now`'s day.
    #[must_use]
    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        !self.completed && query::due_day_cmp(self, now) == Some(std::cmp::Ordering::Less)
    }

    /// Look up a subtask by id.
    #[must_use]
    pub fn subtask(&self, id: SubtaskId) -> Option<&Subtask> {
        self.subtasks.iter().find(|sub| sub.id == id)
    }
}
