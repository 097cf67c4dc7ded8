use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::calendar::day_in;
use crate::text_matcher::TextMatcher;
use crate::{ParseValueError, Priority, Task, normalize_token};

/// Primary list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskFilter {
    /// Every task.
    #[default]
    All,
    /// Not yet completed.
    Active,
    /// Completed.
    Completed,
    /// Due on `now`'s calendar day.
    Today,
    /// Due on a later calendar day.
    Upcoming,
    /// Unfinished and due on an earlier calendar day.
    Overdue,
    /// High priority only.
    HighPriority,
}

impl TaskFilter {
    /// Every filter, in sidebar order.
    pub const ALL: [Self; 7] = [
        Self::All,
        Self::Active,
        Self::Completed,
        Self::Today,
        Self::Upcoming,
        Self::Overdue,
        Self::HighPriority,
    ];

    /// Kebab-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Today => "today",
            Self::Upcoming => "upcoming",
            Self::Overdue => "overdue",
            Self::HighPriority => "high-priority",
        }
    }

    /// Whether `task` passes this filter on its own.
    #[must_use]
    pub fn matches(self, task: &Task, now: OffsetDateTime) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
            Self::Today => due_day_cmp(task, now) == Some(Ordering::Equal),
            Self::Upcoming => due_day_cmp(task, now) == Some(Ordering::Greater),
            Self::Overdue => task.is_overdue(now),
            Self::HighPriority => task.priority == Priority::High,
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            "today" => Ok(Self::Today),
            "upcoming" => Ok(Self::Upcoming),
            "overdue" => Ok(Self::Overdue),
            "high_priority" | "high" => Ok(Self::HighPriority),
            _ => Err(ParseValueError::new("filter", s)),
        }
    }
}

/// Sort key for the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// By `created_at`.
    #[default]
    CreationDate,
    /// By `due_date`; undated tasks go last when ascending.
    DueDate,
    /// By priority rank.
    Priority,
    /// By title collation.
    Alphabetical,
}

impl SortKey {
    /// Kebab-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreationDate => "creation-date",
            Self::DueDate => "due-date",
            Self::Priority => "priority",
            Self::Alphabetical => "alphabetical",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "creation_date" | "created" | "date" => Ok(Self::CreationDate),
            "due_date" | "due" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "alphabetical" | "alpha" | "title" => Ok(Self::Alphabetical),
            _ => Err(ParseValueError::new("sort key", s)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    /// Largest first.
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Short label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(ParseValueError::new("sort direction", s)),
        }
    }
}

/// Filter, search, sort, and tag selection applied to the task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewConfig {
    /// Primary filter.
    pub filter: TaskFilter,
    /// Free-text search; empty means no constraint.
    pub search: String,
    /// Sort key.
    pub sort_key: SortKey,
    /// Sort direction.
    pub sort_direction: SortDirection,
    /// Selected tags (a task passes when it carries any of them).
    pub selected_tags: BTreeSet<String>,
}

/// Produce the ordered view: filter first, then a stable sort.
///
/// Ties keep collection order, so manual reordering remains visible within
/// equal sort ranks.
#[must_use]
pub fn query<'a>(tasks: &'a [Task], config: &ViewConfig, now: OffsetDateTime) -> Vec<&'a Task> {
    let matcher = TextMatcher::new(&config.search);
    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|task| passes(task, config, matcher.as_ref(), now))
        .collect();
    view.sort_by(|a, b| compare(a, b, config.sort_key, config.sort_direction));
    view
}

/// Whether a single task passes every active condition in `config`.
#[must_use]
pub fn matches(task: &Task, config: &ViewConfig, now: OffsetDateTime) -> bool {
    passes(task, config, TextMatcher::new(&config.search).as_ref(), now)
}

fn passes(task: &Task, config: &ViewConfig, matcher: Option<&TextMatcher>, now: OffsetDateTime) -> bool {
    config.filter.matches(task, now)
        && matcher.is_none_or(|m| m.matches(task))
        && (config.selected_tags.is_empty() || task.tags.intersects(&config.selected_tags))
}

/// Compare two tasks under `key`/`direction`.
///
/// For [`SortKey::DueDate`] undated tasks sort after dated ones when
/// ascending and before them when descending.
#[must_use]
pub fn compare(a: &Task, b: &Task, key: SortKey, direction: SortDirection) -> Ordering {
    let ordering = match key {
        SortKey::CreationDate => a.created_at.cmp(&b.created_at),
        SortKey::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
        },
        SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortKey::Alphabetical => collate(&a.title, &b.title),
    };
    direction.apply(ordering)
}

/// Title collation: case-folded text first, then lowercase before uppercase
/// at the first differing character.
#[must_use]
pub fn collate(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();
    fold(a)
        .cmp(&fold(b))
        .then_with(|| {
            a.chars()
                .zip(b.chars())
                .find(|(x, y)| x != y)
                .map_or(Ordering::Equal, |(x, y)| {
                    x.is_uppercase().cmp(&y.is_uppercase())
                })
        })
        .then_with(|| a.cmp(b))
}

/// Compare the task's due day with `now`'s day, both taken in `now`'s offset.
///
/// A due date whose day in that offset falls outside the date range cannot
/// share `now`'s day, so the instants are compared instead.
pub(crate) fn due_day_cmp(task: &Task, now: OffsetDateTime) -> Option<Ordering> {
    let due = task.due_date?;
    Some(day_in(due, now.offset()).map_or_else(|| due.cmp(&now), |day| day.cmp(&now.date())))
}

/// Number of tasks matching each [`TaskFilter`], ignoring search and tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    counts: [usize; TaskFilter::ALL.len()],
}

impl FilterCounts {
    /// Count `tasks` against every filter at `now`.
    #[must_use]
    pub fn compute(tasks: &[Task], now: OffsetDateTime) -> Self {
        let mut counts = [0; TaskFilter::ALL.len()];
        for task in tasks {
            for (slot, filter) in counts.iter_mut().zip(TaskFilter::ALL) {
                if filter.matches(task, now) {
                    *slot += 1;
                }
            }
        }
        Self { counts }
    }

    /// Count for one filter.
    #[must_use]
    pub fn get(&self, filter: TaskFilter) -> usize {
        TaskFilter::ALL
            .iter()
            .position(|candidate| *candidate == filter)
            .and_then(|idx| self.counts.get(idx).copied())
            .unwrap_or(0)
    }

    /// Iterate `(filter, count)` pairs in sidebar order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskFilter, usize)> + '_ {
        TaskFilter::ALL.into_iter().zip(self.counts.iter().copied())
    }
}
