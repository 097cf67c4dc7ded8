use time::{Date, Duration, OffsetDateTime, UtcOffset};

use crate::Task;

/// A Monday-to-Sunday week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Week {
    start: Date,
}

impl Week {
    /// The week that contains `date`. [`Date::MIN`] is a Monday, so no week
    /// starts before it.
    #[must_use]
    pub fn containing(date: Date) -> Self {
        let back = i64::from(date.weekday().number_days_from_monday());
        Self {
            start: date.checked_sub(Duration::days(back)).unwrap_or(Date::MIN),
        }
    }

    /// Monday of this week.
    #[must_use]
    pub const fn first_day(self) -> Date {
        self.start
    }

    /// Sunday of this week, or [`Date::MAX`] for the last week of the range.
    #[must_use]
    pub fn last_day(self) -> Date {
        self.start.checked_add(Duration::days(6)).unwrap_or(Date::MAX)
    }

    /// The seven days from Monday to Sunday.
    pub fn days(self) -> impl Iterator<Item = Date> {
        std::iter::successors(Some(self.start), |day| day.next_day()).take(7)
    }

    /// Whether `date` falls inside this week.
    #[must_use]
    pub fn contains(self, date: Date) -> bool {
        (self.start..=self.last_day()).contains(&date)
    }

    /// The week before, if it is representable.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        let start = self.start.checked_sub(Duration::weeks(1))?;
        Some(Self::containing(start))
    }

    /// The week after, if it is representable.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        let start = self.start.checked_add(Duration::weeks(1))?;
        Some(Self { start })
    }
}

/// One calendar cell: a day and the tasks due on it.
#[derive(Debug, Clone)]
pub struct DayAgenda<'a> {
    /// Calendar day.
    pub date: Date,
    /// Tasks due that day, in collection order.
    pub tasks: Vec<&'a Task>,
}

/// Calendar day of `at` in `offset`, or `None` when that day lies outside
/// the supported date range.
#[must_use]
pub fn day_in(at: OffsetDateTime, offset: UtcOffset) -> Option<Date> {
    at.checked_to_offset(offset).map(OffsetDateTime::date)
}

/// Tasks whose due date falls on `date` when viewed in `offset`.
#[must_use]
pub fn tasks_on_day(tasks: &[Task], date: Date, offset: UtcOffset) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| {
            task.due_date
                .is_some_and(|due| day_in(due, offset) == Some(date))
        })
        .collect()
}

/// Group tasks by due day across `week`.
#[must_use]
pub fn agenda(tasks: &[Task], week: Week, offset: UtcOffset) -> Vec<DayAgenda<'_>> {
    week.days()
        .map(|date| DayAgenda {
            date,
            tasks: tasks_on_day(tasks, date, offset),
        })
        .collect()
}
