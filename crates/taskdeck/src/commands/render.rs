//! Plain-text rendering for listings.

use std::fmt::Write as _;

use taskdeck_core::calendar::{DayAgenda, Week};
use taskdeck_core::{FilterCounts, Task};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// One listing row: ` 3. [x] Title  (high, due 2025-06-10, #work, 1/2)`.
pub fn task_line(position: usize, task: &Task, offset: UtcOffset) -> String {
    let mark = if task.completed { 'x' } else { ' ' };
    let mut line = format!("{position:>3}. [{mark}] {}", task.title);

    let mut details = vec![task.priority.as_str().to_owned()];
    if let Some(due) = task.due_date {
        details.push(format!("due {}", instant(due, offset)));
    }
    details.extend(task.tags.iter().map(|tag| format!("#{tag}")));
    if !task.subtasks.is_empty() {
        let done = task.subtasks.iter().filter(|sub| sub.completed).count();
        details.push(format!("{done}/{}", task.subtasks.len()));
    }
    if let Some(period) = task.recurrence.period() {
        details.push(format!("repeats {period}"));
    }
    let _ = write!(line, "  ({})", details.join(", "));
    line
}

/// Full multi-line description of one task.
pub fn task_detail(task: &Task, offset: UtcOffset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", task.title);
    let _ = writeln!(out, "  id:         {}", task.id);
    let status = if task.completed { "done" } else { "open" };
    let _ = writeln!(out, "  status:     {status} ({}%)", task.completion_percentage());
    let _ = writeln!(out, "  priority:   {}", task.priority);
    if let Some(due) = task.due_date {
        let _ = writeln!(out, "  due:        {}", instant(due, offset));
    }
    if let Some(reminder) = task.reminder_at {
        let _ = writeln!(out, "  reminder:   {}", instant(reminder, offset));
    }
    if let Some(period) = task.recurrence.period() {
        let _ = writeln!(out, "  repeats:    {period}");
    }
    if !task.tags.is_empty() {
        let tags: Vec<&str> = task.tags.iter().collect();
        let _ = writeln!(out, "  tags:       {}", tags.join(", "));
    }
    let _ = writeln!(out, "  created:    {}", instant(task.created_at, offset));
    if !task.description.is_empty() {
        let _ = writeln!(out);
        for line in task.description.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    if !task.subtasks.is_empty() {
        let _ = writeln!(out);
        for (idx, sub) in task.subtasks.iter().enumerate() {
            let mark = if sub.completed { 'x' } else { ' ' };
            let _ = writeln!(out, "  {:>2}. [{mark}] {}", idx + 1, sub.title);
        }
    }
    out
}

/// Week view: one heading per day followed by the tasks due that day.
pub fn week(week: Week, days: &[DayAgenda<'_>], positions: impl Fn(&Task) -> usize) -> String {
    let mut out = format!("Week of {} to {}\n", week.first_day(), week.last_day());
    for day in days {
        let _ = writeln!(out, "\n{} {}", day.date.weekday(), day.date);
        if day.tasks.is_empty() {
            let _ = writeln!(out, "  -");
        }
        for task in &day.tasks {
            let mark = if task.completed { 'x' } else { ' ' };
            let _ = writeln!(out, "  {:>3}. [{mark}] {}", positions(task), task.title);
        }
    }
    out
}

/// `all 4  active 3  ...` in sidebar order.
pub fn counts(counts: &FilterCounts) -> String {
    counts
        .iter()
        .map(|(filter, count)| format!("{filter} {count}"))
        .collect::<Vec<_>>()
        .join("  ")
}

fn instant(at: OffsetDateTime, offset: UtcOffset) -> String {
    // Fall back to the stored offset when the viewer's day is out of range.
    let local = at.checked_to_offset(offset).unwrap_or(at);
    let format = if local.time() == time::Time::MIDNIGHT {
        format_description!("[year]-[month]-[day]")
    } else {
        format_description!("[year]-[month]-[day] [hour]:[minute]")
    };
    local.format(format).unwrap_or_else(|_| local.to_string())
}
