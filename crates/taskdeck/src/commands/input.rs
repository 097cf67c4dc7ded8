//! Turning command-line strings into ids and instants.

use anyhow::{Context, Result, anyhow, bail};
use taskdeck_core::Task;
use taskdeck_core::id::{SubtaskId, TaskId};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Marks a reference as an id prefix even when it is all digits.
pub const ID_MARKER: &str = "id:";

/// Resolve a task reference: a 1-based position in stored order, or a
/// unique prefix of the task id. All-digit references are positions unless
/// written as `id:<prefix>`.
pub fn resolve_task(tasks: &[Task], raw: &str) -> Result<TaskId> {
    let raw = raw.trim();
    if let Some(prefix) = raw.strip_prefix(ID_MARKER) {
        return unique_prefix(tasks.iter().map(|task| task.id), prefix.trim(), "task");
    }
    if let Ok(position) = raw.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|idx| tasks.get(idx))
            .map(|task| task.id)
            .ok_or_else(|| anyhow!("no task at position {position}"));
    }
    unique_prefix(tasks.iter().map(|task| task.id), raw, "task")
}

/// Resolve a subtask reference within `task` the same way.
pub fn resolve_subtask(task: &Task, raw: &str) -> Result<SubtaskId> {
    let raw = raw.trim();
    if let Some(prefix) = raw.strip_prefix(ID_MARKER) {
        return unique_prefix(task.subtasks.iter().map(|sub| sub.id), prefix.trim(), "subtask");
    }
    if let Ok(position) = raw.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|idx| task.subtasks.get(idx))
            .map(|sub| sub.id)
            .ok_or_else(|| anyhow!("no subtask at position {position} in '{}'", task.title));
    }
    unique_prefix(task.subtasks.iter().map(|sub| sub.id), raw, "subtask")
}

fn unique_prefix<I, T>(ids: I, raw: &str, kind: &str) -> Result<T>
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display + Copy,
{
    if raw.is_empty() {
        bail!("empty {kind} reference");
    }
    let needle = raw.to_ascii_lowercase();
    let mut matches = ids.into_iter().filter(|id| id.to_string().starts_with(&needle));
    let first = matches.next().ok_or_else(|| anyhow!("no {kind} matches '{raw}'"))?;
    if matches.next().is_some() {
        bail!("{kind} reference '{raw}' is ambiguous");
    }
    Ok(first)
}

/// Parse a user-supplied instant. Dates and local times are read in the
/// offset of `now`; date-only input means the start of that day.
pub fn parse_instant(raw: &str, now: OffsetDateTime) -> Result<OffsetDateTime> {
    let raw = raw.trim();
    let offset = now.offset();
    match raw.to_ascii_lowercase().as_str() {
        "today" => return Ok(now.date().midnight().assume_offset(offset)),
        "tomorrow" => {
            let day = now.date().next_day().context("there is no day after today")?;
            return Ok(day.midnight().assume_offset(offset));
        }
        _ => {}
    }
    if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(instant);
    }
    if let Ok(local) = PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day] [hour]:[minute]")) {
        return Ok(local.assume_offset(offset));
    }
    let date = parse_date(raw)?;
    Ok(date.midnight().assume_offset(offset))
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::Subtask;
    use time::macros::{date, datetime, offset};
    use uuid::Uuid;

    const NOW: OffsetDateTime = datetime!(2025-06-10 09:30 +2);

    fn tasks() -> Vec<Task> {
        ["first", "second"]
            .iter()
            .zip([0x0aa0_u128, 0x0bb0])
            .map(|(title, n)| {
                Task::new(TaskId(Uuid::from_u128(n << 112)), *title, NOW)
            })
            .collect()
    }

    #[test]
    fn positions_are_one_based() {
        let tasks = tasks();
        let id = resolve_task(&tasks, "2").unwrap_or_else(|err| panic!("resolve: {err}"));
        assert_eq!(id, tasks[1].id);
        assert!(resolve_task(&tasks, "0").is_err());
        assert!(resolve_task(&tasks, "3").is_err());
    }

    #[test]
    fn id_prefix_must_be_unique() {
        let tasks = tasks();
        let id = resolve_task(&tasks, "0AA").unwrap_or_else(|err| panic!("resolve: {err}"));
        assert_eq!(id, tasks[0].id);
        assert!(resolve_task(&tasks, "0").is_err());
        assert!(resolve_task(&tasks, "0a").is_ok());
        assert!(resolve_task(&tasks, "ff").is_err());
    }

    #[test]
    fn ambiguous_prefix_is_rejected() {
        let mut tasks = tasks();
        tasks[1].id = TaskId(Uuid::from_u128(0x0aa1_u128 << 112));
        let err = resolve_task(&tasks, "0aa").err().unwrap_or_else(|| panic!("expected error"));
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn subtasks_resolve_by_position_or_prefix() {
        let mut task = tasks().remove(0);
        let sub = SubtaskId(Uuid::from_u128(0xabc0_u128 << 112));
        task.subtasks.push(Subtask::new(sub, "step"));
        assert_eq!(resolve_subtask(&task, "1").ok(), Some(sub));
        assert_eq!(resolve_subtask(&task, "abc").ok(), Some(sub));
        assert!(resolve_subtask(&task, "2").is_err());
    }

    #[test]
    fn date_only_input_is_local_midnight() {
        let parsed = parse_instant("2025-06-12", NOW).unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(parsed, datetime!(2025-06-12 00:00 +2));
        assert_eq!(parsed.offset(), offset!(+2));
    }

    #[test]
    fn accepts_local_time_and_rfc3339() {
        let local = parse_instant("2025-06-12 14:45", NOW).unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(local, datetime!(2025-06-12 14:45 +2));
        let exact =
            parse_instant("2025-06-12T14:45:00Z", NOW).unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(exact, datetime!(2025-06-12 14:45 UTC));
    }

    #[test]
    fn relative_words_follow_now() {
        let today = parse_instant("Today", NOW).unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(today.date(), date!(2025 - 06 - 10));
        let tomorrow = parse_instant("tomorrow", NOW).unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(tomorrow.date(), date!(2025 - 06 - 11));
    }

    #[test]
    fn digit_only_id_prefixes_need_the_marker() {
        let mut tasks = tasks();
        tasks[1].id = TaskId(Uuid::from_u128(0x0197_u128 << 112));
        assert!(resolve_task(&tasks, "0197").is_err());
        let id = resolve_task(&tasks, "id:0197").unwrap_or_else(|err| panic!("resolve: {err}"));
        assert_eq!(id, tasks[1].id);
        assert!(resolve_task(&tasks, "id:").is_err());

        let mut task = tasks.remove(0);
        let sub = SubtaskId(Uuid::from_u128(0x4200_u128 << 112));
        task.subtasks.push(Subtask::new(sub, "step"));
        assert!(resolve_subtask(&task, "42").is_err());
        assert_eq!(resolve_subtask(&task, "id:42").ok(), Some(sub));
    }

    #[test]
    fn tomorrow_at_the_end_of_the_range_is_an_error() {
        let last = datetime!(9999-12-31 12:00 UTC);
        assert!(parse_instant("tomorrow", last).is_err());
        assert_eq!(
            parse_instant("today", last).ok().map(|at| at.date()),
            Some(date!(9999 - 12 - 31))
        );
    }

    #[test]
    fn garbage_dates_are_rejected() {
        assert!(parse_instant("next tuesday", NOW).is_err());
        assert!(parse_date("2025-13-01").is_err());
    }
}
