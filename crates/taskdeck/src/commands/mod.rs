use anyhow::{Context, Result, anyhow, bail};
use taskdeck_app::{FieldPatch, NewTask, TaskService, TaskUpdate};
use taskdeck_core::id::TaskId;
use taskdeck_core::{Recurrence, SortDirection, Task};
use taskdeck_store::BlobStore;
use time::OffsetDateTime;

use crate::{AddArgs, Command, EditArgs, LsArgs, SubtaskCommand};

mod input;
mod render;

use input::{parse_date, parse_instant, resolve_subtask, resolve_task};

pub fn run<B: BlobStore>(command: Command, service: &mut TaskService<B>) -> Result<()> {
    match command {
        Command::Add(args) => add(args, service),
        Command::Edit(args) => edit(args, service),
        Command::Done { task } => {
            let id = resolve_task(service.all_tasks(), &task)?;
            service.toggle_task(id);
            ensure_saved(service)?;
            let task = find(service.all_tasks(), id)?;
            let verb = if task.completed { "completed" } else { "reopened" };
            println!("{verb}: {}", task.title);
            Ok(())
        }
        Command::Rm { task } => {
            let id = resolve_task(service.all_tasks(), &task)?;
            let title = find(service.all_tasks(), id)?.title.clone();
            service.delete_task(id);
            ensure_saved(service)?;
            println!("deleted: {title}");
            Ok(())
        }
        Command::Subtask { cmd } => subtask(cmd, service),
        Command::Move { from, to } => move_task(from, to, service),
        Command::Ls(args) => list(args, service),
        Command::Tags => {
            for tag in service.all_tags() {
                println!("{tag}");
            }
            Ok(())
        }
        Command::Week { date } => {
            let anchor = date.as_deref().map(parse_date).transpose()?;
            let (week, days) = service.week_agenda(anchor);
            let tasks = service.all_tasks();
            print!("{}", render::week(week, &days, |task| position_of(tasks, task.id)));
            Ok(())
        }
        Command::Show { task, json } => {
            let id = resolve_task(service.all_tasks(), &task)?;
            let task = find(service.all_tasks(), id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(task)?);
            } else {
                print!("{}", render::task_detail(task, service.store().now().offset()));
            }
            Ok(())
        }
    }
}

fn add<B: BlobStore>(args: AddArgs, service: &mut TaskService<B>) -> Result<()> {
    let AddArgs {
        title,
        description,
        priority,
        due,
        tags,
        subtasks,
        repeat,
        remind,
    } = args;
    let now = service.store().now();
    let input = NewTask {
        title,
        description,
        priority,
        due_date: due.map(|raw| parse_instant(&raw, now)).transpose()?,
        tags,
        subtasks,
        recurrence: Recurrence::from(repeat),
        reminder_at: remind.map(|raw| parse_instant(&raw, now)).transpose()?,
    };
    let id = service.create_task(input)?;
    ensure_saved(service)?;
    let position = position_of(service.all_tasks(), id);
    println!("created task {position}: {id}");
    Ok(())
}

fn edit<B: BlobStore>(args: EditArgs, service: &mut TaskService<B>) -> Result<()> {
    let EditArgs {
        task,
        title,
        description,
        priority,
        due,
        clear_due,
        tags,
        clear_tags,
        repeat,
        no_repeat,
        remind,
        clear_remind,
    } = args;
    let id = resolve_task(service.all_tasks(), &task)?;
    let now = service.store().now();
    let update = TaskUpdate {
        title,
        description,
        priority,
        due_date: patch(due, clear_due, now)?,
        tags: if clear_tags {
            Some(Vec::new())
        } else {
            Some(tags).filter(|tags| !tags.is_empty())
        },
        recurrence: if no_repeat {
            Some(Recurrence::NotRecurring)
        } else {
            repeat.map(|period| Recurrence::from(Some(period)))
        },
        reminder_at: patch(remind, clear_remind, now)?,
        ..TaskUpdate::default()
    };
    if update.is_empty() {
        bail!("nothing to change; pass at least one field flag");
    }
    if service.update_task(id, update)? {
        ensure_saved(service)?;
        println!("updated task: {id}");
    } else {
        println!("task unchanged: {id}");
    }
    Ok(())
}

fn subtask<B: BlobStore>(command: SubtaskCommand, service: &mut TaskService<B>) -> Result<()> {
    match command {
        SubtaskCommand::Add { task, title } => {
            let id = resolve_task(service.all_tasks(), &task)?;
            let Some(sub) = service.add_subtask(id, title) else {
                bail!("no task {id}");
            };
            ensure_saved(service)?;
            println!("added subtask {sub}");
        }
        SubtaskCommand::Toggle { task, subtask } => {
            let id = resolve_task(service.all_tasks(), &task)?;
            let sub = resolve_subtask(find(service.all_tasks(), id)?, &subtask)?;
            service.toggle_subtask(id, sub);
            ensure_saved(service)?;
            let task = find(service.all_tasks(), id)?;
            println!("{}: {}% done", task.title, task.completion_percentage());
        }
        SubtaskCommand::Rm { task, subtask } => {
            let id = resolve_task(service.all_tasks(), &task)?;
            let sub = resolve_subtask(find(service.all_tasks(), id)?, &subtask)?;
            service.delete_subtask(id, sub);
            ensure_saved(service)?;
            println!("deleted subtask {sub}");
        }
    }
    Ok(())
}

fn move_task<B: BlobStore>(from: usize, to: usize, service: &mut TaskService<B>) -> Result<()> {
    let len = service.all_tasks().len();
    let (Some(from_idx), Some(to_idx)) = (from.checked_sub(1), to.checked_sub(1)) else {
        bail!("positions start at 1");
    };
    service
        .reorder(from_idx, to_idx)
        .with_context(|| format!("cannot move {from} to {to} in a list of {len}"))?;
    ensure_saved(service)?;
    println!("moved task {from} to position {to}");
    Ok(())
}

fn list<B: BlobStore>(args: LsArgs, service: &mut TaskService<B>) -> Result<()> {
    let LsArgs {
        filter,
        search,
        sort,
        desc,
        tags,
        counts,
    } = args;
    if let Some(filter) = filter {
        service.set_filter(filter);
    }
    if let Some(search) = search {
        service.set_search(search);
    }
    if let Some(key) = sort {
        if service.view().config().sort_key != key {
            service.set_sort(key);
        }
        service.set_sort_direction(SortDirection::Ascending);
    }
    if desc {
        service.set_sort_direction(SortDirection::Descending);
    }
    if !tags.is_empty() {
        service.select_tags(
            tags.iter()
                .map(|tag| tag.trim())
                .filter(|tag| !tag.is_empty()),
        );
    }

    let offset = service.store().now().offset();
    let visible = service.filtered_tasks();
    if visible.is_empty() {
        println!("No tasks matched the current view");
    }
    for task in &visible {
        let position = position_of(service.all_tasks(), task.id);
        println!("{}", render::task_line(position, task, offset));
    }
    if counts {
        println!();
        println!("{}", render::counts(&service.filter_counts()));
    }
    Ok(())
}

fn patch(
    value: Option<String>,
    clear: bool,
    now: OffsetDateTime,
) -> Result<Option<FieldPatch<OffsetDateTime>>> {
    if clear {
        return Ok(Some(FieldPatch::Clear));
    }
    value
        .map(|raw| parse_instant(&raw, now).map(FieldPatch::Set))
        .transpose()
}

/// The store keeps in-memory changes when a save fails, but this process is
/// about to exit, so the failure has to reach the user.
fn ensure_saved<B: BlobStore>(service: &TaskService<B>) -> Result<()> {
    service
        .store()
        .last_save_error()
        .map_or(Ok(()), |err| Err(anyhow!("changes were not saved: {err}")))
}

fn find(tasks: &[Task], id: TaskId) -> Result<&Task> {
    tasks
        .iter()
        .find(|task| task.id == id)
        .ok_or_else(|| anyhow!("no task {id}"))
}

fn position_of(tasks: &[Task], id: TaskId) -> usize {
    tasks.iter().position(|task| task.id == id).map_or(0, |idx| idx + 1)
}
