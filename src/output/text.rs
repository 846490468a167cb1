#![forbid(unsafe_code)]

use std::fmt::Write as _;

use time::format_description::well_known::Rfc3339;

use crate::output::table::Table;
use crate::task::model::{Task, TaskState};
use crate::task::tracker::{StateCounts, TreeRow};

const INDENT: &str = "  ";

#[must_use]
pub fn task_table(tasks: &[Task]) -> Table {
    let mut t = Table::new(["ID", "STATE", "TITLE", "PARENT"]);
    for task in tasks {
        t.row([
            task.id.clone(),
            task.state.to_string(),
            task.title.clone(),
            task.parent.clone().unwrap_or_else(|| "-".to_owned()),
        ]);
    }
    t
}

/// One line per task: `<indent><id> [<state>]`.
#[must_use]
pub fn render_tree(rows: &[TreeRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            &mut out,
            "{}{} [{}]",
            INDENT.repeat(row.depth),
            row.task.id,
            row.task.state
        );
    }
    out
}

#[must_use]
pub fn render_status(counts: &StateCounts) -> String {
    let mut out = String::new();
    for state in TaskState::ALL {
        let _ = writeln!(&mut out, "{state}: {}", counts.get(state));
    }
    let _ = writeln!(&mut out, "total: {}", counts.total());
    out
}

#[must_use]
pub fn render_details(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(&mut out, "ID: {}", task.id);
    let _ = writeln!(&mut out, "Title: {}", task.title);
    let _ = writeln!(&mut out, "State: {}", task.state);
    if let Some(parent) = task.parent.as_deref() {
        let _ = writeln!(&mut out, "Parent: {parent}");
    }
    let _ = writeln!(&mut out, "Created: {}", format_time(task.created));
    let _ = writeln!(&mut out, "Updated: {}", format_time(task.updated));
    if let Some(notes) = task.notes.as_deref()
        && !notes.trim().is_empty()
    {
        let _ = write!(&mut out, "\nNotes:\n{notes}");
        if !notes.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

fn format_time(t: time::OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_else(|_| "unknown".to_owned())
}
