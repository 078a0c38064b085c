//! Plain-text rendering for the interactive shell

use crate::domain::{status_badge, DateLabel, HistoryArchive, Summary, Task, TaskList};
use crate::persistence::RolloverOutcome;

pub const HELP: &str = "\
Commands:
  add <text>          add a task for today
  toggle <n>, done <n> mark task n done / not done
  rm <n>              remove task n
  list                show today's tasks
  history             show or hide the history
  forget <date>       delete a day from history (e.g. forget January 5, 2025)
  theme               switch between light and dark
  sync                retry pending writes
  help                show this help
  quit                save and exit";

/// "2 of 5 left"
pub fn render_summary(summary: Summary) -> String {
    if summary.total == 0 {
        "Nothing planned yet".to_string()
    } else if summary.incomplete == 0 {
        format!("All {} done", summary.total)
    } else {
        format!("{} of {} left", summary.incomplete, summary.total)
    }
}

fn render_task_line(position: usize, task: &Task) -> String {
    match task.completed_at {
        Some(done_at) => format!(
            "{:>3}. {} {} ({})",
            position,
            status_badge(task),
            task.text,
            done_at.format("%H:%M")
        ),
        None => format!("{:>3}. {} {}", position, status_badge(task), task.text),
    }
}

/// Today's list with positions, headed by the day label and summary
pub fn render_tasks(date: &DateLabel, tasks: &TaskList) -> String {
    let mut out = format!("{} - {}\n", date, render_summary(tasks.summary()));
    for (idx, task) in tasks.tasks().iter().enumerate() {
        out.push_str(&render_task_line(idx + 1, task));
        out.push('\n');
    }
    out
}

/// Archived days, most recent first
pub fn render_history(history: &HistoryArchive) -> String {
    if history.is_empty() {
        return "History is empty\n".to_string();
    }

    let mut out = String::new();
    for date in history.sorted_dates() {
        let tasks = history.get(&date).unwrap_or_default();
        out.push_str(&format!("{} ({} done)\n", date, tasks.len()));
        for task in tasks {
            out.push_str(&format!("    - {}\n", task.text));
        }
    }
    out
}

pub fn render_rollover(outcome: &RolloverOutcome) -> Option<String> {
    match outcome {
        RolloverOutcome::Stable => None,
        RolloverOutcome::RolledOver {
            from,
            to,
            archived,
            discarded,
        } => Some(format!(
            "New day: {}. Archived {} finished task(s) from {}, dropped {} unfinished.",
            to, archived, from, discarded
        )),
    }
}

pub fn theme_name(dark: bool) -> &'static str {
    if dark {
        "dark"
    } else {
        "light"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_render_summary() {
        assert_eq!(render_summary(Summary { incomplete: 0, total: 0 }), "Nothing planned yet");
        assert_eq!(render_summary(Summary { incomplete: 0, total: 3 }), "All 3 done");
        assert_eq!(render_summary(Summary { incomplete: 2, total: 5 }), "2 of 5 left");
    }

    #[test]
    fn test_render_tasks() {
        let now = Local.with_ymd_and_hms(2025, 1, 5, 14, 2, 0).unwrap();
        let mut tasks = TaskList::default();
        let id = tasks.add("Write report", now).unwrap();
        tasks.add("Call Sam", now);
        tasks.toggle(&id, now);

        let text = render_tasks(&"January 5, 2025".into(), &tasks);
        assert_eq!(
            text,
            "January 5, 2025 - 1 of 2 left\n  1. [x] Write report (14:02)\n  2. [ ] Call Sam\n"
        );
    }

    #[test]
    fn test_render_history_order() {
        let now = Local::now();
        let mut history = HistoryArchive::default();
        let mut task = Task::new("old", now).unwrap();
        task.toggle(now);
        history.archive("January 5, 2025".into(), vec![task.clone()]);
        history.archive("March 1, 2025".into(), vec![task]);

        let text = render_history(&history);
        let march = text.find("March 1, 2025").unwrap();
        let january = text.find("January 5, 2025").unwrap();
        assert!(march < january);
    }

    #[test]
    fn test_render_rollover() {
        assert!(render_rollover(&RolloverOutcome::Stable).is_none());
        let text = render_rollover(&RolloverOutcome::RolledOver {
            from: "January 1, 2025".into(),
            to: "January 2, 2025".into(),
            archived: 1,
            discarded: 2,
        })
        .unwrap();
        assert!(text.contains("January 2, 2025"));
        assert!(text.contains("dropped 2"));
    }
}
