use super::command::Command;
use crate::app::AppState;
use crate::persistence::KeyValueStore;
use crate::ui;
use anyhow::Result;
use std::io::Write;

/// Apply one command to the app, writing any feedback to `out`.
/// Returns true when the shell should exit.
pub fn handle_command<S, W>(app: &mut AppState<S>, command: Command, out: &mut W) -> Result<bool>
where
    S: KeyValueStore,
    W: Write,
{
    // Midnight may have passed since the last command
    if app.has_day_changed() {
        let outcome = app.reconcile_day_change()?;
        if let Some(notice) = ui::render_rollover(&outcome) {
            writeln!(out, "{}", notice)?;
        }
    }

    match command {
        Command::Add(text) => {
            if app.add_task(&text).is_some() {
                write!(out, "{}", ui::render_tasks(app.active_date(), app.tasks()))?;
            }
        }
        Command::Toggle(position) => {
            if let Some(id) = app.task_id_at(position) {
                app.toggle_task(&id);
                write!(out, "{}", ui::render_tasks(app.active_date(), app.tasks()))?;
            }
        }
        Command::Remove(position) => {
            if let Some(id) = app.task_id_at(position) {
                app.remove_task(&id);
                write!(out, "{}", ui::render_tasks(app.active_date(), app.tasks()))?;
            }
        }
        Command::List => {
            write!(out, "{}", ui::render_tasks(app.active_date(), app.tasks()))?;
        }
        Command::ToggleHistory => {
            app.toggle_show_history();
            if app.show_history {
                write!(out, "{}", ui::render_history(app.history()))?;
            } else {
                write!(out, "{}", ui::render_tasks(app.active_date(), app.tasks()))?;
            }
        }
        Command::Forget(date) => {
            if app.remove_history_day(&date) {
                writeln!(out, "Removed {} from history", date)?;
            }
        }
        Command::ToggleTheme => {
            app.toggle_theme();
            writeln!(out, "Theme: {}", ui::theme_name(app.dark_mode()))?;
        }
        Command::Sync => {
            if app.flush() {
                writeln!(out, "All changes saved")?;
            } else {
                writeln!(out, "{} write(s) still pending", app.pending_writes())?;
            }
        }
        Command::Help => writeln!(out, "{}", ui::HELP)?,
        Command::Quit => return Ok(true),
        Command::Empty => {}
        Command::Unknown(line) => {
            writeln!(out, "Unknown command: {} (type 'help')", line)?;
        }
    }

    Ok(false)
}
