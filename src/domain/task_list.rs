use super::task::{Task, TaskId};
use super::views::{compute_summary, Summary};
use chrono::{DateTime, Local};
use std::collections::HashSet;

/// Clean up loaded tasks: blank text and repeated ids are dropped, and the
/// completion stamp is repaired
pub(crate) fn sanitize_tasks(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(tasks.len());

    for mut task in tasks {
        if task.text.trim().is_empty() {
            log::warn!("Dropping task {} with empty text", task.id);
            continue;
        }
        if !seen.insert(task.id.clone()) {
            log::warn!("Dropping duplicate task id {}", task.id);
            continue;
        }
        if task.normalize() {
            log::warn!("Repaired completion stamp on task {}", task.id);
        }
        kept.push(task);
    }

    kept
}

/// The active day's tasks, in display order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    /// Build from loaded tasks, dropping blank entries and repeated ids
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: sanitize_tasks(tasks),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Id of the task at a 0-based display position
    pub fn id_at(&self, index: usize) -> Option<&TaskId> {
        self.tasks.get(index).map(|t| &t.id)
    }

    /// Append a new task. Blank text is ignored.
    pub fn add(&mut self, text: &str, now: DateTime<Local>) -> Option<TaskId> {
        let task = Task::new(text, now)?;
        let id = task.id.clone();
        self.tasks.push(task);
        Some(id)
    }

    /// Flip completion of a task. Unknown ids are ignored.
    pub fn toggle(&mut self, id: &TaskId, now: DateTime<Local>) -> bool {
        match self.tasks.iter_mut().find(|t| &t.id == id) {
            Some(task) => {
                task.toggle(now);
                true
            }
            None => false,
        }
    }

    /// Remove a task. Unknown ids are ignored.
    pub fn remove(&mut self, id: &TaskId) -> bool {
        match self.tasks.iter().position(|t| &t.id == id) {
            Some(idx) => {
                self.tasks.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Empty the list, returning what it held
    pub fn take_all(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks)
    }

    pub fn summary(&self) -> Summary {
        compute_summary(&self.tasks)
    }
}
