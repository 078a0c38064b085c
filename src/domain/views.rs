use super::task::Task;

/// Counts shown next to the day's list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub incomplete: usize,
    pub total: usize,
}

impl Summary {
    pub fn completed(&self) -> usize {
        self.total - self.incomplete
    }
}

pub fn compute_summary(tasks: &[Task]) -> Summary {
    Summary {
        incomplete: tasks.iter().filter(|t| !t.completed).count(),
        total: tasks.len(),
    }
}

/// Check mark for a task line
pub fn status_badge(task: &Task) -> &'static str {
    if task.completed {
        "[x]"
    } else {
        "[ ]"
    }
}
