use super::date::DateLabel;
use super::task::Task;
use super::task_list::sanitize_tasks;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Completed tasks archived per day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryArchive {
    days: HashMap<DateLabel, Vec<Task>>,
}

impl HistoryArchive {
    pub fn from_days(days: HashMap<DateLabel, Vec<Task>>) -> Self {
        Self { days }
    }

    /// Apply the load-time task cleanup to every day
    pub fn sanitized(self) -> Self {
        Self {
            days: self
                .days
                .into_iter()
                .map(|(date, tasks)| (date, sanitize_tasks(tasks)))
                .collect(),
        }
    }

    pub fn get(&self, date: &DateLabel) -> Option<&[Task]> {
        self.days.get(date).map(Vec::as_slice)
    }

    pub fn contains(&self, date: &DateLabel) -> bool {
        self.days.contains_key(date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// Store a day's completed tasks, replacing any earlier entry for that label
    pub fn archive(&mut self, date: DateLabel, tasks: Vec<Task>) {
        if self.days.insert(date.clone(), tasks).is_some() {
            log::warn!("History entry for {} was overwritten", date);
        }
    }

    /// Delete a whole day. Unknown dates are ignored.
    pub fn remove_day(&mut self, date: &DateLabel) -> bool {
        self.days.remove(date).is_some()
    }

    /// Day labels, most recent first
    pub fn sorted_dates(&self) -> Vec<DateLabel> {
        let mut dates: Vec<DateLabel> = self.days.keys().cloned().collect();
        dates.sort_by(DateLabel::cmp_recent_first);
        dates
    }

    /// Fold another archive in. Tasks already present under the same day
    /// (by id) are skipped. Returns the number of tasks added.
    pub fn merge(&mut self, other: HistoryArchive) -> usize {
        let mut added = 0;
        for (date, tasks) in other.days {
            let entry = self.days.entry(date).or_default();
            for task in tasks {
                if !entry.iter().any(|t| t.id == task.id) {
                    entry.push(task);
                    added += 1;
                }
            }
        }
        added
    }
}
