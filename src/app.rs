use crate::domain::{Clock, DateLabel, HistoryArchive, Summary, TaskId, TaskList};
use crate::persistence::schema::to_json;
use crate::persistence::{
    load_and_reconcile, roll_over, DayState, KeyValueStore, Outbox, RolloverOutcome,
    DARK_MODE_KEY, HISTORY_KEY, LAST_CLEAR_DATE_KEY, TODOS_KEY,
};
use anyhow::Result;

/// Main application state.
///
/// Owns the store, the clock and the write outbox. Every mutation is applied
/// in memory first, then queued for persistence and flushed.
pub struct AppState<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
    outbox: Outbox,
    day: DayState,
    dark_mode: bool,
    marker_deferred: bool,
    pub show_history: bool,
    pub last_outcome: RolloverOutcome,
    /// False when startup writes were still queued after load
    pub load_committed: bool,
}

impl<S: KeyValueStore> AppState<S> {
    /// Load from the store, rolling the day over if needed. Nothing else
    /// may touch the task data before this returns.
    pub fn load(mut store: S, clock: Box<dyn Clock>) -> Result<Self> {
        let mut outbox = Outbox::new();
        let loaded = load_and_reconcile(&mut store, &*clock, &mut outbox)?;

        Ok(Self {
            store,
            clock,
            outbox,
            day: loaded.day,
            dark_mode: loaded.dark_mode,
            marker_deferred: loaded.marker_deferred,
            show_history: false,
            last_outcome: loaded.outcome,
            load_committed: loaded.committed,
        })
    }

    pub fn tasks(&self) -> &TaskList {
        &self.day.tasks
    }

    pub fn history(&self) -> &HistoryArchive {
        &self.day.history
    }

    pub fn active_date(&self) -> &DateLabel {
        &self.day.active_date
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn summary(&self) -> Summary {
        self.day.tasks.summary()
    }

    pub fn sorted_history_dates(&self) -> Vec<DateLabel> {
        self.day.history.sorted_dates()
    }

    /// Id of the task shown at a 1-based position
    pub fn task_id_at(&self, position: usize) -> Option<TaskId> {
        position
            .checked_sub(1)
            .and_then(|idx| self.day.tasks.id_at(idx))
            .cloned()
    }

    /// Add a task. Blank text is ignored.
    pub fn add_task(&mut self, text: &str) -> Option<TaskId> {
        let id = self.day.tasks.add(text, self.clock.now())?;
        self.persist_tasks();
        Some(id)
    }

    /// Flip a task's completion. Unknown ids are ignored.
    pub fn toggle_task(&mut self, id: &TaskId) -> bool {
        let changed = self.day.tasks.toggle(id, self.clock.now());
        if changed {
            self.persist_tasks();
        }
        changed
    }

    /// Remove a task. Unknown ids are ignored.
    pub fn remove_task(&mut self, id: &TaskId) -> bool {
        let changed = self.day.tasks.remove(id);
        if changed {
            self.persist_tasks();
        }
        changed
    }

    /// Delete a whole day from history. Unknown dates are ignored.
    pub fn remove_history_day(&mut self, date: &DateLabel) -> bool {
        let changed = self.day.history.remove_day(date);
        if changed {
            let json = to_json(&self.day.history);
            self.persist(HISTORY_KEY, json);
        }
        changed
    }

    pub fn set_theme(&mut self, dark: bool) {
        self.dark_mode = dark;
        self.persist(DARK_MODE_KEY, to_json(&dark));
    }

    pub fn toggle_theme(&mut self) {
        self.set_theme(!self.dark_mode);
    }

    pub fn toggle_show_history(&mut self) {
        self.show_history = !self.show_history;
    }

    /// Check if the calendar day moved on since the state was loaded
    pub fn has_day_changed(&self) -> bool {
        self.clock.today() != self.day.active_date
    }

    /// Roll the in-memory day over when midnight passed during the session
    pub fn reconcile_day_change(&mut self) -> Result<RolloverOutcome> {
        let today = self.clock.today();
        let outcome = roll_over(&mut self.day, &today, &mut self.outbox)?;
        if outcome != RolloverOutcome::Stable {
            self.marker_deferred = false;
            self.flush();
            self.last_outcome = outcome.clone();
        }
        Ok(outcome)
    }

    /// Retry queued writes. Returns true when nothing is left pending.
    pub fn flush(&mut self) -> bool {
        self.outbox.flush(&mut self.store);
        self.outbox.is_empty()
    }

    pub fn pending_writes(&self) -> usize {
        self.outbox.len()
    }

    fn persist_tasks(&mut self) {
        // A list written without its day would look stale on the next load
        if self.marker_deferred {
            self.marker_deferred = false;
            let marker = to_json(&self.day.active_date);
            self.persist(LAST_CLEAR_DATE_KEY, marker);
        }
        let json = to_json(self.day.tasks.tasks());
        self.persist(TODOS_KEY, json);
    }

    fn persist(&mut self, key: &str, json: serde_json::Result<String>) {
        match json {
            Ok(value) => {
                self.outbox.enqueue_set(key, value);
                self.flush();
            }
            Err(e) => log::error!("Could not serialize {}: {}", key, e),
        }
    }
}
