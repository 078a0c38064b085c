use super::migration::migrate;
use super::outbox::Outbox;
use super::schema::{read_stored_state, to_json};
use super::store::{KeyValueStore, HISTORY_KEY, LAST_CLEAR_DATE_KEY, TODOS_KEY};
use crate::domain::{Clock, DateLabel, HistoryArchive, Task, TaskList};
use anyhow::Result;

/// What the day check did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloverOutcome {
    /// Stored day is today, nothing changed
    Stable,
    /// A new day started; `archived` completed tasks went to history under
    /// `from` and `discarded` incomplete ones were dropped
    RolledOver {
        from: DateLabel,
        to: DateLabel,
        archived: usize,
        discarded: usize,
    },
}

/// The day being tracked plus its archive
#[derive(Debug, Clone, PartialEq)]
pub struct DayState {
    pub active_date: DateLabel,
    pub tasks: TaskList,
    pub history: HistoryArchive,
}

/// Split tasks into (completed, incomplete), keeping order within each
pub fn partition_completed(tasks: Vec<Task>) -> (Vec<Task>, Vec<Task>) {
    tasks.into_iter().partition(|t| t.completed)
}

/// Move the active list over to `today` if the tracked day is stale.
///
/// Completed tasks are archived under the old day (replacing any entry with
/// that label), incomplete ones are dropped and the list is emptied. The
/// writes are queued history → marker → list. Until all three land the
/// store still holds the stale marker and the full list, so a restart
/// re-runs the same partition.
pub fn roll_over(day: &mut DayState, today: &DateLabel, outbox: &mut Outbox) -> Result<RolloverOutcome> {
    if &day.active_date == today {
        return Ok(RolloverOutcome::Stable);
    }

    let from = std::mem::replace(&mut day.active_date, today.clone());
    let (completed, incomplete) = partition_completed(day.tasks.take_all());
    let archived = completed.len();
    let discarded = incomplete.len();

    if !completed.is_empty() {
        day.history.archive(from.clone(), completed);
        outbox.enqueue_set(HISTORY_KEY, to_json(&day.history)?);
    }
    outbox.enqueue_set(LAST_CLEAR_DATE_KEY, to_json(today)?);
    outbox.enqueue_set(TODOS_KEY, to_json(day.tasks.tasks())?);

    log::info!(
        "Day rolled over from {} to {}: archived {}, discarded {}",
        from,
        today,
        archived,
        discarded
    );

    Ok(RolloverOutcome::RolledOver {
        from,
        to: today.clone(),
        archived,
        discarded,
    })
}

/// Result of the startup load
#[derive(Debug)]
pub struct LoadedState {
    pub day: DayState,
    pub dark_mode: bool,
    pub outcome: RolloverOutcome,
    /// False while any startup write is still queued
    pub committed: bool,
    /// The store could not be read, so today's marker was not written. It
    /// has to land before the first write of the active list.
    pub marker_deferred: bool,
}

/// Load persisted state and reconcile it with the calendar.
///
/// Runs before anything else touches the task data:
/// 1. Read every key (corrupt keys fall back to defaults)
/// 2. Migrate older layouts
/// 3. On first run, stamp today as the tracked day
/// 4. Roll over if the tracked day is not today
/// 5. Flush the queued writes in order
pub fn load_and_reconcile(
    store: &mut dyn KeyValueStore,
    clock: &dyn Clock,
    outbox: &mut Outbox,
) -> Result<LoadedState> {
    let today = clock.today();
    let mut stored = read_stored_state(store);

    if stored.readable {
        migrate(&mut stored, outbox)?;
    }

    let active_date = match stored.last_clear_date.take() {
        Some(date) => date,
        None => {
            if stored.readable {
                outbox.enqueue_set(LAST_CLEAR_DATE_KEY, to_json(&today)?);
            }
            today.clone()
        }
    };

    let mut day = DayState {
        active_date,
        tasks: TaskList::from_tasks(stored.tasks),
        history: stored.history,
    };

    let outcome = roll_over(&mut day, &today, outbox)?;
    outbox.flush(store);

    let committed = outbox.is_empty();
    if !committed {
        log::warn!(
            "{} startup write(s) pending; stored state will be reconciled again on next load",
            outbox.len()
        );
    }

    Ok(LoadedState {
        day,
        dark_mode: stored.dark_mode,
        outcome,
        committed,
        marker_deferred: !stored.readable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManualClock;
    use crate::persistence::schema::{parse_history, parse_tasks};
    use crate::persistence::store::{LEGACY_HISTORY_KEY, SCHEMA_VERSION_KEY};
    use crate::persistence::MemoryStore;
    use pretty_assertions::assert_eq;

    const TODOS_A_DONE_B_OPEN: &str = r#"[
        {"id":"a","text":"A","completed":true,"createdAt":"2025-01-01T09:00:00Z","completedAt":"2025-01-01T10:00:00Z"},
        {"id":"b","text":"B","completed":false,"createdAt":"2025-01-01T09:05:00Z"}
    ]"#;

    const TODOS_BOTH_OPEN: &str = r#"[
        {"id":"a","text":"A","completed":false,"createdAt":"2025-01-01T09:00:00Z"},
        {"id":"b","text":"B","completed":false,"createdAt":"2025-01-01T09:05:00Z"}
    ]"#;

    fn jan_2() -> ManualClock {
        ManualClock::at(2025, 1, 2, 8, 0)
    }

    fn store_from(todos: &str, last_clear: &str) -> MemoryStore {
        MemoryStore::with_values([
            (TODOS_KEY, todos.to_string()),
            (LAST_CLEAR_DATE_KEY, format!("\"{}\"", last_clear)),
            (SCHEMA_VERSION_KEY, "1".to_string()),
        ])
    }

    fn load(store: &mut MemoryStore, clock: &ManualClock) -> LoadedState {
        let mut outbox = Outbox::new();
        load_and_reconcile(store, clock, &mut outbox).unwrap()
    }

    #[test]
    fn test_rollover_archives_completed_and_discards_rest() {
        let mut store = store_from(TODOS_A_DONE_B_OPEN, "January 1, 2025");
        let loaded = load(&mut store, &jan_2());

        assert_eq!(
            loaded.outcome,
            RolloverOutcome::RolledOver {
                from: "January 1, 2025".into(),
                to: "January 2, 2025".into(),
                archived: 1,
                discarded: 1,
            }
        );
        assert!(loaded.committed);
        assert!(loaded.day.tasks.is_empty());
        assert_eq!(loaded.day.active_date.as_str(), "January 2, 2025");

        let history = parse_history(store.value(HISTORY_KEY).unwrap()).unwrap();
        let archived = history.get(&"January 1, 2025".into()).unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].text, "A");

        assert!(parse_tasks(store.value(TODOS_KEY).unwrap()).unwrap().is_empty());
        assert_eq!(store.value(LAST_CLEAR_DATE_KEY), Some("\"January 2, 2025\""));
    }

    #[test]
    fn test_rollover_without_completed_adds_no_history() {
        let mut store = store_from(TODOS_BOTH_OPEN, "January 1, 2025");
        let loaded = load(&mut store, &jan_2());

        assert!(loaded.day.history.is_empty());
        assert!(!store.contains(HISTORY_KEY));
        assert_eq!(store.value(TODOS_KEY), Some("[]"));
        assert_eq!(store.writes(), [LAST_CLEAR_DATE_KEY, TODOS_KEY]);
    }

    #[test]
    fn test_rollover_writes_in_order() {
        let mut store = store_from(TODOS_A_DONE_B_OPEN, "January 1, 2025");
        load(&mut store, &jan_2());

        assert_eq!(store.writes(), [HISTORY_KEY, LAST_CLEAR_DATE_KEY, TODOS_KEY]);
    }

    #[test]
    fn test_second_load_same_day_is_noop() {
        let mut store = store_from(TODOS_A_DONE_B_OPEN, "January 1, 2025");
        let clock = jan_2();
        load(&mut store, &clock);

        let todos = store.value(TODOS_KEY).map(str::to_string);
        let history = store.value(HISTORY_KEY).map(str::to_string);
        let marker = store.value(LAST_CLEAR_DATE_KEY).map(str::to_string);
        store.clear_writes();

        let loaded = load(&mut store, &clock);
        assert_eq!(loaded.outcome, RolloverOutcome::Stable);
        assert!(store.writes().is_empty());
        assert_eq!(store.value(TODOS_KEY).map(str::to_string), todos);
        assert_eq!(store.value(HISTORY_KEY).map(str::to_string), history);
        assert_eq!(store.value(LAST_CLEAR_DATE_KEY).map(str::to_string), marker);
    }

    #[test]
    fn test_failed_marker_write_is_retried_on_next_load() {
        let mut store = store_from(TODOS_A_DONE_B_OPEN, "January 1, 2025");
        store.fail_writes_to(LAST_CLEAR_DATE_KEY);

        let loaded = load(&mut store, &jan_2());
        assert!(!loaded.committed);
        // history landed, marker failed, list never cleared
        assert!(store.contains(HISTORY_KEY));
        assert_eq!(store.value(LAST_CLEAR_DATE_KEY), Some("\"January 1, 2025\""));
        assert_eq!(store.value(TODOS_KEY), Some(TODOS_A_DONE_B_OPEN));

        store.clear_failures();
        let reloaded = load(&mut store, &jan_2());
        assert!(reloaded.committed);
        assert!(matches!(reloaded.outcome, RolloverOutcome::RolledOver { archived: 1, .. }));

        let history = parse_history(store.value(HISTORY_KEY).unwrap()).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(&"January 1, 2025".into()).unwrap().len(), 1);
        assert_eq!(store.value(TODOS_KEY), Some("[]"));
    }

    #[test]
    fn test_failed_history_write_leaves_store_untouched() {
        let mut store = store_from(TODOS_A_DONE_B_OPEN, "January 1, 2025");
        store.fail_writes_to(HISTORY_KEY);

        let loaded = load(&mut store, &jan_2());
        assert!(!loaded.committed);
        assert!(store.writes().is_empty());
        assert_eq!(store.value(TODOS_KEY), Some(TODOS_A_DONE_B_OPEN));
    }

    #[test]
    fn test_failed_list_write_keeps_yesterdays_tasks_active() {
        let mut store = store_from(TODOS_A_DONE_B_OPEN, "January 1, 2025");
        store.fail_writes_to(TODOS_KEY);

        let loaded = load(&mut store, &jan_2());
        assert!(!loaded.committed);
        assert!(loaded.day.tasks.is_empty());
        assert_eq!(store.writes(), [HISTORY_KEY, LAST_CLEAR_DATE_KEY]);
        assert_eq!(store.value(TODOS_KEY), Some(TODOS_A_DONE_B_OPEN));

        // marker already says today, so the old list comes back as today's
        // and the finished task is also in history
        store.clear_failures();
        let reloaded = load(&mut store, &jan_2());
        assert_eq!(reloaded.outcome, RolloverOutcome::Stable);
        assert_eq!(reloaded.day.tasks.len(), 2);
        let archived = reloaded.day.history.get(&"January 1, 2025".into()).unwrap();
        assert_eq!(archived[0].id, reloaded.day.tasks.tasks()[0].id);
    }

    #[test]
    fn test_first_run_stamps_today() {
        let mut store = MemoryStore::new();
        let loaded = load(&mut store, &jan_2());

        assert_eq!(loaded.outcome, RolloverOutcome::Stable);
        assert_eq!(store.value(LAST_CLEAR_DATE_KEY), Some("\"January 2, 2025\""));
        assert_eq!(store.value(SCHEMA_VERSION_KEY), Some("1"));
    }

    #[test]
    fn test_missing_marker_keeps_existing_tasks() {
        let mut store = MemoryStore::with_values([(TODOS_KEY, TODOS_A_DONE_B_OPEN)]);
        let loaded = load(&mut store, &jan_2());

        assert_eq!(loaded.outcome, RolloverOutcome::Stable);
        assert_eq!(loaded.day.tasks.len(), 2);
    }

    #[test]
    fn test_legacy_history_survives_rollover() {
        let mut store = store_from(TODOS_A_DONE_B_OPEN, "January 1, 2025");
        store.set(SCHEMA_VERSION_KEY, "0").unwrap();
        store
            .set(
                LEGACY_HISTORY_KEY,
                r#"{"December 31, 2024":[{"id":"z","text":"Z","completed":true,
                    "createdAt":"2024-12-31T09:00:00Z","completedAt":"2024-12-31T10:00:00Z"}]}"#,
            )
            .unwrap();
        store.clear_writes();

        let loaded = load(&mut store, &jan_2());
        assert_eq!(
            loaded.day.history.sorted_dates(),
            vec![
                DateLabel::new("January 1, 2025"),
                DateLabel::new("December 31, 2024"),
            ]
        );
        assert!(!store.contains(LEGACY_HISTORY_KEY));

        let history = parse_history(store.value(HISTORY_KEY).unwrap()).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_corrupt_todos_are_backed_up() {
        let mut store = store_from("{{{", "January 2, 2025");
        let loaded = load(&mut store, &jan_2());

        assert!(loaded.day.tasks.is_empty());
        assert_eq!(store.value("todos.corrupt"), Some("{{{"));
    }

    #[test]
    fn test_unreadable_store_writes_nothing() {
        let mut store = store_from(TODOS_A_DONE_B_OPEN, "January 1, 2025");
        store.set_unreadable(true);
        store.clear_writes();

        let loaded = load(&mut store, &jan_2());
        assert_eq!(loaded.outcome, RolloverOutcome::Stable);
        assert!(loaded.day.tasks.is_empty());
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_partition_keeps_order() {
        let tasks = parse_tasks(TODOS_A_DONE_B_OPEN).unwrap();
        let (done, open) = partition_completed(tasks);
        assert_eq!(done[0].text, "A");
        assert_eq!(open[0].text, "B");
    }
}
