use super::outbox::Outbox;
use super::schema::{to_json, StoredState, SCHEMA_VERSION};
use super::store::{HISTORY_KEY, LEGACY_HISTORY_KEY, SCHEMA_VERSION_KEY};
use anyhow::{bail, Result};

/// Bring a freshly read state up to the current layout.
///
/// 1. Refuse data written by a newer layout
/// 2. Fold a legacy `todosHistory` archive into `history`
/// 3. Record the current layout version
///
/// Writes are queued in that order: `history` lands before the legacy key is
/// removed, so a failure part way never loses archived days.
pub fn migrate(state: &mut StoredState, outbox: &mut Outbox) -> Result<()> {
    if state.schema_version > SCHEMA_VERSION {
        bail!(
            "Stored data uses layout version {}, this build supports up to {}",
            state.schema_version,
            SCHEMA_VERSION
        );
    }

    if let Some(legacy) = state.legacy_history.take() {
        let legacy_days = legacy.len();
        let added = state.history.merge(legacy);
        log::info!(
            "Merged {} task(s) from {} legacy history day(s) into {}",
            added,
            legacy_days,
            HISTORY_KEY
        );
        outbox.enqueue_set(HISTORY_KEY, to_json(&state.history)?);
        outbox.enqueue_remove(LEGACY_HISTORY_KEY);
    }

    if state.schema_version < SCHEMA_VERSION {
        log::info!(
            "Upgrading stored layout from version {} to {}",
            state.schema_version,
            SCHEMA_VERSION
        );
        state.schema_version = SCHEMA_VERSION;
        outbox.enqueue_set(SCHEMA_VERSION_KEY, to_json(&SCHEMA_VERSION)?);
    }

    Ok(())
}
