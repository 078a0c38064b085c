pub mod files;
pub mod memory;
pub mod migration;
pub mod outbox;
pub mod rollover;
pub mod schema;
pub mod store;

pub use files::{
    atomic_write, ensure_data_dir, get_data_dir, init_local_data_dir, FileStore, DATA_DIR_NAME,
};
pub use memory::MemoryStore;
pub use migration::migrate;
pub use outbox::{Outbox, PendingWrite, WriteOp};
pub use rollover::{load_and_reconcile, partition_completed, roll_over, DayState, LoadedState, RolloverOutcome};
pub use schema::{read_stored_state, StoredState, SCHEMA_VERSION};
pub use store::{
    KeyValueStore, StoreError, DARK_MODE_KEY, HISTORY_KEY, LAST_CLEAR_DATE_KEY,
    LEGACY_HISTORY_KEY, SCHEMA_VERSION_KEY, TODOS_KEY,
};
