pub mod date;
pub mod history;
pub mod task;
pub mod task_list;
pub mod views;

pub use date::{Clock, DateLabel, ManualClock, SystemClock};
pub use history::HistoryArchive;
pub use task::{Task, TaskId};
pub use task_list::TaskList;
pub use views::{compute_summary, status_badge, Summary};
