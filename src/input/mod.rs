pub mod command;
pub mod handler;

pub use command::{parse_command, Command};
pub use handler::handle_command;
