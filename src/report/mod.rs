pub mod generator;

pub use generator::{default_report_path, generate_report, render_report};
