//! Daily task tracker: today's list, with finished work archived per day
//! when the calendar rolls over.

pub mod app;
pub mod domain;
pub mod input;
pub mod persistence;
pub mod report;
pub mod ui;

pub use app::AppState;
