use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;

/// chrono pattern for day labels, e.g. "January 5, 2025"
pub const LABEL_FORMAT: &str = "%B %-d, %Y";

/// Canonical day label used as the rollover marker and as history keys
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateLabel(String);

impl DateLabel {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(LABEL_FORMAT).to_string())
    }

    /// Wrap a stored label without validating it
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self(label.into())
    }

    /// Parse the label back into the calendar date it names
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.0.trim(), LABEL_FORMAT).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Ordering for history display: most recent day first.
    /// Labels that don't parse go last, in descending text order.
    pub fn cmp_recent_first(&self, other: &Self) -> Ordering {
        match (self.date(), other.date()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => other.0.cmp(&self.0),
        }
    }
}

impl fmt::Display for DateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DateLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Source of wall-clock time
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> DateLabel {
        DateLabel::from_date(self.now().date_naive())
    }
}

/// Clock backed by the process's local time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock pinned to a settable instant
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self { now: Cell::new(now) }
    }

    /// Clock at the given local date and time. Falls back to the current time
    /// when the wall time doesn't exist in the local zone (DST gap).
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let now = Local
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .earliest()
            .unwrap_or_else(Local::now);
        Self::new(now)
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}
