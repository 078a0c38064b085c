use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque task identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Fresh time-ordered id
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// Older data used millisecond timestamps as numeric ids.
impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(u64),
            Float(f64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => TaskId(id),
            RawId::Int(id) => TaskId(id.to_string()),
            RawId::Float(id) => TaskId(id.to_string()),
        })
    }
}

/// A single task on the day's list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Local>>,
}

impl Task {
    /// Create a task from user input. Returns None when the text is blank.
    pub fn new(text: &str, now: DateTime<Local>) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            id: TaskId::generate(),
            text: text.to_string(),
            completed: false,
            created_at: now,
            completed_at: None,
        })
    }

    /// Flip completion, stamping or clearing `completed_at`
    pub fn toggle(&mut self, now: DateTime<Local>) {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
    }

    /// Repair records that break the completed/completed_at pairing.
    /// Returns true if anything changed.
    pub fn normalize(&mut self) -> bool {
        match (self.completed, self.completed_at) {
            (false, Some(_)) => {
                self.completed_at = None;
                true
            }
            (true, None) => {
                self.completed_at = Some(self.created_at);
                true
            }
            _ => false,
        }
    }
}
