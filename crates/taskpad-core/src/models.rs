//! Data models for Taskpad
//!
//! Defines the core data structures: Task, TaskId, and TaskStats.
//! These mirror the wire format of the remote task server.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned task identifier
///
/// Opaque to the client. The server may hand out integers or strings;
/// whichever shape it used is kept so the id round-trips unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum TaskId {
    /// Numeric id (e.g. an auto-increment primary key)
    Int(i64),
    /// Any other textual id
    Str(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Int(id) => write!(f, "{}", id),
            TaskId::Str(id) => f.write_str(id),
        }
    }
}

impl FromStr for TaskId {
    type Err = std::convert::Infallible;

    /// Parse user input: all-digit text becomes a numeric id
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<i64>() {
            Ok(id) => TaskId::Int(id),
            Err(_) => TaskId::Str(s.to_string()),
        })
    }
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        TaskId::Int(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        TaskId::Str(id.to_string())
    }
}

/// A single to-do item as stored by the task server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier (server-assigned)
    pub id: TaskId,
    /// Task title
    pub title: String,
    /// Completion flag
    pub is_done: bool,
    /// When this task was created
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    /// When the completion flag last changed
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the task has been modified since creation
    pub fn was_modified(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// ISO-8601 timestamps as the server sends them
///
/// Servers without time zone support send no offset; those are read as UTC.
mod timestamp {
    use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = raw.parse::<DateTime<FixedOffset>>() {
            return Some(dt.with_timezone(&Utc));
        }

        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}

/// Counts shown alongside the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    /// Tally a sequence of tasks
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            if task.is_done {
                stats.completed += 1;
            } else {
                stats.pending += 1;
            }
            stats
        })
    }
}

/// Request body for `POST /tasks/`
#[derive(Debug, Serialize)]
pub(crate) struct NewTask<'a> {
    pub title: &'a str,
}

/// Request body for `PATCH /tasks/{id}/`
#[derive(Debug, Serialize)]
pub(crate) struct TaskPatch {
    pub is_done: bool,
}
