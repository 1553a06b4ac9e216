use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Default for Status {
    fn default() -> Self {
        Status::Todo
    }
}

impl Status {
    /// Stable external names, indexed by discriminant. The only source of
    /// status names for display, parsing and storage.
    pub const NAMES: [(Status, &'static str); 3] = [
        (Status::Todo, "todo"),
        (Status::InProgress, "in-progress"),
        (Status::Done, "done"),
    ];

    pub fn as_str(&self) -> &'static str {
        Status::NAMES[*self as usize].1
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(D::Error::custom)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status '{}' (expected todo, in-progress or done)", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(status, _)| *status)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// The persisted shape of a task. Identity lives only in the map key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub description: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: TaskId, description: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            description,
            status: Status::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_record(id: TaskId, record: TaskRecord) -> Self {
        Self {
            id,
            description: record.description,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    pub fn into_record(self) -> (TaskId, TaskRecord) {
        (
            self.id,
            TaskRecord {
                description: self.description,
                status: self.status,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        )
    }

    pub fn set_description(&mut self, description: String, now: DateTime<Utc>) {
        self.description = description;
        self.touch(now);
    }

    /// Transitions are unrestricted; any state may move to any other.
    pub fn set_status(&mut self, status: Status, now: DateTime<Utc>) {
        self.status = status;
        self.touch(now);
    }

    // Never moves backwards, even if the wall clock does.
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at).max(self.created_at);
    }
}
