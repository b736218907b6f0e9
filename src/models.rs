use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Accept either a UUID or a legacy id such as a millisecond timestamp.
///
/// Legacy ids map to a name-based (v5) UUID so the same backup always
/// yields the same ids.
pub fn id_or_legacy<'de, D>(d: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(d)?;
    Ok(Uuid::parse_str(&raw)
        .unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes())))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    // high > medium > low
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "id_or_legacy")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
    pub completed_at: Option<DateTime<FixedOffset>>, // Some iff status == Completed
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Calendar day the task is due on, seen from `offset`.
    pub fn due_day(&self, offset: &FixedOffset) -> Option<NaiveDate> {
        self.due_date.map(|d| d.with_timezone(offset).date_naive())
    }

    /// Change status while keeping `completed_at` in step with it.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<FixedOffset>) {
        match (self.status, status) {
            (TaskStatus::Completed, TaskStatus::Completed) => {}
            (_, TaskStatus::Completed) => self.completed_at = Some(now),
            _ => self.completed_at = None,
        }
        self.status = status;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    #[serde(deserialize_with = "id_or_legacy")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub frequency: Frequency, // informational; streaks are always daily
    #[serde(default)]
    pub completed_dates: BTreeSet<NaiveDate>, // "YYYY-MM-DD" on the wire
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    pub created_at: DateTime<FixedOffset>,
}

impl Habit {
    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.completed_dates.contains(&day)
    }
}

// Habit annotated with completion for one day
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDay {
    #[serde(flatten)]
    pub habit: Habit,
    pub is_completed: bool,
}

// Everything the planner owns; this is what lands in db.json
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Db {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub habits: Vec<Habit>,
}
