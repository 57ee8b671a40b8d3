//! Record types for the `tasks` and `timersessions` collections.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Task priority as shown on the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// A planner task.
///
/// Only `completed` and `completed_at` matter to the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned key; `None` until the task is added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// A new, open task created at `created_at`.
    pub fn new(title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let title = title.into();
        Self {
            id: None,
            title: if title.trim().is_empty() {
                "Untitled Task".to_string()
            } else {
                title
            },
            description: String::new(),
            deadline: None,
            priority: Priority::default(),
            tags: Vec::new(),
            completed: false,
            completed_at: None,
            archived: false,
            created_at,
        }
    }

    /// Mark the task done, stamping the completion instant.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(at);
    }

    /// Mark the task pending again.
    pub fn reopen(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    /// The completion instant, if the task counts as completed.
    pub fn completion(&self) -> Option<DateTime<Utc>> {
        if self.completed {
            self.completed_at
        } else {
            None
        }
    }
}

/// Countdown category. Only `Work` sessions are ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Work,
    Break,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Work => "work",
            SessionKind::Break => "break",
        }
    }
}

/// A completed work countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub duration_min: u32,
    #[serde(default)]
    pub kind: SessionKind,
    /// Completion instant.
    pub date: DateTime<Utc>,
}

impl TimerSession {
    pub fn work(duration_min: u32, date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            duration_min,
            kind: SessionKind::Work,
            date,
        }
    }
}
