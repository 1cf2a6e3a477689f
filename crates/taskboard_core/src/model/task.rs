use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub is_important: bool,
    pub priority: Priority,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    /// Ordering weight used by the notification feed: high=3, medium=2, low=1.
    pub fn weight(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(AppError::invalid_input(format!(
                "unknown priority '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

/// Input to [`crate::store::TaskStore::create`]: a task without `id` and
/// `created_at`, both of which the store assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub is_important: bool,
    pub priority: Priority,
    pub due_date: Option<OffsetDateTime>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            completed: false,
            is_important: false,
            priority: Priority::default(),
            due_date: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn important(mut self, is_important: bool) -> Self {
        self.is_important = is_important;
        self
    }

    pub fn due(mut self, due_date: Option<OffsetDateTime>) -> Self {
        self.due_date = due_date;
        self
    }

    pub(crate) fn into_task(self, id: String, created_at: OffsetDateTime) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            completed: self.completed,
            created_at,
            is_important: self.is_important,
            priority: self.priority,
            due_date: self.due_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NewTask, Priority, Task};
    use time::macros::datetime;

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!(" HIGH ".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("Medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
    }

    #[test]
    fn priority_rejects_unknown_values() {
        let err = "urgent".parse::<Priority>().unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn priority_weights_are_ordered() {
        assert!(Priority::High.weight() > Priority::Medium.weight());
        assert!(Priority::Medium.weight() > Priority::Low.weight());
    }

    #[test]
    fn new_task_defaults() {
        let input = NewTask::new("Buy milk", "2%");

        assert!(!input.completed);
        assert!(!input.is_important);
        assert_eq!(input.priority, Priority::Low);
        assert_eq!(input.due_date, None);
    }

    #[test]
    fn task_serializes_timestamps_as_rfc3339() {
        let task = Task {
            id: "task-1".to_string(),
            title: "demo".to_string(),
            description: String::new(),
            completed: false,
            created_at: datetime!(2025-12-20 00:00:00 UTC),
            is_important: true,
            priority: Priority::High,
            due_date: None,
        };

        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["created_at"], "2025-12-20T00:00:00Z");
        assert_eq!(value["priority"], "high");
        assert!(value["due_date"].is_null());
    }
}
