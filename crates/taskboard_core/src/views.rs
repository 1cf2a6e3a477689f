//! Orderings and filters computed from a task snapshot.
//!
//! Every function here takes a borrowed slice and returns a new vector; the
//! store's own sequence keeps insertion order.

use crate::error::AppError;
use crate::model::{Priority, Task};
use feruca::Collator;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;
use time::{Date, Month, UtcOffset};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Newest first.
    #[default]
    CreatedAt,
    /// Ascending, Unicode collation order.
    Title,
    /// Completed tasks first.
    Completed,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "date" | "created" | "created_at" | "createdat" => Ok(Self::CreatedAt),
            "title" => Ok(Self::Title),
            "completed" | "completion" | "status" => Ok(Self::Completed),
            other => Err(AppError::invalid_input(format!(
                "unknown sort key '{other}' (expected date, title or completed)"
            ))),
        }
    }
}

pub fn sort_tasks(tasks: &[Task], key: SortKey) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    match key {
        SortKey::CreatedAt => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Title => {
            let mut collator = Collator::default();
            sorted.sort_by(|a, b| collator.collate(a.title.as_str(), b.title.as_str()));
        }
        SortKey::Completed => sorted.sort_by(|a, b| b.completed.cmp(&a.completed)),
    }
    sorted
}

/// Compares titles with the CLDR root collation: accents and case only break
/// ties between otherwise equal letters, and lowercase sorts before uppercase.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    Collator::default().collate(a, b)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationFilter {
    pub priority: Option<Priority>,
    pub important_only: bool,
}

/// Pending tasks ordered for the notification panel: priority descending,
/// important first, then newest first.
pub fn notification_feed(tasks: &[Task], filter: &NotificationFilter) -> Vec<Task> {
    let mut feed: Vec<Task> = tasks
        .iter()
        .filter(|task| !task.completed)
        .filter(|task| filter.priority.is_none_or(|priority| task.priority == priority))
        .filter(|task| !filter.important_only || task.is_important)
        .cloned()
        .collect();

    feed.sort_by(|a, b| {
        b.priority
            .weight()
            .cmp(&a.priority.weight())
            .then_with(|| b.is_important.cmp(&a.is_important))
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    feed
}

/// UTC date of the due date, if any.
pub fn due_day(task: &Task) -> Option<Date> {
    task.due_date.map(|due| due.to_offset(UtcOffset::UTC).date())
}

/// The day a task shows up on in the calendar: its due date when set,
/// otherwise its creation date, both taken in UTC.
pub fn calendar_day(task: &Task) -> Date {
    due_day(task).unwrap_or_else(|| task.created_at.to_offset(UtcOffset::UTC).date())
}

pub fn tasks_on(tasks: &[Task], day: Date) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| calendar_day(task) == day)
        .cloned()
        .collect()
}

pub fn calendar_month(tasks: &[Task], year: i32, month: Month) -> BTreeMap<Date, Vec<Task>> {
    let mut grouped: BTreeMap<Date, Vec<Task>> = BTreeMap::new();
    for task in tasks {
        let day = calendar_day(task);
        if day.year() == year && day.month() == month {
            grouped.entry(day).or_default().push(task.clone());
        }
    }
    grouped
}
