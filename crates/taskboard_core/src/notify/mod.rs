use crate::error::AppError;
use crate::model::Task;
use crate::views::{NotificationFilter, due_day, notification_feed};
use tracing::{debug, warn};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

const DISABLE_ENV_VAR: &str = "TASKBOARD_DISABLE_NOTIFICATIONS";

pub trait Notifier {
    fn notify(&self, task: &Task) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _task: &Task) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NotificationOutcome {
    pub tasks: Vec<Task>,
    pub failures: Vec<NotificationFailure>,
}

#[derive(Debug)]
pub struct NotificationFailure {
    pub task_id: String,
    pub error: AppError,
}

pub fn notifier_from_env() -> Result<Box<dyn Notifier>, AppError> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Ok(Box::new(NoopNotifier));
    }

    match platform_notifier() {
        Ok(notifier) => Ok(notifier),
        Err(err) => match err {
            AppError::InvalidData(_) => Ok(Box::new(NoopNotifier)),
            other => Err(other),
        },
    }
}

/// Pushes every entry of the notification feed to `notifier`, in feed order.
/// A failed delivery is recorded and does not stop the rest.
pub fn deliver_notifications(
    tasks: &[Task],
    filter: &NotificationFilter,
    notifier: &dyn Notifier,
) -> NotificationOutcome {
    let mut outcome = NotificationOutcome::default();

    for task in notification_feed(tasks, filter) {
        match notifier.notify(&task) {
            Ok(()) => {
                debug!("notified task {}", task.id);
                outcome.tasks.push(task);
            }
            Err(error) => {
                warn!("notification for task {} failed: {}", task.id, error);
                outcome.failures.push(NotificationFailure {
                    task_id: task.id,
                    error,
                });
            }
        }
    }

    outcome
}

pub(crate) fn notification_summary(task: &Task) -> String {
    let star = if task.is_important { "★ " } else { "" };
    format!("{star}{} ({} priority)", task.title, task.priority)
}

pub(crate) fn notification_body(task: &Task) -> String {
    match due_day(task) {
        Some(due) => format!("{}\nDue {due}", task.description),
        None => task.description.clone(),
    }
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::{Notifier, deliver_notifications, notification_body, notification_summary};
    use crate::error::AppError;
    use crate::model::{Priority, Task};
    use crate::views::NotificationFilter;
    use std::cell::RefCell;
    use time::macros::datetime;

    struct RecordingNotifier {
        seen: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, task: &Task) -> Result<(), AppError> {
            if self.fail_on == Some(task.id.as_str()) {
                return Err(AppError::io("dbus unavailable"));
            }
            self.seen.borrow_mut().push(task.id.clone());
            Ok(())
        }
    }

    fn task(id: &str, priority: Priority, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            title: format!("title {id}"),
            description: "details".to_string(),
            completed,
            created_at: datetime!(2025-12-01 00:00 UTC),
            is_important: false,
            priority,
            due_date: None,
        }
    }

    #[test]
    fn deliver_sends_feed_in_order_and_skips_completed() {
        let notifier = RecordingNotifier {
            seen: RefCell::new(Vec::new()),
            fail_on: None,
        };
        let tasks = vec![
            task("low", Priority::Low, false),
            task("done", Priority::High, true),
            task("high", Priority::High, false),
        ];

        let outcome = deliver_notifications(&tasks, &NotificationFilter::default(), &notifier);

        assert_eq!(*notifier.seen.borrow(), ["high", "low"]);
        assert_eq!(outcome.tasks.len(), 2);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn deliver_records_failures_and_continues() {
        let notifier = RecordingNotifier {
            seen: RefCell::new(Vec::new()),
            fail_on: Some("high"),
        };
        let tasks = vec![
            task("high", Priority::High, false),
            task("medium", Priority::Medium, false),
        ];

        let outcome = deliver_notifications(&tasks, &NotificationFilter::default(), &notifier);

        assert_eq!(*notifier.seen.borrow(), ["medium"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].task_id, "high");
        assert_eq!(outcome.failures[0].error.code(), "io_error");
    }

    #[test]
    fn summary_and_body_describe_task() {
        let mut starred = task("t", Priority::Medium, false);
        starred.is_important = true;
        starred.due_date = Some(datetime!(2025-12-24 09:00 UTC));

        assert_eq!(notification_summary(&starred), "★ title t (medium priority)");
        assert_eq!(notification_body(&starred), "details\nDue 2025-12-24");
    }

    #[test]
    fn body_reports_due_day_in_utc() {
        let mut evening = task("t", Priority::Low, false);
        evening.due_date = Some(datetime!(2025-12-24 23:30 -05:00));

        assert_eq!(notification_body(&evening), "details\nDue 2025-12-25");
    }
}
