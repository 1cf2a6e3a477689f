use crate::error::AppError;
use crate::model::Task;
use crate::notify::{Notifier, notification_body, notification_summary};
use notify_rust::{Notification, Urgency};

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        let urgency = if task.is_important {
            Urgency::Critical
        } else {
            Urgency::Normal
        };

        Notification::new()
            .appname("taskboard")
            .summary(&notification_summary(task))
            .body(&notification_body(task))
            .urgency(urgency)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        Ok(())
    }
}
