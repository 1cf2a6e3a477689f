use crate::error::AppError;
use crate::model::Task;
use crate::notify::{Notifier, notification_body, notification_summary};
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(&notification_summary(task))
            .text1(&notification_body(task))
            .text2(&task.id)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
