use crate::error::AppError;
use crate::model::Task;

/// Where a refresh gets its replacement task list from.
pub trait TaskSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<Task>, AppError>;
}

/// Placeholder source: every refresh resolves to an empty list.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySource;

impl TaskSource for EmptySource {
    fn fetch(&self) -> Result<Vec<Task>, AppError> {
        Ok(Vec::new())
    }
}

/// Always returns the same list.
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    tasks: Vec<Task>,
}

impl StaticSource {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl TaskSource for StaticSource {
    fn fetch(&self) -> Result<Vec<Task>, AppError> {
        Ok(self.tasks.clone())
    }
}

impl<T: TaskSource + ?Sized> TaskSource for std::sync::Arc<T> {
    fn fetch(&self) -> Result<Vec<Task>, AppError> {
        (**self).fetch()
    }
}
