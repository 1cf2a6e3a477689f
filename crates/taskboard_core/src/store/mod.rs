//! In-memory task store.
//!
//! The store owns the task sequence. Consumers get clones; every mutation
//! builds a new [`Task`] value and swaps it into the sequence.

mod ids;
mod refresh;
mod source;

pub use ids::{Clock, IdGenerator, RandomIds, SequentialIds, SystemClock};
pub use refresh::RefreshHandle;
pub use source::{EmptySource, StaticSource, TaskSource};

use crate::model::{NewTask, Priority, Task};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::task::AbortHandle;
use tracing::debug;

pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(1000);

/// Point-in-time copy of the store state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct StoreState {
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
    pending: HashMap<u64, AbortHandle>,
    next_ticket: u64,
}

struct Inner {
    state: Mutex<StoreState>,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
    source: Box<dyn TaskSource>,
    refresh_delay: Duration,
}

/// Shared handle to one task store. Clones refer to the same state.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Inner>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("TaskStore")
            .field("tasks", &state.tasks.len())
            .field("loading", &state.loading)
            .field("error", &state.error)
            .field("pending_refreshes", &state.pending.len())
            .finish()
    }
}

pub struct TaskStoreBuilder {
    tasks: Vec<Task>,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
    source: Box<dyn TaskSource>,
    refresh_delay: Duration,
}

impl Default for TaskStoreBuilder {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            ids: Box::new(RandomIds),
            clock: Box::new(SystemClock),
            source: Box::new(EmptySource),
            refresh_delay: DEFAULT_REFRESH_DELAY,
        }
    }
}

impl TaskStoreBuilder {
    pub fn tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn source(mut self, source: impl TaskSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    pub fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn build(self) -> TaskStore {
        TaskStore {
            inner: Arc::new(Inner {
                state: Mutex::new(StoreState {
                    tasks: self.tasks,
                    ..StoreState::default()
                }),
                ids: self.ids,
                clock: self.clock,
                source: self.source,
                refresh_delay: self.refresh_delay,
            }),
        }
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TaskStoreBuilder {
        TaskStoreBuilder::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a new task with a fresh id and the current timestamp.
    pub fn create(&self, input: NewTask) -> Task {
        let created_at = self.inner.clock.now();
        let mut state = self.lock();
        let id = loop {
            let candidate = self.inner.ids.next_id();
            if !state.tasks.iter().any(|task| task.id == candidate) {
                break candidate;
            }
        };

        let task = input.into_task(id, created_at);
        state.tasks.push(task.clone());
        debug!("created task {} ({} total)", task.id, state.tasks.len());
        task
    }

    /// Removes the task with `id`. Absent ids are a no-op.
    pub fn delete(&self, id: &str) -> Option<Task> {
        let mut state = self.lock();
        let index = state.tasks.iter().position(|task| task.id == id)?;
        let removed = state.tasks.remove(index);
        debug!("deleted task {}", removed.id);
        Some(removed)
    }

    pub fn toggle_completed(&self, id: &str) -> Option<Task> {
        self.replace(id, "toggle_completed", |task| Task {
            completed: !task.completed,
            ..task.clone()
        })
    }

    pub fn toggle_important(&self, id: &str) -> Option<Task> {
        self.replace(id, "toggle_important", |task| Task {
            is_important: !task.is_important,
            ..task.clone()
        })
    }

    pub fn set_priority(&self, id: &str, priority: Priority) -> Option<Task> {
        self.replace(id, "set_priority", |task| Task {
            priority,
            ..task.clone()
        })
    }

    pub fn update_due_date(&self, id: &str, due_date: Option<OffsetDateTime>) -> Option<Task> {
        self.replace(id, "update_due_date", |task| Task {
            due_date,
            ..task.clone()
        })
    }

    /// Removes every completed task and returns them in their prior order.
    pub fn archive_completed(&self) -> Vec<Task> {
        let mut state = self.lock();
        let (archived, kept): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut state.tasks).into_iter().partition(|task| task.completed);
        state.tasks = kept;
        debug!("archived {} completed tasks", archived.len());
        archived
    }

    fn replace<F>(&self, id: &str, operation: &str, build: F) -> Option<Task>
    where
        F: FnOnce(&Task) -> Task,
    {
        let mut state = self.lock();
        let slot = state.tasks.iter_mut().find(|task| task.id == id)?;
        let updated = build(slot);
        *slot = updated.clone();
        debug!("{} applied to task {}", operation, id);
        Some(updated)
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.lock().tasks.iter().find(|task| task.id == id).cloned()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().tasks.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.lock();
        StoreSnapshot {
            tasks: state.tasks.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }
}
