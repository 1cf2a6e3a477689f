use super::TaskStore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One in-flight refresh.
///
/// Dropping the handle does not cancel the refresh.
#[derive(Debug)]
pub struct RefreshHandle {
    ticket: u64,
    store: TaskStore,
    task: JoinHandle<bool>,
}

impl RefreshHandle {
    /// Cancels this refresh if it has not applied yet. Returns whether it was
    /// still pending.
    pub fn cancel(&self) -> bool {
        self.store.cancel_ticket(self.ticket)
    }

    /// Waits for the refresh to settle. Returns `true` when it replaced the
    /// task list, `false` when it was cancelled or superseded.
    pub async fn wait(self) -> bool {
        matches!(self.task.await, Ok(true))
    }
}

impl TaskStore {
    /// Marks the store as loading and schedules a reload after the configured
    /// delay.
    ///
    /// Concurrent refreshes are not de-duplicated: each one applies when its
    /// delay elapses and the last to apply wins. Use [`RefreshHandle::cancel`],
    /// [`TaskStore::cancel_refresh`] or [`TaskStore::refresh_superseding`] to
    /// drop in-flight ones.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn refresh(&self) -> RefreshHandle {
        let mut state = self.lock();
        state.loading = true;
        state.next_ticket += 1;
        let ticket = state.next_ticket;

        let store = self.clone();
        let delay = self.inner.refresh_delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            store.apply_refresh(ticket)
        });
        state.pending.insert(ticket, task.abort_handle());
        debug!("refresh #{} scheduled in {:?}", ticket, delay);

        RefreshHandle {
            ticket,
            store: self.clone(),
            task,
        }
    }

    /// Cancels every in-flight refresh, then starts a new one.
    pub fn refresh_superseding(&self) -> RefreshHandle {
        let cancelled = self.cancel_refresh();
        if cancelled > 0 {
            info!("superseded {} in-flight refreshes", cancelled);
        }
        self.refresh()
    }

    /// Cancels every in-flight refresh and clears `loading`. Returns how many
    /// were cancelled.
    pub fn cancel_refresh(&self) -> usize {
        let mut state = self.lock();
        let cancelled = state.pending.len();
        for (_, abort) in state.pending.drain() {
            abort.abort();
        }
        if cancelled > 0 {
            state.loading = false;
            info!("cancelled {} in-flight refreshes", cancelled);
        }
        cancelled
    }

    pub fn pending_refreshes(&self) -> usize {
        self.lock().pending.len()
    }

    fn cancel_ticket(&self, ticket: u64) -> bool {
        let mut state = self.lock();
        let Some(abort) = state.pending.remove(&ticket) else {
            return false;
        };
        abort.abort();
        if state.pending.is_empty() {
            state.loading = false;
        }
        info!("refresh #{} cancelled", ticket);
        true
    }

    fn apply_refresh(&self, ticket: u64) -> bool {
        let fetched = self.inner.source.fetch();

        let mut state = self.lock();
        if state.pending.remove(&ticket).is_none() {
            debug!("refresh #{} dropped after cancellation", ticket);
            return false;
        }

        match fetched {
            Ok(tasks) => {
                info!("refresh #{} applied with {} tasks", ticket, tasks.len());
                state.tasks = tasks;
                state.error = None;
            }
            Err(err) => {
                warn!("refresh #{} failed: {}", ticket, err);
                state.error = Some(err.to_string());
            }
        }
        state.loading = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{NewTask, Priority, Task};
    use crate::store::{StaticSource, TaskSource, TaskStore};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use time::macros::datetime;

    fn remote_task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: "from source".to_string(),
            description: String::new(),
            completed: false,
            created_at: datetime!(2025-11-30 08:00:00 UTC),
            is_important: false,
            priority: Priority::Medium,
            due_date: None,
        }
    }

    fn seeded_store() -> TaskStore {
        let store = TaskStore::new();
        store.create(NewTask::new("one", ""));
        store.create(NewTask::new("two", ""));
        store
    }

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl TaskSource for CountingSource {
        fn fetch(&self) -> Result<Vec<Task>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct FailingSource;

    impl TaskSource for FailingSource {
        fn fetch(&self) -> Result<Vec<Task>, AppError> {
            Err(AppError::io("backend unreachable"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_sets_loading_then_clears_tasks_after_delay() {
        let store = seeded_store();

        let handle = store.refresh();
        assert!(store.is_loading());
        assert_eq!(store.len(), 2);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(store.is_loading());
        assert_eq!(store.len(), 2);

        assert!(handle.wait().await);
        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.tasks.is_empty());
        assert_eq!(snapshot.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_replaces_with_source_tasks() {
        let store = TaskStore::builder()
            .source(StaticSource::new(vec![remote_task("remote-1")]))
            .refresh_delay(Duration::from_millis(250))
            .build();
        store.create(NewTask::new("local", ""));

        assert!(store.refresh().wait().await);

        let tasks = store.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "remote-1");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_refreshes_both_apply() {
        let source = Arc::new(CountingSource::default());
        let store = TaskStore::builder().source(source.clone()).build();
        store.create(NewTask::new("one", ""));

        let first = store.refresh();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = store.refresh();
        assert_eq!(store.pending_refreshes(), 2);

        assert!(first.wait().await);
        assert!(!store.is_loading());
        assert!(second.wait().await);

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(!store.is_loading());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_refresh_leaves_tasks_untouched() {
        let store = seeded_store();

        let handle = store.refresh();
        assert!(handle.cancel());
        assert!(!store.is_loading());
        assert!(!handle.cancel());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.len(), 2);
        assert!(!handle.wait().await);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_one_of_two_keeps_loading() {
        let store = seeded_store();

        let first = store.refresh();
        let second = store.refresh();
        assert!(first.cancel());
        assert!(store.is_loading());

        assert!(second.wait().await);
        assert!(!store.is_loading());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn superseding_refresh_applies_once() {
        let source = Arc::new(CountingSource::default());
        let store = TaskStore::builder().source(source.clone()).build();

        let stale = store.refresh();
        let fresh = store.refresh_superseding();

        assert_eq!(store.pending_refreshes(), 1);
        assert!(store.is_loading());
        assert!(!stale.wait().await);
        assert!(fresh.wait().await);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_refresh_reports_count() {
        let store = seeded_store();
        let _a = store.refresh();
        let _b = store.refresh();

        assert_eq!(store.cancel_refresh(), 2);
        assert_eq!(store.cancel_refresh(), 0);
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn failing_source_sets_error_and_keeps_tasks() {
        let store = TaskStore::builder().source(FailingSource).build();
        store.create(NewTask::new("keep me", ""));

        assert!(store.refresh().wait().await);

        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("io_error - backend unreachable")
        );
    }
}
