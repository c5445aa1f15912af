//! One-shot timers keyed by session.
//!
//! At most one timer is pending per key. Scheduling replaces (and aborts) the
//! previous timer for that key, and [`Timers::cancel`] drops it entirely, so a
//! follow-up never fires for a session that has gone away.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;

#[derive(Debug, Clone, Default)]
pub struct Timers {
    inner: Arc<TimersInner>,
}

#[derive(Debug, Default)]
struct TimersInner {
    pending: Mutex<HashMap<String, (u64, AbortHandle)>>,
    next_id: AtomicU64,
}

impl TimersInner {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, (u64, AbortHandle)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes the entry only if it still belongs to timer `id`.
    fn take_if_current(&self, key: &str, id: u64) -> bool {
        let mut guard = self.lock();
        match guard.get(key) {
            Some((current, _)) if *current == id => {
                guard.remove(key);
                true
            }
            _ => false,
        }
    }
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `callback` after `delay` unless the key is rescheduled or cancelled first.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&self, key: impl Into<String>, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let key = key.into();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();

        // The lock is held across spawn so a zero-delay task cannot look itself up
        // before it has been registered.
        let mut guard = self.inner.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.take_if_current(&task_key, id) {
                callback();
            }
        });
        if let Some((_, previous)) = guard.insert(key.clone(), (id, handle.abort_handle())) {
            previous.abort();
            tracing::trace!(timer = %key, "replaced pending timer");
        }
    }

    /// Cancels the pending timer for `key`. Returns whether one was pending.
    pub fn cancel(&self, key: &str) -> bool {
        match self.inner.lock().remove(key) {
            Some((_, handle)) => {
                handle.abort();
                tracing::debug!(timer = %key, "cancelled pending timer");
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn cancel_all(&self) {
        let mut guard = self.inner.lock();
        for (_, (_, handle)) in guard.drain() {
            handle.abort();
        }
    }
}
