use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Server-wide counters
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    connections_opened: AtomicU64,
    active_connections: AtomicU64,
    hands_started: AtomicU64,
    hands_completed: AtomicU64,
    actions_accepted: AtomicU64,
    actions_rejected: AtomicU64,
    events_sent: AtomicU64,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub fn record_connection_opened(&self) {
        self.inner.connections_opened.fetch_add(1, Ordering::Relaxed);
        let count = self.inner.active_connections.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(active_connections = count, "connection count increased");
    }

    pub fn record_connection_closed(&self) {
        let mut current = self.inner.active_connections.load(Ordering::Relaxed);
        loop {
            if current == 0 {
                tracing::warn!("attempted to decrement active_connections below zero");
                return;
            }

            match self.inner.active_connections.compare_exchange(
                current,
                current - 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    tracing::debug!(
                        active_connections = current - 1,
                        "connection count decreased"
                    );
                    return;
                }
                Err(actual) => current = actual,
            }
        }
    }

    pub fn record_hand_started(&self) {
        self.inner.hands_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hand_completed(&self) {
        self.inner.hands_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_action(&self, accepted: bool) {
        let counter = if accepted {
            &self.inner.actions_accepted
        } else {
            &self.inner.actions_rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_sent(&self) {
        self.inner.events_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.inner.connections_opened.load(Ordering::Relaxed),
            active_connections: self.inner.active_connections.load(Ordering::Relaxed),
            hands_started: self.inner.hands_started.load(Ordering::Relaxed),
            hands_completed: self.inner.hands_completed.load(Ordering::Relaxed),
            actions_accepted: self.inner.actions_accepted.load(Ordering::Relaxed),
            actions_rejected: self.inner.actions_rejected.load(Ordering::Relaxed),
            events_sent: self.inner.events_sent.load(Ordering::Relaxed),
        }
    }

    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        tracing::info!(
            active_connections = snapshot.active_connections,
            hands_started = snapshot.hands_started,
            hands_completed = snapshot.hands_completed,
            actions_accepted = snapshot.actions_accepted,
            actions_rejected = snapshot.actions_rejected,
            events_sent = snapshot.events_sent,
            "server metrics"
        );
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub connections_opened: u64,
    pub active_connections: u64,
    pub hands_started: u64,
    pub hands_completed: u64,
    pub actions_accepted: u64,
    pub actions_rejected: u64,
    pub events_sent: u64,
}

impl MetricsSnapshot {
    /// Share of submitted actions that were rejected, in [0, 1].
    pub fn rejection_rate(&self) -> f64 {
        let total = self.actions_accepted + self.actions_rejected;
        if total == 0 {
            0.0
        } else {
            self.actions_rejected as f64 / total as f64
        }
    }
}
