//! Transient notification queue
//!
//! Views push success/error notices here instead of printing them; whatever
//! renders the dashboard drains the queue. Entries expire after a fixed TTL.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeKind {
    /// An action went through
    Success,
    /// An action failed
    Error,
    /// Neutral information
    Info,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "ok",
            Self::Error => "error",
            Self::Info => "info",
        })
    }
}

/// One queued notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Queue-unique id
    pub id: u64,
    /// Severity
    pub kind: NoticeKind,
    /// Text shown to the admin
    pub message: String,
    /// When the notice stops being shown
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
struct Queue {
    next_id: u64,
    notices: VecDeque<Notice>,
}

/// Shared notification queue; clones push into the same queue
#[derive(Debug, Clone)]
pub struct Notifications {
    queue: Arc<Mutex<Queue>>,
    ttl: Duration,
}

impl Notifications {
    /// Empty queue whose notices live for `ttl`
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: Arc::new(Mutex::new(Queue::default())),
            ttl,
        }
    }

    /// Queue a notice; returns its id
    pub fn push(&self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        let message = message.into();
        let mut queue = self.queue.lock();
        queue.next_id += 1;
        let id = queue.next_id;
        tracing::debug!(id, %kind, %message, "notice queued");
        queue.notices.push_back(Notice {
            id,
            kind,
            message,
            expires_at: Instant::now() + self.ttl,
        });
        id
    }

    /// Queue a success notice
    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeKind::Success, message)
    }

    /// Queue an error notice
    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeKind::Error, message)
    }

    /// Queue an informational notice
    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeKind::Info, message)
    }

    /// Drop every notice that expired at or before `now`; returns how many went
    pub fn expire(&self, now: Instant) -> usize {
        let mut queue = self.queue.lock();
        let before = queue.notices.len();
        queue.notices.retain(|notice| notice.expires_at > now);
        before - queue.notices.len()
    }

    /// Remove one notice early
    pub fn dismiss(&self, id: u64) -> bool {
        let mut queue = self.queue.lock();
        let before = queue.notices.len();
        queue.notices.retain(|notice| notice.id != id);
        before != queue.notices.len()
    }

    /// Notices still live at `now`, oldest first
    #[must_use]
    pub fn active(&self, now: Instant) -> Vec<Notice> {
        self.queue
            .lock()
            .notices
            .iter()
            .filter(|notice| notice.expires_at > now)
            .cloned()
            .collect()
    }

    /// Take every live notice out of the queue, oldest first
    pub fn drain(&self) -> Vec<Notice> {
        let now = Instant::now();
        let mut queue = self.queue.lock();
        queue
            .notices
            .drain(..)
            .filter(|notice| notice.expires_at > now)
            .collect()
    }

    /// Number of queued notices, expired or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().notices.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().notices.is_empty()
    }

    /// Most recent notice, if any
    #[must_use]
    pub fn last(&self) -> Option<Notice> {
        self.queue.lock().notices.back().cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn test_notices_expire_after_ttl() {
        let notifications = Notifications::new(Duration::from_secs(3));
        notifications.success("Product deleted successfully!");
        tokio::time::advance(Duration::from_secs(1)).await;
        notifications.error("Failed to delete product");

        tokio::time::advance(Duration::from_millis(2500)).await;
        let live = notifications.active(Instant::now());
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].kind, NoticeKind::Error);

        assert_eq!(notifications.expire(Instant::now()), 1);
        assert_eq!(notifications.len(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(notifications.drain().is_empty());
        assert!(notifications.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_and_dismiss() {
        let notifications = Notifications::new(Duration::from_secs(3));
        let first = notifications.info("Loading");
        let second = notifications.success("Coupon created successfully!");
        assert_ne!(first, second);

        assert!(notifications.dismiss(first));
        assert!(!notifications.dismiss(first));

        let drained = notifications.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].message, "Coupon created successfully!");
        assert!(notifications.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_the_queue() {
        let notifications = Notifications::new(Duration::from_secs(3));
        let view_handle = notifications.clone();
        view_handle.error("Failed to fetch orders");
        assert_eq!(notifications.last().unwrap().message, "Failed to fetch orders");
    }
}
