use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

/// How long a toast stays visible
pub const TOAST_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
    pub raised_at: Instant,
}

/// Transient user-visible messages, oldest first
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        log::debug!("Toast ({:?}): {}", severity, message);
        self.toasts.push_back(Toast {
            message,
            severity,
            raised_at: Instant::now(),
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success);
    }

    /// Drop toasts older than [`TOAST_LIFETIME`]
    pub fn expire(&mut self, now: Instant) {
        self.toasts
            .retain(|t| now.saturating_duration_since(t.raised_at) < TOAST_LIFETIME);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_lifetime() {
        let mut queue = ToastQueue::default();
        queue.error("boom");
        queue.success("done");
        assert_eq!(queue.len(), 2);

        let raised = queue.iter().next().unwrap().raised_at;
        queue.expire(raised + Duration::from_secs(1));
        assert_eq!(queue.len(), 2);

        queue.expire(raised + TOAST_LIFETIME + Duration::from_millis(10));
        assert!(queue.is_empty());
    }

    #[test]
    fn keeps_arrival_order_and_severity() {
        let mut queue = ToastQueue::default();
        queue.push("first", Severity::Info);
        queue.error("second");
        let severities: Vec<_> = queue.iter().map(|t| t.severity).collect();
        assert_eq!(severities, vec![Severity::Info, Severity::Error]);
    }
}
