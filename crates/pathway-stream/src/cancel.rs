//! Cooperative cancellation handle for an in-flight stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Cloneable handle; every clone observes the same cancellation.
///
/// `is_cancelled` is a cheap poll, `cancelled` resolves once `cancel` has
/// been called from any clone (immediately if it already was).
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    pub fn new() -> Self { Self::default() }

    pub fn is_cancelled(&self) -> bool { self.inner.cancelled.load(Ordering::Acquire) }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            let mut notified = std::pin::pin!(notified);
            // Register before the flag check so a concurrent cancel is not missed.
            notified.as_mut().enable();
            if self.is_cancelled() { return; }
            notified.await;
        }
    }
}
