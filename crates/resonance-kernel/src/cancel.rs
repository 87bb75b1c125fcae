//! Cooperative cancellation
//!
//! Set from any thread; observed by the executor before connecting and by
//! every pause, so a workflow parked in a settle delay or a poll loop stops
//! at its next suspension point.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Cloneable cancellation flag
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Clear the flag so the next workflow can run
    pub fn reset(&self) {
        self.tx.send_replace(false);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            let set = *rx.borrow_and_update();
            if set {
                return;
            }
            if rx.changed().await.is_err() {
                // sender lives in self; unreachable in practice
                std::future::pending::<()>().await;
            }
        }
    }

    /// Sleep for `duration`; returns `false` if cancelled first
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        tokio::select! {
            () = tokio::time::sleep(duration) => true,
            () = self.cancelled() => false,
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_when_not_cancelled() {
        let signal = CancelSignal::new();
        assert!(signal.sleep(Duration::from_secs(5)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_sleep() {
        let signal = CancelSignal::new();
        let remote = signal.clone();
        let sleeper = tokio::spawn(async move { signal.sleep(Duration::from_secs(300)).await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        remote.cancel();
        assert!(!sleeper.await.unwrap());
    }

    #[tokio::test]
    async fn test_sleep_after_cancel_returns_immediately() {
        let signal = CancelSignal::new();
        signal.cancel();
        assert!(signal.is_cancelled());
        assert!(!signal.sleep(Duration::from_secs(3600)).await);

        signal.reset();
        assert!(!signal.is_cancelled());
    }
}
