// Cancellation Token
// One token per polling session / resolution, checked before every state commit

use tokio::sync::watch;

/// Read side of a cancellation flag
///
/// A token whose handle was dropped counts as cancelled.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Wait for cancellation
    pub async fn cancelled(&mut self) {
        if self.is_cancelled() {
            return;
        }
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Write side of a cancellation flag
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Flip the flag. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Create a fresh (handle, token) pair
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_token_starts_live() {
        let (_handle, token) = cancel_pair();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_seen_by_clones() {
        let (handle, token) = cancel_pair();
        let clone = token.clone();
        handle.cancel();
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_dropped_handle_cancels() {
        let (handle, token) = cancel_pair();
        drop(handle);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let (handle, mut token) = cancel_pair();
        let waiter = tokio::spawn(async move { token.cancelled().await });
        handle.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake up")
            .unwrap();
    }
}
