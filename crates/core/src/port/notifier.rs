// Notification Channel Port
// Write-only from the core's point of view: publishing never blocks and never fails

use tokio::sync::mpsc;
use tracing::debug;

/// Outbound user-facing message (rendered as a dismissible toast by the UI)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

/// Fire-and-forget publisher
pub trait Notifier: Send + Sync {
    fn publish(&self, message: &str);
}

/// Notifier backed by a bounded queue
///
/// When the queue is full or the consumer is gone, the message is dropped.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notification>,
}

impl Notifier for ChannelNotifier {
    fn publish(&self, message: &str) {
        let notification = Notification {
            message: message.to_string(),
        };
        if let Err(e) = self.tx.try_send(notification) {
            debug!(error = %e, "Notification dropped");
        }
    }
}

/// Create a notifier and the receiving end the UI layer drains
pub fn notification_channel(capacity: usize) -> (ChannelNotifier, mpsc::Receiver<Notification>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ChannelNotifier { tx }, rx)
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Notifier that keeps every published message
    #[derive(Default)]
    pub struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn publish(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let (notifier, mut rx) = notification_channel(4);
        notifier.publish("HTTP 502: bad gateway");

        let received = rx.recv().await.unwrap();
        assert_eq!(received.message, "HTTP 502: bad gateway");
    }

    #[test]
    fn test_channel_notifier_drops_when_full() {
        let (notifier, mut rx) = notification_channel(1);
        notifier.publish("first");
        notifier.publish("second");

        assert_eq!(rx.try_recv().unwrap().message, "first");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_notifier_survives_closed_receiver() {
        let (notifier, rx) = notification_channel(1);
        drop(rx);
        notifier.publish("nobody listens");
    }
}
