//! Shutdown coordination for the launcher.

use std::fmt;
use std::time::SystemTime;

use tokio::sync::broadcast;

/// A received termination request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownSignal {
    /// Conventional signal name, e.g. `SIGINT`.
    pub name: String,
    pub received_at: SystemTime,
}

impl ShutdownSignal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            received_at: SystemTime::now(),
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Coordinator for graceful shutdown.
///
/// Signal listeners publish one [`ShutdownSignal`] per received signal; the
/// supervisor subscribes and runs one shutdown sequence for each. Cloning
/// yields another handle to the same channel.
#[derive(Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<ShutdownSignal>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe to shutdown signals published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownSignal> {
        self.tx.subscribe()
    }

    /// Publish a shutdown signal.
    ///
    /// Returns false when nobody is listening.
    pub fn trigger(&self, signal: ShutdownSignal) -> bool {
        self.tx.send(signal).is_ok()
    }

    /// Get the number of active subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 1);

        assert!(shutdown.trigger(ShutdownSignal::new("SIGTERM")));
        assert_eq!(rx.recv().await.unwrap().name, "SIGTERM");
    }

    #[test]
    fn test_trigger_without_subscribers() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.trigger(ShutdownSignal::new("SIGINT")));
    }

    #[tokio::test]
    async fn test_clones_share_channel() {
        let shutdown = Shutdown::new();
        let handle = shutdown.clone();
        let mut rx = shutdown.subscribe();

        handle.trigger(ShutdownSignal::new("SIGINT"));
        assert_eq!(rx.recv().await.unwrap().to_string(), "SIGINT");
    }
}
