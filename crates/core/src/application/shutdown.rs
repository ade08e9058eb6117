// Shutdown Token

use tokio::sync::watch;

/// Shutdown signal for graceful termination of the HTTP surface
///
/// The listener engine does not take one: it runs until the process exits.
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for shutdown signal
    ///
    /// Also returns if the sender was dropped.
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|requested| *requested).await;
    }

    /// Owned variant of [`ShutdownToken::wait`], for `'static` futures
    pub async fn cancelled(mut self) {
        self.wait().await
    }
}

/// Shutdown sender
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Signal shutdown to every token
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_token_observes_shutdown() {
        let (sender, token) = shutdown_channel();
        assert!(!token.is_shutdown());

        let waiter = tokio::spawn(token.clone().cancelled());
        sender.shutdown();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("token should wake")
            .unwrap();
        assert!(token.is_shutdown());
    }

    #[tokio::test]
    async fn test_late_token_sees_earlier_shutdown() {
        let (sender, mut token) = shutdown_channel();
        sender.shutdown();

        tokio::time::timeout(Duration::from_millis(100), token.wait())
            .await
            .expect("already shut down");
    }

    #[tokio::test]
    async fn test_dropped_sender_releases_waiters() {
        let (sender, token) = shutdown_channel();
        drop(sender);

        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("closed channel should not hang");
    }
}
