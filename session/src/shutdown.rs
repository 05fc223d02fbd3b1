//! Service teardown signalling.
//!
//! Tearing down a verification screen must leave its service loop inert.
//! The embedding application triggers this controller on teardown and every
//! running loop observes it on its next `select!` pass; a headless run can
//! instead forward the first SIGINT or SIGTERM.

use tokio::signal;
use tokio::sync::broadcast;

/// Broadcasts one teardown signal to every running service loop.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        // Capacity one: the only message ever sent is the teardown itself.
        let (tx, _) = broadcast::channel(1);
        ShutdownController { tx }
    }

    /// Receiver for one service loop to `select!` on.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Tears down every subscribed loop. A send with no receivers means
    /// nothing was running, which is not an error.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }

    /// Forwards the first SIGINT or SIGTERM as a teardown.
    pub async fn wait_for_signal(&self) {
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(error) => {
                    tracing::warn!(%error, "SIGTERM handler unavailable");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = signal::ctrl_c() => tracing::info!("received SIGINT, tearing down"),
            _ = terminate => tracing::info!("received SIGTERM, tearing down"),
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn teardown_reaches_every_subscriber() {
        let controller = ShutdownController::new();
        let mut first = controller.subscribe();
        let mut second = controller.subscribe();
        controller.shutdown();
        assert!(first.recv().await.is_ok());
        assert!(second.recv().await.is_ok());
    }

    #[tokio::test]
    async fn subscribing_after_a_teardown_only_sees_later_ones() {
        let controller = ShutdownController::new();
        controller.shutdown();
        let mut rx = controller.subscribe();
        controller.shutdown();
        assert!(rx.recv().await.is_ok());
        assert!(rx.try_recv().is_err());
    }
}
