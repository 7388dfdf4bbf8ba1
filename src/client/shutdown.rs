//! Cancellation signal for running clients.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::watch;

/// Create a linked trigger/listener pair.
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

/// Fires the shutdown signal. Dropping it fires it too.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Signal every linked [`Shutdown`].
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Get another listener for this trigger.
    pub fn subscribe(&self) -> Shutdown {
        Shutdown {
            rx: self.tx.subscribe(),
        }
    }
}

impl Drop for ShutdownTrigger {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

/// Listener side of the shutdown signal, observed at every suspension point.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// Check if shutdown has been signalled.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Wait until shutdown is signalled.
    pub async fn triggered(&mut self) {
        // A closed channel means the trigger is gone, which counts as shutdown.
        let _ = self.rx.wait_for(|stop| *stop).await;
    }

    /// Sleep for `duration` unless shutdown arrives first.
    ///
    /// Returns [`ControlFlow::Break`] if the sleep was cut short.
    pub async fn sleep(&mut self, duration: Duration) -> ControlFlow<()> {
        if self.is_triggered() {
            return ControlFlow::Break(());
        }
        tokio::select! {
            biased;
            _ = self.triggered() => ControlFlow::Break(()),
            _ = tokio::time::sleep(duration) => ControlFlow::Continue(()),
        }
    }
}
