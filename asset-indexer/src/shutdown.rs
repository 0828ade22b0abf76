//! Cancellation signal shared by the driver loop and the stream processor.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::Instant;

/// Create a connected trigger and signal.
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (sender, receiver) = watch::channel(false);
    (
        ShutdownTrigger {
            sender: Arc::new(sender),
        },
        Shutdown {
            receiver,
            deadline: None,
        },
    )
}

/// Fires the [`Shutdown`] signal. Cloning shares the same signal.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }
}

/// Cancellation signal with an optional deadline.
///
/// Once triggered, or once the deadline passes, it stays triggered.
#[derive(Debug, Clone)]
pub struct Shutdown {
    receiver: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

impl Shutdown {
    /// Also treat the signal as triggered from `deadline` on.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves when the signal is triggered or the deadline passes.
    ///
    /// Never resolves if every trigger is dropped without firing and there is
    /// no deadline.
    pub async fn triggered(&self) {
        let mut receiver = self.receiver.clone();
        let signalled = async move {
            if receiver.wait_for(|triggered| *triggered).await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = signalled => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => signalled.await,
        }
    }
}
