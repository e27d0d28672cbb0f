//! Signal bus carrying requests from the game out to the surrounding shell.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Signals the game sends to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellSignal {
    /// Swap the game view for the portfolio view
    ViewPortfolio,
}

/// Broadcasts [`ShellSignal`]s to every subscriber.
///
/// Each subscriber gets its own bounded channel, so one slow reader cannot
/// steal signals from another.
#[derive(Debug)]
pub struct SignalBus {
    subscribers: Vec<Sender<ShellSignal>>,
    capacity: usize,
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new(16)
    }
}

impl SignalBus {
    /// Creates a bus whose subscriber channels hold `capacity` signals.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Adds a subscriber.
    pub fn subscribe(&mut self) -> Receiver<ShellSignal> {
        let (sender, receiver) = bounded(self.capacity);
        self.subscribers.push(sender);
        receiver
    }

    /// Sends a signal to every live subscriber. Dropped receivers are
    /// forgotten; a full channel drops the signal for that subscriber.
    pub fn publish(&mut self, signal: ShellSignal) {
        info!(?signal, subscribers = self.subscribers.len(), "Shell signal");
        self.subscribers
            .retain(|sender| match sender.try_send(signal) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(?signal, "Subscriber channel full, signal dropped");
                    true
                },
                Err(TrySendError::Disconnected(_)) => false,
            });
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
