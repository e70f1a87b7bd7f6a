//! Latest-wins control input for the generator.
//!
//! The control value is a pacing delay in nanoseconds. Only the most recent
//! value matters, so the channel is a [`watch`] rather than a queue: a burst
//! of updates collapses to the last one, and the generator never has to
//! catch up on history.

use crate::{Error, Result};
use core::time::Duration;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// Delay between produced values, in nanoseconds. Non-positive means no
/// delay.
pub type ControlValue = i64;

/// Receiving half handed to the generator.
pub type ControlReceiver = watch::Receiver<ControlValue>;

/// Creates a control channel seeded with `initial`.
pub fn control_channel(initial: ControlValue) -> (ControlInput, ControlReceiver) {
    let (tx, rx) = watch::channel(initial);
    (
        ControlInput {
            tx: Arc::new(Mutex::new(Some(tx))),
        },
        rx,
    )
}

/// Converts a control value into the pause the generator takes after each
/// value, or `None` when it should run flat out.
pub fn pacing_delay(value: ControlValue) -> Option<Duration> {
    u64::try_from(value)
        .ok()
        .filter(|nanos| *nanos > 0)
        .map(Duration::from_nanos)
}

/// Sending side of the control channel.
///
/// Clones share the same underlying sender, so closing through any clone
/// closes the input for all of them.
#[derive(Clone, Debug)]
pub struct ControlInput {
    tx: Arc<Mutex<Option<watch::Sender<ControlValue>>>>,
}

impl ControlInput {
    /// Publishes a new control value, replacing any value the generator has
    /// not picked up yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ControlClosed`] if the input was closed or the
    /// generator has already stopped.
    pub fn set(&self, value: ControlValue) -> Result<()> {
        let guard = self.tx.lock();
        let tx = guard.as_ref().ok_or(Error::ControlClosed)?;
        tx.send(value).map_err(|_| Error::ControlClosed)
    }

    /// Closes the input. Returns `true` only for the call that actually
    /// closed it.
    pub fn close(&self) -> bool {
        self.tx.lock().take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }
}
