use crate::{
    control::{ControlReceiver, ControlValue, pacing_delay},
    coordinator::{Coordinator, StageGuard},
    source::{StreamValue, ValueSource},
};
use tokio::{sync::mpsc, task::JoinHandle};

/// What the generator did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorReport {
    /// Values handed to the downstream channel.
    pub produced: u64,
}

/// Spawns the rate-controlled generator and returns its output stream.
///
/// The generator registers with `coordinator` before the task starts and
/// closes the returned stream when it stops. It stops on cancellation or
/// when the downstream reader is gone; a closed control input only freezes
/// the pacing at its last value.
///
/// Each iteration is two-phase:
///
/// 1. Poll, without waiting, for cancellation and for the latest control
///    value.
/// 2. Send the next value, racing the send against cancellation so a
///    stalled consumer can never hold the generator past shutdown.
///
/// Positive control values pause the loop for that many nanoseconds after
/// each value. The pause also races cancellation.
pub fn spawn_generator<S>(
    coordinator: &Coordinator,
    control: ControlReceiver,
    source: S,
) -> (mpsc::Receiver<StreamValue>, JoinHandle<GeneratorReport>)
where
    S: ValueSource,
{
    // Capacity 1 is the smallest tokio allows; at most one value waits
    // between stages.
    let (tx, rx) = mpsc::channel(1);
    let guard = coordinator.register();
    let handle = tokio::spawn(generator_loop(
        guard,
        coordinator.clone(),
        control,
        source,
        tx,
    ));
    (rx, handle)
}

async fn generator_loop<S>(
    _guard: StageGuard,
    coordinator: Coordinator,
    mut control: ControlReceiver,
    mut source: S,
    tx: mpsc::Sender<StreamValue>,
) -> GeneratorReport
where
    S: ValueSource,
{
    let mut report = GeneratorReport::default();
    let mut pace: ControlValue = *control.borrow_and_update();
    let mut control_open = true;

    tracing::debug!(pace, "generator started");

    loop {
        // === Phase 1: zero-wait polls ===
        if coordinator.is_cancelled() {
            break;
        }

        if control_open {
            match control.has_changed() {
                Ok(true) => {
                    pace = *control.borrow_and_update();
                    tracing::trace!(pace, "generator adopted control value");
                }
                Ok(false) => {}
                Err(_) => {
                    // Closed. Whatever was last published still applies.
                    control_open = false;
                    pace = *control.borrow();
                    tracing::debug!(pace, "control input closed");
                }
            }
        }

        // === Phase 2: cancellation-aware send ===
        let value = source.next_value();
        tokio::select! {
            biased;

            () = coordinator.cancelled() => break,

            sent = tx.send(value) => {
                if sent.is_err() {
                    tracing::debug!("generator output has no reader");
                    break;
                }
                report.produced += 1;
            }
        }

        if let Some(delay) = pacing_delay(pace) {
            tokio::select! {
                biased;

                () = coordinator.cancelled() => break,

                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    tracing::debug!(produced = report.produced, "generator terminated");
    report
}
