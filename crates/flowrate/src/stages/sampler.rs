use crate::{
    coordinator::{Coordinator, StageGuard},
    source::StreamValue,
};
use core::time::Duration;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

/// Number of values relayed during one sampling interval.
pub type SampleCount = u64;

/// Shortest time the final flush waits for the observer.
const MIN_FLUSH_WAIT: Duration = Duration::from_millis(100);

/// What the sampler did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplerReport {
    /// Values forwarded on the relay stream.
    pub relayed: u64,
    /// Samples delivered on the sample stream, final flush included.
    pub samples_emitted: u64,
    /// Sum of every delivered sample.
    pub emitted_total: u64,
}

/// Output streams of the sampler.
pub struct SamplerOutputs {
    /// One [`SampleCount`] per interval.
    pub samples: mpsc::Receiver<SampleCount>,
    /// Every value received from the input, in order.
    pub relay: mpsc::Receiver<StreamValue>,
}

/// Spawns the sampling consumer.
///
/// Every value read from `input` is forwarded on the relay stream and then
/// counted. Once per `interval` the current count is sent on the sample
/// stream and reset, including zero counts. The sampler stops on
/// cancellation or once `input` is closed and drained, then closes both
/// outputs.
///
/// Every send races cancellation, so a stalled sink or observer cannot hold
/// the sampler past shutdown. A sample whose send was interrupted keeps its
/// count. Anything counted but not yet delivered is sent as one final
/// sample on the way out, waiting for the observer for one interval (at
/// least 100ms). Together these keep the sum of delivered samples equal to
/// [`SamplerReport::relayed`] whenever the observer keeps draining.
///
/// # Panics
///
/// Panics if `interval` is zero.
pub fn spawn_sampler(
    coordinator: &Coordinator,
    input: mpsc::Receiver<StreamValue>,
    interval: Duration,
) -> (SamplerOutputs, JoinHandle<SamplerReport>) {
    assert!(!interval.is_zero(), "sampling interval must be non-zero");

    let (samples_tx, samples_rx) = mpsc::channel(1);
    let (relay_tx, relay_rx) = mpsc::channel(1);
    let guard = coordinator.register();
    let handle = tokio::spawn(sampler_loop(
        guard,
        coordinator.clone(),
        input,
        interval,
        samples_tx,
        relay_tx,
    ));

    (
        SamplerOutputs {
            samples: samples_rx,
            relay: relay_rx,
        },
        handle,
    )
}

async fn sampler_loop(
    _guard: StageGuard,
    coordinator: Coordinator,
    mut input: mpsc::Receiver<StreamValue>,
    interval: Duration,
    samples_tx: mpsc::Sender<SampleCount>,
    relay_tx: mpsc::Sender<StreamValue>,
) -> SamplerReport {
    let mut report = SamplerReport::default();
    let mut count: SampleCount = 0;

    // `interval_at` so the first tick lands one full interval from now
    // rather than immediately.
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!(interval_ms = interval.as_millis() as u64, "sampler started");

    loop {
        tokio::select! {
            biased;

            () = coordinator.cancelled() => {
                tracing::debug!("sampler observed cancellation");
                break;
            }

            _ = ticker.tick() => {
                tokio::select! {
                    biased;

                    () = coordinator.cancelled() => break,

                    sent = samples_tx.send(count) => {
                        if sent.is_ok() {
                            report.samples_emitted += 1;
                            report.emitted_total += count;
                        } else {
                            tracing::trace!(count, "sample dropped, no observer");
                        }
                        count = 0;
                    }
                }
            }

            received = input.recv() => {
                let Some(value) = received else {
                    tracing::debug!("sampler input closed");
                    break;
                };

                tokio::select! {
                    biased;

                    () = coordinator.cancelled() => break,

                    sent = relay_tx.send(value) => {
                        if sent.is_err() {
                            tracing::debug!("relay stream has no reader");
                            break;
                        }
                        report.relayed += 1;
                        count += 1;
                    }
                }
            }
        }
    }

    // Relay first, so the sink can finish while the last sample is in
    // flight.
    drop(relay_tx);
    drop(input);

    if count > 0 {
        let wait = interval.max(MIN_FLUSH_WAIT);
        match tokio::time::timeout(wait, samples_tx.send(count)).await {
            Ok(Ok(())) => {
                report.samples_emitted += 1;
                report.emitted_total += count;
            }
            Ok(Err(_)) => {
                tracing::trace!(count, "final sample dropped, no observer");
            }
            Err(_) => {
                tracing::warn!(count, "observer did not take the final sample in time");
            }
        }
    }

    tracing::debug!(
        relayed = report.relayed,
        samples = report.samples_emitted,
        "sampler terminated"
    );
    report
}
