use crate::{
    coordinator::{Coordinator, StageGuard},
    source::StreamValue,
};
use std::io::Write;
use tokio::{sync::mpsc, task::JoinHandle};

/// What the sink did before the relay stream closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    /// Values taken off the relay stream.
    pub consumed: u64,
    /// Values whose write to the destination failed.
    pub failed: u64,
}

/// Renders one value the way the sink writes it.
pub fn render_value(value: StreamValue) -> String {
    format!("value: {value}\n")
}

/// Spawns the sink on the blocking pool and returns its report handle.
///
/// The sink drains `relay` until the sampler closes it and writes each value
/// to `destination` with a single `write_all`. It does not watch for
/// cancellation: upstream stages close the relay on shutdown, and draining
/// to the end is what lets them finish their last send.
///
/// A failed write is logged and counted, then the sink moves on to the next
/// value.
pub fn spawn_sink<W>(
    coordinator: &Coordinator,
    relay: mpsc::Receiver<StreamValue>,
    destination: W,
) -> JoinHandle<SinkReport>
where
    W: Write + Send + 'static,
{
    let guard = coordinator.register();
    tokio::task::spawn_blocking(move || sink_loop(guard, relay, destination))
}

fn sink_loop<W>(
    _guard: StageGuard,
    mut relay: mpsc::Receiver<StreamValue>,
    mut destination: W,
) -> SinkReport
where
    W: Write,
{
    let mut report = SinkReport::default();

    while let Some(value) = relay.blocking_recv() {
        report.consumed += 1;
        if let Err(e) = destination.write_all(render_value(value).as_bytes()) {
            report.failed += 1;
            tracing::warn!(value, error = %e, "unable to write value to destination");
        }
    }

    if let Err(e) = destination.flush() {
        tracing::warn!(error = %e, "unable to flush destination");
    }

    tracing::debug!(
        consumed = report.consumed,
        failed = report.failed,
        "sink terminated"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use parking_lot::Mutex;
    use std::{io, sync::Arc};
    use tokio::time::timeout;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken {
        attempts: Arc<Mutex<u64>>,
    }

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            *self.attempts.lock() += 1;
            Err(io::Error::other("destination unavailable"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("destination unavailable"))
        }
    }

    #[test]
    fn renders_one_line_per_value() {
        assert_eq!(render_value(7), "value: 7\n");
        assert_eq!(render_value(99), "value: 99\n");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn writes_every_value_then_stops_on_close() {
        let coordinator = Coordinator::new();
        let buffer = SharedBuffer::default();
        let (tx, rx) = mpsc::channel(1);
        let handle = spawn_sink(&coordinator, rx, buffer.clone());

        for value in [3, 1, 4] {
            tx.send(value).await.unwrap();
        }
        drop(tx);

        let report = handle.await.unwrap();
        assert_eq!(report, SinkReport { consumed: 3, failed: 0 });
        assert_eq!(
            String::from_utf8(buffer.0.lock().clone()).unwrap(),
            "value: 3\nvalue: 1\nvalue: 4\n"
        );
        assert_eq!(coordinator.inflight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn write_failures_do_not_stop_consumption() {
        let coordinator = Coordinator::new();
        let attempts = Arc::new(Mutex::new(0));
        let (tx, rx) = mpsc::channel(1);
        let handle = spawn_sink(
            &coordinator,
            rx,
            Broken {
                attempts: Arc::clone(&attempts),
            },
        );

        for value in 0..200 {
            timeout(Duration::from_millis(500), tx.send(value % 100))
                .await
                .expect("failing sink must keep draining")
                .unwrap();
        }
        drop(tx);

        let report = handle.await.unwrap();
        assert_eq!(report.consumed, 200);
        assert_eq!(report.failed, 200);
        assert_eq!(*attempts.lock(), 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn ignores_cancellation_until_relay_closes() {
        let coordinator = Coordinator::new();
        let (tx, rx) = mpsc::channel(1);
        let handle = spawn_sink(&coordinator, rx, io::sink());

        coordinator.cancel();
        tx.send(1).await.unwrap();
        tx.send(2).await.unwrap();
        assert_eq!(coordinator.inflight(), 1);
        drop(tx);

        let report = handle.await.unwrap();
        assert_eq!(report.consumed, 2);
    }
}
