//! Shared cancellation and completion tracking for pipeline stages.
//!
//! Every stage registers with the [`Coordinator`] before its task is spawned
//! and holds the returned [`StageGuard`] for the whole life of that task. The
//! guard releases the stage exactly once when it is consumed or dropped, so
//! normal returns, cancellation, closed inputs and panics all balance the
//! tracker the same way.

use portable_atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

struct Inner {
    shutdown_token: CancellationToken,
    inflight: AtomicUsize,
    registered: AtomicUsize,
    completed: AtomicUsize,
    idle: Notify,
}

/// Cancellation signal plus in-flight stage counter, shared by all stages.
///
/// Cloning is cheap; every clone observes the same state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                shutdown_token: CancellationToken::new(),
                inflight: AtomicUsize::new(0),
                registered: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// Marks one more stage as in-flight.
    ///
    /// Call this before spawning the stage's task and move the guard into
    /// it. The stage counts as running until the guard is released.
    #[must_use = "dropping the guard immediately marks the stage as done"]
    pub fn register(&self) -> StageGuard {
        self.inner.registered.fetch_add(1, Ordering::Relaxed);
        self.inner.inflight.fetch_add(1, Ordering::AcqRel);
        StageGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Transitions the pipeline to cancelled. Safe to call any number of
    /// times from any task; never blocks.
    pub fn cancel(&self) {
        self.inner.shutdown_token.cancel();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called. Never
    /// reverts to `false`.
    pub fn is_cancelled(&self) -> bool {
        self.inner.shutdown_token.is_cancelled()
    }

    /// Resolves once the pipeline is cancelled.
    pub async fn cancelled(&self) {
        self.inner.shutdown_token.cancelled().await;
    }

    /// Resolves once every registered stage has been released.
    ///
    /// Returns immediately when nothing is in flight.
    pub async fn wait_all_done(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            // Enable before checking the counter so a release that lands
            // between the load and the await is not missed.
            notified.as_mut().enable();

            if self.inflight() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Number of stages currently running.
    pub fn inflight(&self) -> usize {
        self.inner.inflight.load(Ordering::Acquire)
    }

    /// Total number of `register()` calls so far.
    pub fn registered(&self) -> usize {
        self.inner.registered.load(Ordering::Acquire)
    }

    /// Total number of stages released so far.
    pub fn completed(&self) -> usize {
        self.inner.completed.load(Ordering::Acquire)
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Coordinator")
            .field("cancelled", &self.is_cancelled())
            .field("inflight", &self.inflight())
            .field("registered", &self.registered())
            .field("completed", &self.completed())
            .finish()
    }
}

/// Proof that a stage is registered. Releasing it marks the stage as done.
pub struct StageGuard {
    inner: Arc<Inner>,
}

impl StageGuard {
    /// Marks the stage as exited. Equivalent to dropping the guard.
    pub fn done(self) {}
}

impl Drop for StageGuard {
    fn drop(&mut self) {
        self.inner.completed.fetch_add(1, Ordering::AcqRel);
        if self.inner.inflight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
