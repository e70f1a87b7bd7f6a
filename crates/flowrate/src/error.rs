//! Error types for the flowrate pipeline.
//!
//! Errors in this crate are local to the place that produces them. None of
//! them cancel the pipeline; only an external [`ShutdownTrigger`] does that.
//!
//! ## Error Cases
//! - `InvalidConfig`: a [`PipelineConfig`] failed validation.
//! - `ControlClosed`: a control value was set after the control input closed.
//! - `ShutdownTimeout`: stages were still running when the grace period
//!   expired.
//! - `StageJoin`: a stage task panicked or was aborted.
//!
//! Destination write failures are plain [`std::io::Error`]s. The sink logs
//! and counts them; they never surface here.
//!
//! [`ShutdownTrigger`]: crate::ShutdownTrigger
//! [`PipelineConfig`]: crate::PipelineConfig

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the pipeline.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The pipeline configuration was rejected.
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// The control input is closed, or the generator no longer listens.
    #[error("Control input is closed")]
    ControlClosed,

    /// Stages did not finish within the shutdown grace period.
    #[error("Shutdown timed out with {pending} stage(s) still running")]
    ShutdownTimeout { pending: usize },

    /// A stage task could not be joined.
    #[error("Stage `{stage}` failed to join: {reason}")]
    StageJoin { stage: &'static str, reason: String },
}
