use crate::{Error, Result, control::ControlValue};
use core::time::Duration;

/// Sampling interval used when none is configured.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// How long [`RunningPipeline::wait`] gives the stages after cancellation.
///
/// [`RunningPipeline::wait`]: crate::RunningPipeline::wait
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Validated pipeline settings.
///
/// Build one through [`PipelineConfig::builder`]; the fields are read-only
/// so an invalid configuration cannot reach [`Pipeline::start`].
///
/// [`Pipeline::start`]: crate::Pipeline::start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    sample_interval: Duration,
    initial_control: ControlValue,
    shutdown_grace: Duration,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub const fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    pub const fn initial_control(&self) -> ControlValue {
        self.initial_control
    }

    pub const fn shutdown_grace(&self) -> Duration {
        self.shutdown_grace
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            initial_control: 0,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }
}

impl PipelineConfigBuilder {
    #[must_use]
    pub const fn sample_interval(mut self, interval: Duration) -> Self {
        self.config.sample_interval = interval;
        self
    }

    /// Pacing the generator starts with, in nanoseconds.
    #[must_use]
    pub const fn initial_control(mut self, value: ControlValue) -> Self {
        self.config.initial_control = value;
        self
    }

    #[must_use]
    pub const fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.config.shutdown_grace = grace;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the sampling interval or the
    /// shutdown grace period is zero.
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.sample_interval.is_zero() {
            return Err(Error::InvalidConfig {
                reason: "sample interval must be greater than 0".to_string(),
            });
        }

        if self.config.shutdown_grace.is_zero() {
            return Err(Error::InvalidConfig {
                reason: "shutdown grace period must be greater than 0".to_string(),
            });
        }

        Ok(self.config)
    }
}
