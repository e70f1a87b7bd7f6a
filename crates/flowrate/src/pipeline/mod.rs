//! Wiring of the stages into one running pipeline.
//!
//! [`Pipeline::start`] creates the [`Coordinator`], the control channel and
//! the three stages, and hands back a [`RunningPipeline`]. The caller owns
//! the sample stream (for an observer), the control input, and a
//! [`ShutdownTrigger`]. Nothing in the pipeline cancels itself; teardown
//! always begins with the trigger.

mod config;
mod shutdown;

pub use config::*;
pub use shutdown::*;

use crate::{
    Error, Result,
    control::{ControlInput, control_channel},
    coordinator::Coordinator,
    source::ValueSource,
    stages::{
        GeneratorReport, SampleCount, SamplerReport, SinkReport, spawn_generator, spawn_sampler,
        spawn_sink,
    },
};
use std::io::Write;
use tokio::{sync::mpsc, task::JoinHandle};

/// Combined reports of all stages after teardown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub generator: GeneratorReport,
    pub sampler: SamplerReport,
    pub sink: SinkReport,
}

pub struct Pipeline;

impl Pipeline {
    /// Spawns generator, sampler and sink on the current tokio runtime.
    ///
    /// Values written by the sink go to `destination`; `source` supplies the
    /// generated values.
    pub fn start<W, S>(config: PipelineConfig, destination: W, source: S) -> RunningPipeline
    where
        W: Write + Send + 'static,
        S: ValueSource,
    {
        let coordinator = Coordinator::new();
        let (control, control_rx) = control_channel(config.initial_control());

        let (values, generator) = spawn_generator(&coordinator, control_rx, source);
        let (outputs, sampler) = spawn_sampler(&coordinator, values, config.sample_interval());
        let sink = spawn_sink(&coordinator, outputs.relay, destination);

        tracing::info!(
            sample_interval_ms = config.sample_interval().as_millis() as u64,
            initial_control = config.initial_control(),
            "pipeline started"
        );

        RunningPipeline {
            trigger: ShutdownTrigger::new(control.clone(), coordinator.clone()),
            config,
            coordinator,
            control,
            samples: Some(outputs.samples),
            generator,
            sampler,
            sink,
        }
    }
}

/// Handle to a started pipeline.
pub struct RunningPipeline {
    config: PipelineConfig,
    coordinator: Coordinator,
    control: ControlInput,
    trigger: ShutdownTrigger,
    samples: Option<mpsc::Receiver<SampleCount>>,
    generator: JoinHandle<GeneratorReport>,
    sampler: JoinHandle<SamplerReport>,
    sink: JoinHandle<SinkReport>,
}

impl RunningPipeline {
    /// Input for live pacing updates.
    pub fn control(&self) -> ControlInput {
        self.control.clone()
    }

    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        self.trigger.clone()
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Takes the sample stream. Returns `None` after the first call.
    ///
    /// Whoever takes it should keep reading until it closes. If nobody takes
    /// it, samples are dropped when [`wait`](Self::wait) consumes the handle.
    pub fn take_samples(&mut self) -> Option<mpsc::Receiver<SampleCount>> {
        self.samples.take()
    }

    /// Waits for the pipeline to be cancelled and torn down.
    ///
    /// Once cancelled, every stage must finish within the configured
    /// shutdown grace period. Also returns if every stage stopped on its
    /// own, which only happens when a stage task failed.
    ///
    /// # Errors
    ///
    /// - [`Error::ShutdownTimeout`] if stages were still running when the
    ///   grace period ran out.
    /// - [`Error::StageJoin`] if a stage task panicked.
    pub async fn wait(mut self) -> Result<PipelineReport> {
        // An untaken sample stream would otherwise park the sampler's final
        // flush for a whole interval.
        drop(self.samples.take());

        // Stages only wind down by themselves if one of them died.
        tokio::select! {
            () = self.coordinator.cancelled() => {}
            () = self.coordinator.wait_all_done() => {}
        }

        let grace = self.config.shutdown_grace();
        if tokio::time::timeout(grace, self.coordinator.wait_all_done())
            .await
            .is_err()
        {
            let pending = self.coordinator.inflight();
            tracing::warn!(pending, "graceful teardown timed out");
            return Err(Error::ShutdownTimeout { pending });
        }

        let report = PipelineReport {
            generator: join_stage("generator", self.generator).await?,
            sampler: join_stage("sampler", self.sampler).await?,
            sink: join_stage("sink", self.sink).await?,
        };

        tracing::info!(
            produced = report.generator.produced,
            relayed = report.sampler.relayed,
            written = report.sink.consumed - report.sink.failed,
            "pipeline shut down"
        );
        Ok(report)
    }
}

async fn join_stage<T>(stage: &'static str, handle: JoinHandle<T>) -> Result<T> {
    handle.await.map_err(|e| Error::StageJoin {
        stage,
        reason: e.to_string(),
    })
}
