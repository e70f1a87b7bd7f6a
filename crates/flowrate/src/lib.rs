#![doc = include_str!("../README.md")]

pub mod control;
pub mod coordinator;
mod error;
pub mod pipeline;
pub mod source;
pub mod stages;

pub use control::{ControlInput, ControlReceiver, ControlValue, control_channel, pacing_delay};
pub use coordinator::{Coordinator, StageGuard};
pub use error::*;
pub use pipeline::{
    Pipeline, PipelineConfig, PipelineConfigBuilder, PipelineReport, RunningPipeline,
    ShutdownTrigger,
};
pub use source::{StreamValue, ThreadRandom, VALUE_UPPER_BOUND, ValueSource};
pub use stages::{SampleCount, SinkReport};
