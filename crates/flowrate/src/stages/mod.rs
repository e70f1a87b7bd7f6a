//! The three pipeline stages.
//!
//! Each stage is a spawned task that registers with the [`Coordinator`]
//! before it starts and releases itself on every exit path. Stages only
//! close the channels they own, and closure only flows downstream:
//!
//! ```text
//! control ─▶ generator ─▶ sampler ─┬─▶ relay ─▶ sink ─▶ destination
//!                                   └─▶ samples ─▶ observer
//! ```
//!
//! - [`generator`] - rate-controlled producer of stream values.
//! - [`sampler`] - relays values and counts them per interval.
//! - [`sink`] - writes relayed values to a synchronous destination.
//!
//! [`Coordinator`]: crate::Coordinator

pub mod generator;
pub mod sampler;
pub mod sink;

pub use generator::{GeneratorReport, spawn_generator};
pub use sampler::{SampleCount, SamplerOutputs, SamplerReport, spawn_sampler};
pub use sink::{SinkReport, render_value, spawn_sink};
