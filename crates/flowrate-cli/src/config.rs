use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::time::Duration;
use flowrate::{ControlValue, PipelineConfig};

/// Where the sink writes relayed values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Throw every value away.
    Discard,
    /// Write `value: <n>` lines to stdout.
    Stdout,
}

/// Runtime configuration for the `flowrate` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flowrate",
    version,
    about = "Generate a rate-controlled value stream and sample its throughput"
)]
pub struct CliArgs {
    /// Length of one sampling interval, in milliseconds.
    ///
    /// Each interval emits exactly one sample: the number of values relayed
    /// to the sink during that interval.
    ///
    /// Environment variable: `SAMPLE_INTERVAL_MS`
    #[arg(long, env = "SAMPLE_INTERVAL_MS", default_value_t = 1000)]
    pub sample_interval_ms: u64,

    /// Initial control value: the pause after each generated value, in
    /// nanoseconds. Zero or negative disables pacing.
    ///
    /// Environment variable: `CONTROL_NS`
    #[arg(long, env = "CONTROL_NS", default_value_t = 0, allow_hyphen_values = true)]
    pub control_ns: ControlValue,

    /// How long stages get to finish after shutdown is triggered, in
    /// milliseconds.
    ///
    /// Environment variable: `SHUTDOWN_GRACE_MS`
    #[arg(long, env = "SHUTDOWN_GRACE_MS", default_value_t = 500)]
    pub shutdown_grace_ms: u64,

    /// Destination for relayed values.
    ///
    /// Environment variable: `OUTPUT`
    #[arg(long, env = "OUTPUT", value_enum, default_value_t = Output::Discard)]
    pub output: Output,

    /// Read new control values from stdin, one integer (nanoseconds) per
    /// line. The latest line wins.
    ///
    /// Environment variable: `CONTROL_STDIN`
    #[arg(long, env = "CONTROL_STDIN", default_value_t = false)]
    pub control_stdin: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub output: Output,
    pub control_stdin: bool,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.sample_interval_ms == 0 {
            bail!("SAMPLE_INTERVAL_MS must be greater than 0");
        }

        if args.shutdown_grace_ms == 0 {
            bail!("SHUTDOWN_GRACE_MS must be greater than 0");
        }

        let pipeline = PipelineConfig::builder()
            .sample_interval(Duration::from_millis(args.sample_interval_ms))
            .initial_control(args.control_ns)
            .shutdown_grace(Duration::from_millis(args.shutdown_grace_ms))
            .build()?;

        Ok(Self {
            pipeline,
            output: args.output,
            control_stdin: args.control_stdin,
        })
    }
}
