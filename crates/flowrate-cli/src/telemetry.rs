//! # Logging
//!
//! Log output goes through `tracing_subscriber::fmt`, filtered by `RUST_LOG`
//! (default `info`).
//!
//! - `info`: startup, every sample, shutdown summary.
//! - `debug`: stage start/stop, control input closing.
//! - `trace`: every control value the generator adopts.
//!
//! Write failures in the sink are logged at `warn` and never stop the
//! pipeline.
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin flowrate -- --sample-interval-ms 200
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()?;

    Ok(())
}
