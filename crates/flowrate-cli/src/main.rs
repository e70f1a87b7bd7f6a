#![doc = include_str!("../README.md")]

mod config;
mod control_input;
mod telemetry;

use clap::Parser;
use config::{AppConfig, CliArgs, Output};
use control_input::spawn_control_reader;
use flowrate::{Pipeline, RunningPipeline, SampleCount, ShutdownTrigger, ThreadRandom};
use std::io::BufReader;
use telemetry::init_telemetry;
use tokio::{signal, sync::mpsc, task::JoinHandle};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    init_telemetry()?;

    if cfg!(debug_assertions) {
        tracing::info!("Starting flowrate with full config: {:#?}", config);
    }

    let mut pipeline = match config.output {
        Output::Discard => Pipeline::start(config.pipeline, std::io::sink(), ThreadRandom),
        Output::Stdout => Pipeline::start(config.pipeline, std::io::stdout(), ThreadRandom),
    };

    if config.control_stdin {
        spawn_control_reader(BufReader::new(std::io::stdin()), pipeline.control())?;
    }

    run(&mut pipeline).await;

    let report = pipeline.wait().await?;
    tracing::info!(
        samples = report.sampler.samples_emitted,
        failed_writes = report.sink.failed,
        "Service shut down successfully"
    );
    Ok(())
}

/// Observes samples until the interrupt arrives, then fires the trigger.
async fn run(pipeline: &mut RunningPipeline) {
    let observer = pipeline.take_samples().map(spawn_observer);
    let trigger = pipeline.shutdown_trigger();

    shutdown_signal(trigger).await;

    if let Some(observer) = observer {
        // The sampler closes the stream on its way out, which ends the
        // observer.
        match observer.await {
            Ok(seen) => tracing::debug!(seen, "observer finished"),
            Err(e) => tracing::error!("observer task failed: {e}"),
        }
    }
}

fn spawn_observer(mut samples: mpsc::Receiver<SampleCount>) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut seen = 0;
        while let Some(sample) = samples.recv().await {
            seen += 1;
            tracing::info!("sample: {sample}");
        }
        seen
    })
}

async fn shutdown_signal(trigger: ShutdownTrigger) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
    trigger.fire();
}
