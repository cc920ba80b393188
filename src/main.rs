//! Command-line interface for kafka-pusher
//!
//! ```bash
//! # Push one batch per payload and exit
//! kafka-pusher --config config.yaml --once
//!
//! # Push on the configured scheduler interval until Ctrl+C
//! kafka-pusher --config config.yaml
//!
//! # Print messages to stdout instead of sending them
//! kafka-pusher --config config.yaml --dry-run
//! ```

use anyhow::Context;
use clap::Parser;
use kafka_pusher::config::Config;
use kafka_pusher::producer::{KafkaSink, MessageSink, StdoutSink};
use kafka_pusher::pusher::PushTask;
use kafka_pusher::scheduler::Scheduler;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "kafka-pusher")]
#[command(about = "Generate templated JSON messages and push them to Kafka")]
#[command(version, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        env = "KAFKA_PUSHER_CONFIG",
        default_value = "./config.yaml"
    )]
    config: PathBuf,

    /// Push once and exit even if the scheduler is enabled
    #[arg(long)]
    once: bool,

    /// Print generated messages to stdout instead of sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    kafka_pusher::logging::init(&config.logging)?;

    info!(
        "Starting kafka-pusher: config={:?}, payloads={}, dry_run={}",
        cli.config,
        config.payloads.len(),
        cli.dry_run
    );

    let sink: Arc<dyn MessageSink> = if cli.dry_run {
        Arc::new(StdoutSink::new())
    } else {
        Arc::new(KafkaSink::new(&config.kafka).context("Failed to create Kafka producer")?)
    };

    let task = Arc::new(PushTask::from_config(&config, Arc::clone(&sink))?);

    match config.scheduler.as_ref().filter(|s| s.enabled && !cli.once) {
        Some(scheduler_config) => {
            let mut scheduler = Scheduler::new(scheduler_config, task)?;
            scheduler.start()?;

            wait_for_shutdown().await;

            scheduler.stop().await?;
            let stats = scheduler.stats();
            info!(
                "Scheduler stats: executions={}, successes={}, errors={}, dropped={}, last_execution={:?}",
                stats.execution_count,
                stats.success_count,
                stats.error_count,
                stats.dropped_ticks,
                stats.last_execution
            );
            if let Some(last_error) = &stats.last_error {
                warn!("Last scheduler error: {}", last_error);
            }
        }
        None => {
            task.push().await.context("Failed to push messages")?;
        }
    }

    sink.flush().await.context("Failed to flush producer")?;
    info!("kafka-pusher finished");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received interrupt signal (Ctrl+C)"),
        _ = terminate => info!("Received termination signal"),
    }
}
