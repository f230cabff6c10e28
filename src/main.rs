// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use autotrigger::config::{ControllerArgs, ControllerConfig};
use autotrigger::constants::{CONTROLLER_NAME, TOKIO_WORKER_THREADS};
use autotrigger::{controller, server};
use clap::Parser;
use kube::Client;
use tracing::{debug, error, info};

/// Kubernetes controller that keeps Knative Triggers in line with a filter
/// annotation on their parent resource
#[derive(Parser, Debug)]
#[command(name = "autotrigger")]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    controller: ControllerArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name(CONTROLLER_NAME)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

fn init_tracing() {
    // Format: timestamp file:line LEVEL message
    // Respects RUST_LOG (default info) and RUST_LOG_FORMAT=json
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(args: Args) -> Result<()> {
    init_tracing();

    let config = ControllerConfig::try_from(args.controller)?;
    info!("Starting autotrigger controller");
    info!(
        "Watching namespace: {}",
        config.namespace.as_deref().unwrap_or("all")
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let metrics_bind_address = config.metrics_bind_address;

    // The controller and the metrics server should never exit on their own
    tokio::select! {
        result = controller::run_controller(client, config) => {
            error!("CRITICAL: controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("controller exited unexpectedly without error")
        }
        result = server::serve(metrics_bind_address) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("autotrigger controller shutting down");
    Ok(())
}
