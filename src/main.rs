// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use hairpin_proxy::{
    config::ControllerConfig,
    constants::TOKIO_WORKER_THREADS,
    metrics::serve_metrics,
    reconciler::{select_mode, Reconciler},
};
use kube::Client;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Points in-cluster DNS at the hairpin proxy for every TLS Ingress host.
#[derive(Debug, Parser)]
#[command(name = "hairpin-proxy-controller", version, about)]
struct Args {
    /// Path to a writable hosts file; switches to per-node hosts file mode
    #[arg(long = "etc-hosts", value_name = "PATH")]
    etc_hosts: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("hairpin-proxy")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Respects RUST_LOG (default: info) and RUST_LOG_FORMAT (json|text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting hairpin-proxy controller");

    let config = ControllerConfig::from_env(args.etc_hosts)?;
    debug!(?config, "Loaded configuration");

    let mode = select_mode(config.hosts_file.as_deref()).inspect_err(|e| {
        error!("CRITICAL: {}", e);
    })?;
    info!(mode = mode.label(), "Selected operating mode");

    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    if let Some(port) = config.metrics_port {
        tokio::spawn(async move {
            if let Err(e) = serve_metrics(port).await {
                error!("Metrics server failed: {}", e);
            }
        });
    }

    let reconciler = Reconciler::for_cluster(client, &mode, &config);

    tokio::select! {
        result = reconciler.run() => result.map_err(Into::into),
        () = shutdown_signal() => {
            info!("Shutdown signal received, exiting");
            Ok(())
        }
    }
}

/// Resolve when SIGINT or (on Unix) SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
