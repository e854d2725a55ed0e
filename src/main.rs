use std::path::PathBuf;

use clap::Parser;
use grapher_core::Settings;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "grapher",
    about = "Graph a log stream (or a SQL range query) as a time series over HTTP"
)]
struct Cli {
    /// Log file to tail. Reads stdin when omitted.
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            grapher::telemetry::init(false);
            tracing::error!(error = %err, "failed to load configuration");
            std::process::exit(1);
        }
    };
    grapher::telemetry::init(settings.is_dev());

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    if let Err(err) = grapher::app::run(settings, cli.input, cancel).await {
        tracing::error!(error = %format!("{err:#}"), "grapher stopped");
        std::process::exit(1);
    }

    // A pending stdin read holds a blocking thread the runtime would wait on.
    std::process::exit(0);
}

/// Cancel on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
    cancel.cancel();
}
