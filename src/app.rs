//! Process lifecycle: resolve the mode, start the feed, serve until stopped.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use grapher_core::{Mode, ResultStore, Settings};
use grapher_feeds::{IngestError, IngestSummary, Ingestor, InputSource, QueryPath, SqliteRangeQuery};
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::server::{self, AppState, DataSource};

/// Run until `cancel` fires (clean exit) or the ingestor hits a fatal error.
///
/// In ingestion mode `input` names the file to tail; `None` means stdin. It
/// is ignored in query mode.
pub async fn run(
    settings: Settings,
    input: Option<PathBuf>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mode = settings.mode().context("invalid configuration")?;
    let addr = settings.listen_addr().context("invalid configuration")?;

    let (source, mut ingest) = match mode {
        Mode::Ingest(config) => {
            let input = InputSource::from_arg(input);
            let reader = input
                .open()
                .await
                .with_context(|| format!("failed to open {input}"))?;
            tracing::info!(%input, "ingestion mode");

            let store = Arc::new(ResultStore::new());
            let handle = Ingestor::new(reader, config.parser, store.clone())
                .policy(config.policy)
                .spawn(cancel.child_token());
            (DataSource::Input(store), Some(handle))
        }
        Mode::Query(config) => {
            let backend = SqliteRangeQuery::open(&config.dsn)
                .with_context(|| format!("failed to open database {}", config.dsn))?;
            tracing::info!(dsn = %config.dsn, "query mode");
            (
                DataSource::Query(QueryPath::new(Arc::new(backend), config.sql)),
                None,
            )
        }
    };

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let app = server::router(AppState { source }, &settings.public_dir);
    let server_cancel = cancel.child_token();
    let mut server = tokio::spawn(server::serve(listener, app, server_cancel.clone()));

    let mut ingest_done = false;
    let outcome = tokio::select! {
        served = &mut server => served_outcome(served),
        finished = wait(&mut ingest) => {
            ingest_done = true;
            ingest_outcome(finished)
        }
    };

    // Stop whichever side is still running and wait for it.
    server_cancel.cancel();
    if let Some(handle) = ingest.filter(|_| !ingest_done) {
        cancel.cancel();
        let _ = handle.await;
    }
    if !server.is_finished() {
        let _ = server.await;
    }

    outcome
}

type IngestOutcome = Result<Result<IngestSummary, IngestError>, JoinError>;

async fn wait(handle: &mut Option<JoinHandle<Result<IngestSummary, IngestError>>>) -> IngestOutcome {
    match handle {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

fn served_outcome(served: Result<std::io::Result<()>, JoinError>) -> anyhow::Result<()> {
    served.context("server task failed")?.context("server error")
}

fn ingest_outcome(finished: IngestOutcome) -> anyhow::Result<()> {
    let summary = finished
        .context("ingestor task failed")?
        .context("ingestion stopped")?;
    tracing::info!(
        lines = summary.lines,
        merged = summary.merged,
        skipped = summary.skipped,
        "ingestor finished"
    );
    Ok(())
}
