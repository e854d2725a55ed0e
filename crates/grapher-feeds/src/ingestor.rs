//! Ingestor: tails a byte stream and folds every line into the store.
//!
//! The loop never ends on its own. When the source has no complete line
//! available it sleeps for a fixed backoff and polls again; it stops when
//! its [`CancellationToken`] fires, on a read error, or (under
//! [`ParseErrorPolicy::Fatal`]) on the first line that fails to parse.
//! A trailing fragment with no newline is held back until it is completed,
//! or until it has sat unchanged at end of input for one backoff.

use grapher_core::{LineParser, ParseError, ParseErrorPolicy, ResultStore};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Sleep between polls of a drained source.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Counters reported when the loop stops cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Non-blank lines handed to the parser.
    pub lines: u64,
    /// Lines merged into the store.
    pub merged: u64,
    /// Lines dropped under [`ParseErrorPolicy::Skip`].
    pub skipped: u64,
}

pub struct Ingestor<R> {
    reader: BufReader<R>,
    parser: LineParser,
    store: Arc<ResultStore>,
    policy: ParseErrorPolicy,
    backoff: Duration,
}

impl<R> Ingestor<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R, parser: LineParser, store: Arc<ResultStore>) -> Self {
        Self {
            reader: BufReader::new(reader),
            parser,
            store,
            policy: ParseErrorPolicy::default(),
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn policy(mut self, policy: ParseErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Run until cancelled or a fatal error occurs.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<IngestSummary, IngestError> {
        let mut summary = IngestSummary::default();
        let mut line = Vec::with_capacity(256);
        let mut quiet_fragment: Option<usize> = None;

        tracing::info!(
            granularity = %self.parser.granularity(),
            policy = ?self.policy,
            "ingestion started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                read = self.reader.read_until(b'\n', &mut line) => { read?; }
            }

            // No complete line yet. A trailing fragment stays in `line` and
            // the next read appends to it; one left untouched for a whole
            // backoff is taken as the final, unterminated line.
            if !line.ends_with(b"\n") {
                if !line.is_empty() && quiet_fragment == Some(line.len()) {
                    quiet_fragment = None;
                    tracing::debug!(len = line.len(), "flushing unterminated line");
                    self.ingest_line(&line, &mut summary)?;
                    line.clear();
                    continue;
                }
                quiet_fragment = (!line.is_empty()).then_some(line.len());
                tracing::trace!(pending = line.len(), "source drained, backing off");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.backoff) => continue,
                }
            }

            quiet_fragment = None;
            self.ingest_line(&line, &mut summary)?;
            line.clear();
        }

        tracing::info!(
            lines = summary.lines,
            merged = summary.merged,
            skipped = summary.skipped,
            "ingestion stopped"
        );
        Ok(summary)
    }

    fn ingest_line(&self, line: &[u8], summary: &mut IngestSummary) -> Result<(), IngestError> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        summary.lines += 1;

        match self.parser.parse(line) {
            Ok(point) => {
                self.store.merge(point);
                summary.merged += 1;
            }
            Err(err) => match self.policy {
                ParseErrorPolicy::Fatal => return Err(err.into()),
                ParseErrorPolicy::Skip => {
                    summary.skipped += 1;
                    tracing::warn!(error = %err, "skipping unparsable line");
                }
            },
        }
        Ok(())
    }
}

impl<R> Ingestor<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    /// Run the loop as a background task.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<Result<IngestSummary, IngestError>> {
        tokio::spawn(self.run(cancel))
    }
}
