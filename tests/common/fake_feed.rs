//! FakeFeed: an in-memory log source the ingestor can tail.
//!
//! The writer half pushes bytes into a channel; the reader half is an
//! [`AsyncRead`] (via [`StreamReader`]) that reports "no data yet" until more
//! bytes arrive, and EOF once the writer is dropped.

use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

/// A handle for pushing log lines into a [`FakeFeed`].
pub struct FakeFeedWriter {
    tx: mpsc::UnboundedSender<Bytes>,
}

impl FakeFeedWriter {
    /// Send a log line. Adds a trailing newline if not already present.
    pub fn send_line(&self, line: impl Into<String>) {
        let mut s = line.into();
        if !s.ends_with('\n') {
            s.push('\n');
        }
        let _ = self.tx.send(Bytes::from(s));
    }

    /// Send multiple lines at once (simulates a burst).
    pub fn send_burst<S: AsRef<str>>(&self, lines: &[S]) {
        for line in lines {
            self.send_line(line.as_ref());
        }
    }

    /// Send raw bytes as-is, e.g. half a line.
    pub fn send_raw(&self, bytes: impl Into<Bytes>) {
        let _ = self.tx.send(bytes.into());
    }

    /// Close the feed; the reader sees EOF from then on.
    pub fn close(self) {}
}

/// The stream half of a fake feed.
pub struct FakeFeed {
    rx: mpsc::UnboundedReceiver<Bytes>,
}

impl Stream for FakeFeed {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx).map(|chunk| chunk.map(Ok))
    }
}

/// Reader type handed to `Ingestor::new`.
pub type FakeFeedReader = StreamReader<FakeFeed, Bytes>;

/// Create a linked writer/reader pair.
///
/// ```rust
/// let (writer, reader) = fake_feed();
/// writer.send_line("Jan  5 10:00:01 level=info msg=a");
/// writer.close();
/// ```
pub fn fake_feed() -> (FakeFeedWriter, FakeFeedReader) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FakeFeedWriter { tx }, StreamReader::new(FakeFeed { rx }))
}
