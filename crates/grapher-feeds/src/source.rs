//! Input sources for ingestion mode: a named file, or stdin.

use std::fmt;
use std::path::PathBuf;
use tokio::io::AsyncRead;

/// A boxed async byte stream the ingestor can tail.
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// The optional positional CLI argument; absent means stdin.
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => InputSource::File(path),
            None => InputSource::Stdin,
        }
    }

    /// Open the source. A file that cannot be opened is an error; the file is
    /// read from the start and then tailed.
    pub async fn open(&self) -> std::io::Result<BoxedReader> {
        match self {
            InputSource::Stdin => Ok(Box::new(tokio::io::stdin())),
            InputSource::File(path) => {
                let file = tokio::fs::File::open(path).await?;
                Ok(Box::new(file))
            }
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => write!(f, "stdin"),
            InputSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}
