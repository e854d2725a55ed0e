//! Structured JSON logging for the binary.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins when set; otherwise the
/// level is `info`, or `debug` with source locations in dev mode.
pub fn init(dev: bool) {
    let default_level = if dev { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_file(dev)
        .with_line_number(dev)
        .try_init();

    if let Err(err) = result {
        eprintln!("grapher: logging already initialised: {err}");
    }
}
