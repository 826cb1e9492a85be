//! Logging setup.
//!
//! Progress is reported through `tracing` events. Without `-v` only
//! warnings and errors are shown; with it every pipeline step is printed.
//! Output goes to stdout so progress lines interleave with command output.

use tracing::Level;

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stdout)
        .try_init();
}
