use std::str::FromStr;

use tracing::Level;

/// Install the stderr subscriber. Unknown level names fall back to `info`.
pub fn init(level: &str, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        Level::from_str(level.trim()).unwrap_or(Level::INFO)
    };

    // try_init: an already-installed subscriber wins.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
