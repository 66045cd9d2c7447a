//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// `log_level` is used when `RUST_LOG` is not parseable; `log_format` selects
/// `json` output, anything else gives human-readable text.
pub fn init(log_level: &str, log_format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
