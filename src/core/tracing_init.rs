use crate::core::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global subscriber for the CLI.
///
/// Every layer writes to stderr. Listings, article bodies and other command
/// results are printed on stdout and must stay pipeable, so log lines never
/// share that stream.
pub fn init_tracing(config: &LoggingConfig) {
    let layer = if wants_console(config) {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(level_filter(config))
        .with(layer)
        .init();
}

/// `RUST_LOG` wins over the configured level
fn level_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

fn wants_console(config: &LoggingConfig) -> bool {
    config.console || config.format == "console"
}
