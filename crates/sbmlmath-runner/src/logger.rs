use crate::config::LogLevel;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Installs a compact stderr logger filtered at `level`. Stdout stays
/// reserved for conversion output. A second call is a no-op.
pub fn init_logging(level: LogLevel) {
    let filter = tracing_subscriber::filter::LevelFilter::from_level(level.into());
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .compact()
        .with_filter(filter);

    let _ = Registry::default().with(layer).try_init();
}
