use storefront_core::config::{LogFormat, LoggingConfig};
use tracing::Level;

/// Installs the global fmt subscriber. Output goes to stderr so stdout stays
/// reserved for command payloads and the shop menu.
pub fn init(config: &LoggingConfig) {
    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
