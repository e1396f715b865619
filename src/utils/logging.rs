use crate::config::LoggingSettings;

/// Initialize tracing for the harness from the logging settings.
pub fn init(settings: &LoggingSettings) {
    let level = match settings.level.to_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "warn" | "warning" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    };

    // Use try_init so tests and embedding runners can call this multiple times without panicking
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
