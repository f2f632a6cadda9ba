use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when RUST_LOG is unset
pub const DEFAULT_FILTER: &str = "info,aqi=debug";

/// Log output shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable, for terminals
    Pretty,
}

/// Initialize logging.
/// - RUST_LOG respected; default to "info,aqi=debug"
/// - logs go to stderr so command output on stdout stays clean
pub fn init(service_name: &str, format: LogFormat) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let registry = tracing_subscriber::registry().with(EnvFilter::new(env_filter));

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    tracing::info!(service = %service_name, "Observability initialized");
}
