use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the global tracing subscriber.
///
/// The level is controlled through `RUST_LOG`, defaulting to `info`:
/// - RUST_LOG=debug abyss
/// - RUST_LOG=abyss=trace,tower_http=debug abyss
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::debug!("Logger initialized");
}
