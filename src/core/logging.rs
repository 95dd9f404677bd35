//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable. The library itself only
/// emits through the `log` facade; binaries call this once at startup.
///
/// # Example
/// ```
/// canopygen::core::logging::init();
/// log::info!("Canopy generation started");
/// ```
pub fn init() {
    // Later calls keep the first logger
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
