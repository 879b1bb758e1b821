//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g. `RUST_LOG=grassfield=trace`
/// to see per-batch scheduling.
///
/// # Example
/// ```
/// grassfield::core::logging::init();
/// log::info!("Renderer started");
/// ```
pub fn init() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();
}
