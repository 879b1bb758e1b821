//! Error types for the grass renderer

use thiserror::Error;

/// Main error type for the renderer
///
/// Every variant is treated as fatal by the application shell; library code
/// only reports and never terminates the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration, unreadable or invalid shader, or an unknown uniform
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A dispatch does not fit in the device's work-group limits
    #[error("Dispatch of {requested} work groups exceeds device limits {limits:?}")]
    CapacityExceeded { requested: u32, limits: [u32; 3] },

    #[error("GPU error: {0}")]
    Gpu(String),

    /// A value of the wrong kind was stored into a typed collection
    #[error("Invalid assignment: {0}")]
    InvalidAssignment(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
