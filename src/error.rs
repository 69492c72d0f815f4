//! # Error Types
//!
//! Custom error types for dpad-mux using `thiserror`.

use thiserror::Error;

/// Main error type for dpad-mux
#[derive(Debug, Error)]
pub enum DpadMuxError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Auxiliary pad device errors
    #[error("Pad device error: {0}")]
    Pad(String),

    /// No input device with the configured direction keys
    #[error("No input device with the configured direction keys found")]
    PadNotFound,

    /// The dual-directional feature needs all four direction keys assigned
    #[error("Dual-directional input unavailable: not all direction keys are assigned")]
    PadUnavailable,

    /// Journal record serialization errors
    #[error("Journal error: {0}")]
    Journal(#[from] serde_json::Error),
}

/// Result type alias for dpad-mux
pub type Result<T> = std::result::Result<T, DpadMuxError>;
