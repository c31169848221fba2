//! Unified error handling for the trip-splitter library.
//!
//! Bad fixes are never errors: they end up in the rejected set. Errors are
//! reserved for configuration problems and for the I/O layer around the core.

use std::fmt;

/// Unified error type for trip-splitter operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TripSplitError {
    /// A segmentation threshold is non-positive, NaN or infinite
    InvalidThreshold { name: &'static str, value: f64 },
    /// Any other configuration problem (e.g. a threshold that is not a number)
    ConfigError { message: String },
    /// Reading or writing a file failed
    Io { path: String, message: String },
    /// CSV decoding/encoding failed
    Csv { message: String },
    /// JSON/GeoJSON serialization failed
    Serialization { message: String },
}

impl fmt::Display for TripSplitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripSplitError::InvalidThreshold { name, value } => {
                write!(
                    f,
                    "Invalid threshold '{}': {} (must be a positive number)",
                    name, value
                )
            }
            TripSplitError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            TripSplitError::Io { path, message } => {
                if path.is_empty() {
                    write!(f, "I/O error: {}", message)
                } else {
                    write!(f, "I/O error ({}): {}", path, message)
                }
            }
            TripSplitError::Csv { message } => {
                write!(f, "CSV error: {}", message)
            }
            TripSplitError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for TripSplitError {}

impl From<std::io::Error> for TripSplitError {
    fn from(err: std::io::Error) -> Self {
        TripSplitError::Io {
            path: String::new(),
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for TripSplitError {
    fn from(err: csv::Error) -> Self {
        TripSplitError::Csv {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TripSplitError {
    fn from(err: serde_json::Error) -> Self {
        TripSplitError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type alias for trip-splitter operations.
pub type Result<T> = std::result::Result<T, TripSplitError>;

/// Extension trait for attaching a file path to I/O results.
pub trait IoResultExt<T> {
    /// Convert an `io::Result` into a [`TripSplitError::Io`] naming `path`.
    fn with_path(self, path: &std::path::Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| TripSplitError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
