//! Error types for engine construction, worker control and file processing

use std::fmt;
use std::path::PathBuf;

/// Main error type for all string art operations
#[derive(Debug)]
pub enum StringArtError {
    /// Failed to load source image from filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Raster buffer cannot be read as a square 8-bit grayscale image
    ///
    /// Raised at engine construction, never mid-run.
    UnsupportedRaster {
        /// Description of what's wrong with the buffer
        reason: String,
    },

    /// Run or CLI parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Failed to save a rendered image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Protocol message could not be encoded or decoded
    Serialization {
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// The worker rejected a run before its first step
    RunFailed {
        /// Message reported by the worker
        reason: String,
    },

    /// The worker thread is gone and can no longer take requests
    WorkerDisconnected,
}

impl fmt::Display for StringArtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::UnsupportedRaster { reason } => {
                write!(f, "Unsupported raster input: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Serialization { source } => {
                write!(f, "Failed to serialize message: {source}")
            }
            Self::RunFailed { reason } => {
                write!(f, "Run failed: {reason}")
            }
            Self::WorkerDisconnected => {
                write!(f, "Worker thread disconnected")
            }
        }
    }
}

impl std::error::Error for StringArtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Serialization { source } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for string art results
pub type Result<T> = std::result::Result<T, StringArtError>;

impl From<image::ImageError> for StringArtError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for StringArtError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<serde_json::Error> for StringArtError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization { source: err }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> StringArtError {
    StringArtError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an unsupported raster error
pub fn unsupported_raster(reason: &impl ToString) -> StringArtError {
    StringArtError::UnsupportedRaster {
        reason: reason.to_string(),
    }
}

/// Attach a path and operation to a bare I/O error
pub fn file_system(
    path: impl Into<PathBuf>,
    operation: &'static str,
) -> impl FnOnce(std::io::Error) -> StringArtError {
    let path = path.into();
    move |source| StringArtError::FileSystem {
        path,
        operation,
        source,
    }
}
