use std::io;
use thiserror::Error;

/// The error type for reachability operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Target descriptor was rejected at construction time
    #[error("Invalid reachability target: {reason}")]
    InvalidTarget { reason: String },

    /// I/O error occurred while reading system network state
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Platform-specific system call failed
    #[error("System call '{operation}' failed with code {code}")]
    SystemCall { operation: String, code: i32 },

    /// Feature not supported on this platform
    #[error("Feature '{feature}' not supported on {platform}")]
    UnsupportedPlatform { feature: String, platform: String },
}

impl Error {
    /// Create a new invalid target error
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            reason: reason.into(),
        }
    }

    /// Create a new system call error
    pub fn system_call(operation: impl Into<String>, code: i32) -> Self {
        Self::SystemCall {
            operation: operation.into(),
            code,
        }
    }

    /// Create a new unsupported platform error
    pub fn unsupported_platform(feature: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            feature: feature.into(),
            platform: std::env::consts::OS.to_string(),
        }
    }
}

/// A specialized `Result` type for reachability operations.
pub type Result<T> = std::result::Result<T, Error>;
