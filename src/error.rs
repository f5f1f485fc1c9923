//! Crate-level error type.

use std::fmt;

/// Errors produced by the envbake pipeline.
#[derive(Debug)]
pub enum EnvBakeError {
    /// Underlying file I/O failure (missing file, permission error, etc).
    Io(std::io::Error),
    /// Image validation failure: inconsistent subimage sizes, too few
    /// channels, or a malformed mip-pyramid filename sequence.
    InvalidImage(String),
    /// An internal invariant was violated (programmer error, not user
    /// error). The process should terminate immediately on seeing one.
    Invariant(String),
}

impl fmt::Display for EnvBakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidImage(msg) => write!(f, "invalid image: {msg}"),
            Self::Invariant(msg) => write!(f, "internal invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for EnvBakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::InvalidImage(_) | Self::Invariant(_) => None,
        }
    }
}

impl From<std::io::Error> for EnvBakeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EnvBakeError>;
