//! Asset load errors

use thiserror::Error;

/// Why an individual asset failed.
///
/// Failures are recorded, never raised: the tracker keeps going and the
/// loading gate proceeds in a degraded state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Network or IO failure
    #[error("IO error: {0}")]
    Io(String),

    /// Decode failure
    #[error("Parse error: {0}")]
    Parse(String),

    /// The loader reported a failure without details
    #[error("Failed to load {0}")]
    Unspecified(String),
}
