//! Error types for the runtime configuration mutation engine.

use std::path::PathBuf;

/// Result type alias for installer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while mutating runtime configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Detection Errors
    // =========================================================================
    /// The runtime version string reported by the orchestrator was unusable.
    ///
    /// Distinct from [`crate::RuntimeKind::Other`]: `Other` is a valid string
    /// naming a backend this agent does not manage, while this error means
    /// the input could not be interpreted at all.
    #[error("unusable runtime version string: {0:?}")]
    Detection(String),

    // =========================================================================
    // Filesystem Errors
    // =========================================================================
    /// A filesystem operation on a configuration file, backup, or link failed.
    #[error("filesystem operation failed at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    /// A backup was attempted over an unexpected prior backup state.
    ///
    /// Surfaced rather than silently overwritten: the existing backup may
    /// hold the only copy of the pristine pre-install configuration.
    #[error("conflicting backup state for {path}: {reason}")]
    BackupConflict { path: PathBuf, reason: String },

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// An external collaborator (service manager, node status sink) failed.
    #[error("collaborator call failed: {0}")]
    Collaborator(String),

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps an I/O error with the path it occurred on.
    pub(crate) fn fs(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}
