//! Error types for stratus-deploy.

use std::path::PathBuf;

use stratus_lambda::LambdaError;

/// Result type alias using [`DeployError`].
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors that can occur during a deployment run.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The configuration record failed validation before any remote call.
    #[error("validation error: {0}")]
    Validation(String),

    /// The local archive could not be read.
    #[error("failed to read archive {}: {source}", path.display())]
    ArchiveRead {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The archive could not be assembled from the expanded source files.
    #[error("failed to build archive {}: {message}", path.display())]
    ArchiveBuild {
        /// Destination archive path.
        path: PathBuf,
        /// Underlying archive error.
        message: String,
    },

    /// The attempt budget ran out before the function settled.
    #[error(
        "timed out waiting for function to become {target}: \
         last observed {observed} ({reason_code}): {reason}"
    )]
    ReadinessTimeout {
        /// Terminal-success value that was being waited for.
        target: &'static str,
        /// Last observed value on that axis.
        observed: String,
        /// Last observed reason, if the service supplied one.
        reason: String,
        /// Last observed reason code, if the service supplied one.
        reason_code: String,
    },

    /// The run was cancelled from outside (deadline or signal).
    #[error("deployment cancelled")]
    Cancelled,

    /// The platform rejected a request.
    #[error(transparent)]
    Api(#[from] LambdaError),

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns true for errors raised before any remote call was made.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
