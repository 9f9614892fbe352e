//! Error types and the remote failure taxonomy.

use std::fmt;

/// Result type alias using [`LambdaError`].
pub type LambdaResult<T> = Result<T, LambdaError>;

/// Errors produced by the Lambda API client.
#[derive(Debug, thiserror::Error)]
pub enum LambdaError {
    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the request.
    #[error("{kind} ({code}): {message}")]
    Api {
        /// Classified failure category.
        kind: ErrorKind,
        /// Raw error code string from the service.
        code: String,
        /// Human-readable message from the service.
        message: String,
    },

    /// No usable credentials could be resolved.
    #[error("credential resolution failed: {0}")]
    Credentials(String),

    /// Request or response body could not be (de)serialised.
    #[error("serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LambdaError {
    /// Build an API error from the raw service error code and message.
    #[must_use]
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        Self::Api {
            kind: classify(&code),
            code,
            message: message.into(),
        }
    }

    /// Create a credentials error.
    #[must_use]
    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The failure category, if this is a service rejection.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Failure taxonomy for service rejections.
///
/// The category is informational: it labels the failure for the operator,
/// it never drives automatic retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service itself failed.
    ServiceUnavailable,
    /// The function (or one of its references) does not exist.
    NotFound,
    /// A request parameter was rejected.
    InvalidParameter,
    /// Request rate limit exceeded.
    RateLimited,
    /// The function has pending work that conflicts with the mutation.
    Conflict,
    /// The revision-id precondition did not match.
    PreconditionFailed,
    /// The account's code storage quota is exhausted.
    CodeStorageExceeded,
    /// The function is not yet ready to accept the mutation.
    NotReady,
    /// Anything the classifier does not recognise.
    Unknown,
}

impl ErrorKind {
    /// Get the category label for operator-facing logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable => "service-unavailable",
            Self::NotFound => "resource-not-found",
            Self::InvalidParameter => "invalid-parameter",
            Self::RateLimited => "rate-limited",
            Self::Conflict => "resource-conflict",
            Self::PreconditionFailed => "precondition-failed",
            Self::CodeStorageExceeded => "code-storage-exceeded",
            Self::NotReady => "resource-not-ready",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a raw service error code into a failure category.
///
/// The code string is the `x-amzn-ErrorType` header value with any
/// suffix after `:` or `#` already stripped.
#[must_use]
pub fn classify(code: &str) -> ErrorKind {
    match code {
        "ServiceException" | "ServiceUnavailableException" => ErrorKind::ServiceUnavailable,
        "ResourceNotFoundException" => ErrorKind::NotFound,
        "InvalidParameterValueException" => ErrorKind::InvalidParameter,
        "TooManyRequestsException" => ErrorKind::RateLimited,
        "ResourceConflictException" => ErrorKind::Conflict,
        "PreconditionFailedException" => ErrorKind::PreconditionFailed,
        "CodeStorageExceededException" => ErrorKind::CodeStorageExceeded,
        "ResourceNotReadyException" => ErrorKind::NotReady,
        _ => ErrorKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_classify() {
        assert_eq!(classify("ServiceException"), ErrorKind::ServiceUnavailable);
        assert_eq!(classify("ResourceNotFoundException"), ErrorKind::NotFound);
        assert_eq!(
            classify("InvalidParameterValueException"),
            ErrorKind::InvalidParameter
        );
        assert_eq!(classify("TooManyRequestsException"), ErrorKind::RateLimited);
        assert_eq!(classify("ResourceConflictException"), ErrorKind::Conflict);
        assert_eq!(
            classify("PreconditionFailedException"),
            ErrorKind::PreconditionFailed
        );
        assert_eq!(
            classify("CodeStorageExceededException"),
            ErrorKind::CodeStorageExceeded
        );
        assert_eq!(classify("ResourceNotReadyException"), ErrorKind::NotReady);
    }

    #[test]
    fn unrecognised_codes_fall_through() {
        assert_eq!(classify("KMSAccessDeniedException"), ErrorKind::Unknown);
        assert_eq!(classify(""), ErrorKind::Unknown);
    }

    #[test]
    fn api_error_carries_category_and_message() {
        let error = LambdaError::api("ResourceConflictException", "update in progress");
        assert_eq!(error.kind(), Some(ErrorKind::Conflict));
        assert_eq!(
            error.to_string(),
            "resource-conflict (ResourceConflictException): update in progress"
        );
    }
}
