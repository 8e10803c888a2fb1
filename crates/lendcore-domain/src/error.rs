//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the lendcore platform
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// A command failed domain validation
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the validation failure
        message: String,
    },

    /// A loan lifecycle transition that the state machine forbids
    #[error("Invalid lifecycle transition: {from} on {event}")]
    LifecycleTransition {
        /// Status the loan was in
        from: String,
        /// Event that was applied
        event: String,
    },

    /// Accounting operation error
    #[error("Accounting error: {message}")]
    Accounting {
        /// Description of the accounting error
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl Error {
    /// Create a not-found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an accounting error
    pub fn accounting(message: impl Into<String>) -> Self {
        Self::Accounting {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_produce_matching_variants() {
        assert!(matches!(Error::not_found("loan 7"), Error::NotFound { .. }));
        assert!(matches!(
            Error::validation("principal must be positive"),
            Error::Validation { .. }
        ));
    }

    #[test]
    fn display_includes_context() {
        let err = Error::not_found("loan 7");
        assert_eq!(err.to_string(), "Not found: loan 7");
    }
}
