//! Error types for the Nutanix provider

use thiserror::Error;

/// Result type alias using the provider Error
pub type Result<T> = std::result::Result<T, Error>;

/// Provider error types
#[derive(Error, Debug)]
pub enum Error {
    /// A required attribute is missing or a value is malformed
    #[error("{0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Prism returned a non-success status
    #[error("Nutanix API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Resource not found: {kind} with id {id}")]
    NotFound { kind: String, id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Writing a value into resource state failed
    #[error("State error: {0}")]
    State(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Provider not configured")]
    NotConfigured,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::Api { status: 409, message: "conflict".into() };
        assert_eq!(err.to_string(), "Nutanix API error (409): conflict");

        let err = Error::Validation("Please provide the required attribute name".into());
        assert_eq!(err.to_string(), "Please provide the required attribute name");
    }
}
