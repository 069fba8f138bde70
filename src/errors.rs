/*!
 * Error types for the posync application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * - `CatalogError`: structural failures, fatal to a run before scheduling starts
 * - `ProviderError`: per-task failures, absorbed by the executor's retry loop
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The response did not satisfy the batch schema
    #[error("Response violates batch schema: {0}")]
    SchemaViolation(String),

    /// The response omitted keys that the batch requested
    #[error("Response is missing {} requested key(s): {}", .missing.len(), .missing.join(", "))]
    IncompleteResponse {
        /// Requested keys that were absent from the response
        missing: Vec<String>,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching error variant
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Structural errors: a catalog could not be found, read or written
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file does not exist
    #[error("Catalog file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The catalog file exists but could not be parsed
    #[error("Failed to parse catalog {}: {message}", .path.display())]
    Parse {
        /// Path of the offending file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// The catalog could not be written back
    #[error("Failed to write catalog {}: {source}", .path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A catalog referenced by a task is not registered in the run
    #[error("No catalog registered for {0}")]
    Unregistered(String),
}
