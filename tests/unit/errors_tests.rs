/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;

use posync::errors::{CatalogError, ProviderError};

#[test]
fn test_providerError_requestFailed_shouldDisplayCorrectly() {
    let error = ProviderError::RequestFailed("Connection timeout".to_string());
    let display = format!("{}", error);
    assert!(display.contains("API request failed"));
    assert!(display.contains("Connection timeout"));
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 500,
        message: "Internal error".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("500"));
    assert!(display.contains("Internal error"));
}

#[test]
fn test_providerError_incompleteResponse_shouldListMissingKeys() {
    let error = ProviderError::IncompleteResponse {
        missing: vec!["hello".to_string(), "bye".to_string()],
    };
    let display = error.to_string();
    assert!(display.contains("2 requested key(s)"));
    assert!(display.contains("hello, bye"));
}

#[test]
fn test_providerError_schemaViolation_shouldDisplayCorrectly() {
    let error = ProviderError::SchemaViolation("expected a string for \"bye\"".to_string());
    assert!(error.to_string().starts_with("Response violates batch schema"));
}

#[test]
fn test_providerError_fromStatus_shouldPickVariant() {
    assert!(matches!(
        ProviderError::from_status(401, "bad key"),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(403, "forbidden"),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(429, "slow down"),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(503, "unavailable"),
        ProviderError::ApiError { status_code: 503, .. }
    ));
}

#[test]
fn test_catalogError_notFound_shouldDisplayPath() {
    let error = CatalogError::NotFound(PathBuf::from("po/fr.po"));
    assert_eq!(error.to_string(), "Catalog file not found: po/fr.po");
}

#[test]
fn test_catalogError_write_shouldExposeSource() {
    let error = CatalogError::Write {
        path: PathBuf::from("po/fr.po"),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
    };
    assert!(std::error::Error::source(&error).is_some());
    assert!(error.to_string().contains("read-only"));
}
