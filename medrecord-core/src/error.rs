//! Structured error types for lookup, export, and configuration.
//!
//! The `Display` text of every `LookupError` is the exact message shown to the
//! patient, so front ends render `err.to_string()` without further mapping.

use std::path::PathBuf;

use thiserror::Error;

/// Shown when the reference number is empty or whitespace.
pub const EMPTY_REFERENCE_MESSAGE: &str = "Please enter a reference number";

/// Shown when the reference cannot be addressed as a single URL path segment.
pub const INVALID_REFERENCE_MESSAGE: &str = "Invalid reference number";

/// Shown for a non-success lookup response without a usable `error` field.
pub const LOOKUP_FALLBACK_MESSAGE: &str = "Failed to fetch analysis results";

/// Shown for a transport failure that carries no description.
pub const TRANSPORT_FALLBACK_MESSAGE: &str = "An error occurred";

/// Shown when a success response body is not an analysis record.
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response format from server";

/// Blocking notification shown for any export failure.
pub const EXPORT_FAILED_NOTICE: &str = "Failed to download PDF report. Please try again.";

/// Failures of the lookup operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The reference was empty after trimming. No request was made.
    #[error("{}", EMPTY_REFERENCE_MESSAGE)]
    EmptyReference,

    /// The reference is `.` or `..`, which URL path resolution would remove.
    /// No request was made.
    #[error("{}", INVALID_REFERENCE_MESSAGE)]
    InvalidReference,

    /// The lookup service answered with a non-success status.
    #[error("{message}")]
    Service { status: u16, message: String },

    /// The request failed in transit or the body could not be parsed.
    #[error("{0}")]
    Transport(String),
}

impl LookupError {
    /// Build a service error, falling back to the generic message when the
    /// payload had no usable `error` field.
    pub fn service(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| LOOKUP_FALLBACK_MESSAGE.to_string());
        LookupError::Service { status, message }
    }

    /// Build a transport error from a failure description.
    pub fn transport(description: impl Into<String>) -> Self {
        let description = description.into();
        if description.trim().is_empty() {
            LookupError::Transport(TRANSPORT_FALLBACK_MESSAGE.to_string())
        } else {
            LookupError::Transport(description)
        }
    }
}

/// Failures of the export operation. None of these touch the lookup state.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("report generation failed: HTTP {status}")]
    Service { status: u16 },

    #[error("report request failed: {0}")]
    Transport(String),

    #[error("reference {0:?} cannot be sent as a URL path segment")]
    InvalidReference(String),

    #[error("report generation returned an empty document")]
    EmptyPayload,

    #[error("could not save report to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// The message shown to the patient. Details go to the log.
    pub fn notice(&self) -> &'static str {
        EXPORT_FAILED_NOTICE
    }
}

/// Failures loading the portal configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid base URL '{0}'")]
    BaseUrl(String),

    #[error("cannot build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_exact() {
        assert_eq!(
            LookupError::EmptyReference.to_string(),
            "Please enter a reference number"
        );
    }

    #[test]
    fn service_error_uses_payload_message() {
        let err = LookupError::service(404, Some("Not found".into()));
        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    fn service_error_falls_back_when_missing_or_blank() {
        assert_eq!(
            LookupError::service(500, None).to_string(),
            LOOKUP_FALLBACK_MESSAGE
        );
        assert_eq!(
            LookupError::service(500, Some("  ".into())).to_string(),
            LOOKUP_FALLBACK_MESSAGE
        );
    }

    #[test]
    fn transport_error_falls_back_when_blank() {
        assert_eq!(LookupError::transport("").to_string(), "An error occurred");
        assert_eq!(
            LookupError::transport("connection refused").to_string(),
            "connection refused"
        );
    }

    #[test]
    fn export_notice_is_fixed() {
        let err = ExportError::Service { status: 500 };
        assert_eq!(err.notice(), "Failed to download PDF report. Please try again.");
        assert!(err.to_string().contains("500"));
    }
}
