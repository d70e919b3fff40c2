//! Analysis service trait and response classification.
//!
//! The `AnalysisService` trait abstracts over the lookup and report endpoints so
//! the panel can be driven by the HTTP client in production and by in-memory
//! services in tests. Classification of raw responses lives in plain functions
//! here so every transport shares the same rules.

use serde_json::Value;

use crate::analysis::AnalysisResult;
use crate::error::{ExportError, LookupError, INVALID_RESPONSE_MESSAGE};

/// The external analysis and report-generation services.
pub trait AnalysisService: Send + Sync {
    /// Human-readable name of this service (for logs).
    fn name(&self) -> &str;

    /// `GET /api/analysis/{reference}`.
    fn fetch_analysis(&self, reference: &str) -> Result<AnalysisResult, LookupError>;

    /// `POST /api/analysis/{reference}`; returns the PDF bytes.
    fn generate_report(&self, reference: &str) -> Result<Vec<u8>, ExportError>;
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Classify a lookup response.
///
/// - 2xx with an analysis record → `Ok`
/// - 2xx with anything else → `Transport("Invalid response format from server")`
/// - non-2xx → `Service` carrying the payload's `error` string, or the fallback
pub fn interpret_lookup_response(status: u16, body: &[u8]) -> Result<AnalysisResult, LookupError> {
    if is_success(status) {
        return serde_json::from_slice::<AnalysisResult>(body).map_err(|e| {
            tracing::debug!(status, error = %e, "lookup body is not an analysis record");
            LookupError::transport(INVALID_RESPONSE_MESSAGE)
        });
    }
    Err(LookupError::service(status, error_field(body)))
}

/// Extract the `error` string from a JSON error payload, if there is one.
pub fn error_field(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

/// Classify a report-generation response.
pub fn interpret_report_response(status: u16, body: Vec<u8>) -> Result<Vec<u8>, ExportError> {
    if !is_success(status) {
        return Err(ExportError::Service { status });
    }
    if body.is_empty() {
        return Err(ExportError::EmptyPayload);
    }
    Ok(body)
}
