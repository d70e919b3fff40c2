//! Blocking HTTP implementation of the analysis service.
//!
//! Talks to `{base_url}/api/analysis/{reference}`: `GET` for the analysis record
//! and `POST` for the PDF report. Requests are not retried.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;

use crate::analysis::AnalysisResult;
use crate::error::{ConfigError, ExportError, LookupError};
use crate::service::{interpret_lookup_response, interpret_report_response, AnalysisService};

/// Analysis service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAnalysisService {
    client: Client,
    base_url: Url,
}

impl HttpAnalysisService {
    /// Build a client for `base_url`. `timeout` of `None` keeps the transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;

        let mut builder = Client::builder().user_agent(concat!(
            "medrecord-portal/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/analysis/{reference}` with the reference percent-encoded as
    /// a single path segment.
    ///
    /// `None` for `.` and `..`: they are dot segments whether encoded or not,
    /// and would resolve to a different path.
    pub fn endpoint(&self, reference: &str) -> Option<Url> {
        if matches!(reference, "." | "..") {
            return None;
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["api", "analysis", reference]);
        Some(url)
    }
}

/// Parse and check a service base URL.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::BaseUrl(raw.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::BaseUrl(raw.to_string()));
    }
    Ok(url)
}

impl AnalysisService for HttpAnalysisService {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch_analysis(&self, reference: &str) -> Result<AnalysisResult, LookupError> {
        let url = self
            .endpoint(reference)
            .ok_or(LookupError::InvalidReference)?;
        tracing::debug!(%url, "requesting analysis");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| LookupError::transport(e.to_string()))?;

        let status = resp.status().as_u16();
        tracing::debug!(reference, status, headers = ?resp.headers(), "analysis response");

        let body = resp
            .bytes()
            .map_err(|e| LookupError::transport(e.to_string()))?;
        tracing::debug!(reference, status, bytes = body.len(), "analysis body received");

        interpret_lookup_response(status, &body)
    }

    fn generate_report(&self, reference: &str) -> Result<Vec<u8>, ExportError> {
        let url = self
            .endpoint(reference)
            .ok_or_else(|| ExportError::InvalidReference(reference.to_string()))?;
        tracing::debug!(%url, "requesting report");

        let resp = self
            .client
            .post(url)
            .send()
            .map_err(|e| ExportError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        tracing::debug!(reference, status, headers = ?resp.headers(), "report response");

        let body = resp
            .bytes()
            .map_err(|e| ExportError::Transport(e.to_string()))?;

        interpret_report_response(status, body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(base: &str) -> HttpAnalysisService {
        HttpAnalysisService::new(base, None).unwrap()
    }

    #[test]
    fn endpoint_appends_api_path() {
        let s = service("http://localhost:3000");
        assert_eq!(
            s.endpoint("REF123").unwrap().as_str(),
            "http://localhost:3000/api/analysis/REF123"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let s = service("https://portal.example.org/medrecord/");
        assert_eq!(
            s.endpoint("REF123").unwrap().as_str(),
            "https://portal.example.org/medrecord/api/analysis/REF123"
        );
    }

    #[test]
    fn endpoint_encodes_reference_as_one_segment() {
        let s = service("http://localhost:3000");
        let url = s.endpoint("A/B ?1").unwrap();
        assert_eq!(url.path(), "/api/analysis/A%2FB%20%3F1");
        assert!(url.query().is_none());
    }

    #[test]
    fn dot_references_have_no_endpoint() {
        let s = service("http://localhost:3000");
        assert!(s.endpoint(".").is_none());
        assert!(s.endpoint("..").is_none());
        assert_eq!(
            s.endpoint("...").unwrap().path(),
            "/api/analysis/..."
        );
        assert_eq!(s.endpoint("..A").unwrap().path(), "/api/analysis/..A");
    }

    #[test]
    fn dot_references_fail_without_a_request() {
        // Nothing listens on port 9; reaching the network would be a transport error.
        let s = service("http://127.0.0.1:9");
        assert_eq!(s.fetch_analysis(".."), Err(LookupError::InvalidReference));
        assert_eq!(
            s.fetch_analysis("..").unwrap_err().to_string(),
            "Invalid reference number"
        );
        assert!(matches!(
            s.generate_report("."),
            Err(ExportError::InvalidReference(r)) if r == "."
        ));
    }

    #[test]
    fn rejects_unusable_base_urls() {
        for bad in ["", "localhost:3000", "mailto:x@example.org", "ftp://example.org"] {
            assert!(
                matches!(HttpAnalysisService::new(bad, None), Err(ConfigError::BaseUrl(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        // Port 9 (discard) on loopback is closed on test machines.
        let s = HttpAnalysisService::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
        match s.fetch_analysis("REF123") {
            Err(LookupError::Transport(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected transport error, got {other:?}"),
        }
        assert!(matches!(
            s.generate_report("REF123"),
            Err(ExportError::Transport(_))
        ));
    }
}
