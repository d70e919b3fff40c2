//! MedRecord Core — analysis records, lookup panel state machine, service client.
//!
//! This crate contains everything the portal front ends share:
//! - The server-supplied `AnalysisResult` record and its display helpers
//! - The lookup panel state machine (Idle → Loading → Success | Error)
//! - The `AnalysisService` trait and its blocking HTTP implementation
//! - PDF report naming and saving
//! - Portal configuration and static resources

pub mod analysis;
pub mod config;
pub mod error;
pub mod http;
pub mod panel;
pub mod report;
pub mod resources;
pub mod service;

pub use analysis::{AnalysisResult, Finding, NOT_PROVIDED};
pub use config::PortalConfig;
pub use error::{ConfigError, ExportError, LookupError};
pub use http::HttpAnalysisService;
pub use panel::{
    ExportGuard, ExportRequest, ExportStatus, LoadedAnalysis, LookupPanel, LookupState, LookupTicket,
};
pub use report::{report_filename, DirectorySink, ReportSink};
pub use service::AnalysisService;
