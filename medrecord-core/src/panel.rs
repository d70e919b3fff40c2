//! Lookup panel state machine.
//!
//! ```text
//!            begin_lookup("")          begin_lookup("REF")
//!   Idle ─────────────────────► Error ◄──────┐
//!    │                                       │ complete_lookup(Err)
//!    │ begin_lookup("REF")                   │
//!    └──────────────────────► Loading ───────┴──► Success
//!                                 complete_lookup(Ok)
//! ```
//!
//! Lookups are split into `begin_lookup` (synchronous state change, returns a
//! ticket) and `complete_lookup` (applies the outcome) so a front end can run
//! the network call on another thread. Every `begin_lookup` supersedes the
//! previous ticket; completions for superseded tickets are dropped.
//!
//! Export is independent of the lookup state. It only reads the loaded
//! analysis and owns a separate in-progress flag through an `ExportGuard`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::analysis::AnalysisResult;
use crate::error::{ExportError, LookupError};
use crate::report::{save_report, ReportSink};
use crate::service::AnalysisService;

/// A successful lookup together with the reference it was fetched by.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAnalysis {
    pub reference: String,
    pub result: AnalysisResult,
}

/// Lookup state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Loading { reference: String },
    Success(LoadedAnalysis),
    Error(LookupError),
}

/// One issued lookup: the trimmed reference and its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub seq: u64,
    pub reference: String,
}

/// Holds the export-in-progress flag. Dropping it clears the flag.
#[derive(Debug)]
pub struct ExportGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Read-only view of the export flag, shareable across threads.
#[derive(Debug, Clone)]
pub struct ExportStatus {
    flag: Arc<AtomicBool>,
}

impl ExportStatus {
    pub fn is_active(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// An export that has been started and must be run to completion.
#[derive(Debug)]
pub struct ExportRequest {
    pub reference: String,
    pub guard: ExportGuard,
}

impl ExportRequest {
    /// Generate the report and save it. The flag is released when this returns,
    /// whatever the outcome.
    pub fn run(
        self,
        service: &dyn AnalysisService,
        sink: &dyn ReportSink,
    ) -> Result<PathBuf, ExportError> {
        let ExportRequest { reference, guard } = self;
        tracing::info!(reference = %reference, service = service.name(), "export started");

        let outcome = service
            .generate_report(&reference)
            .and_then(|bytes| save_report(sink, &reference, &bytes));

        match &outcome {
            Ok(path) => tracing::info!(reference = %reference, path = %path.display(), "report saved"),
            Err(e) => tracing::warn!(reference = %reference, error = %e, "export failed"),
        }
        drop(guard);
        outcome
    }
}

/// The lookup panel: lookup state plus the independent export flag.
#[derive(Debug, Default)]
pub struct LookupPanel {
    state: LookupState,
    seq: u64,
    exporting: Arc<AtomicBool>,
}

impl LookupPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn loaded(&self) -> Option<&LoadedAnalysis> {
        match &self.state {
            LookupState::Success(loaded) => Some(loaded),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.loaded().map(|l| &l.result)
    }

    pub fn error(&self) -> Option<&LookupError> {
        match &self.state {
            LookupState::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LookupState::Loading { .. })
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    pub fn export_status(&self) -> ExportStatus {
        ExportStatus {
            flag: Arc::clone(&self.exporting),
        }
    }

    /// Start a lookup for `input`.
    ///
    /// Blank input moves to the validation error and returns `None`; no request
    /// must be made. Otherwise the previous result and error are cleared, the
    /// panel is `Loading`, and the returned ticket names the trimmed reference.
    pub fn begin_lookup(&mut self, input: &str) -> Option<LookupTicket> {
        self.seq += 1;
        let reference = input.trim();
        if reference.is_empty() {
            self.state = LookupState::Error(LookupError::EmptyReference);
            return None;
        }
        self.state = LookupState::Loading {
            reference: reference.to_string(),
        };
        tracing::info!(reference, seq = self.seq, "lookup started");
        Some(LookupTicket {
            seq: self.seq,
            reference: reference.to_string(),
        })
    }

    /// Apply the outcome of `ticket`. Returns `false` if the ticket was
    /// superseded and the outcome was dropped.
    pub fn complete_lookup(
        &mut self,
        ticket: &LookupTicket,
        outcome: Result<AnalysisResult, LookupError>,
    ) -> bool {
        if ticket.seq != self.seq {
            tracing::debug!(
                reference = %ticket.reference,
                seq = ticket.seq,
                current = self.seq,
                "dropping superseded lookup result"
            );
            return false;
        }
        self.state = match outcome {
            Ok(result) => {
                tracing::info!(reference = %ticket.reference, finding = %result.analysis_result, "lookup succeeded");
                LookupState::Success(LoadedAnalysis {
                    reference: ticket.reference.clone(),
                    result,
                })
            }
            Err(e) => {
                tracing::warn!(reference = %ticket.reference, error = %e, "lookup failed");
                LookupState::Error(e)
            }
        };
        true
    }

    /// Run a whole lookup on the calling thread.
    pub fn submit_lookup(&mut self, input: &str, service: &dyn AnalysisService) -> &LookupState {
        if let Some(ticket) = self.begin_lookup(input) {
            let outcome = service.fetch_analysis(&ticket.reference);
            self.complete_lookup(&ticket, outcome);
        }
        &self.state
    }

    /// Start an export of the loaded analysis.
    ///
    /// Returns `None` when nothing is loaded or an export is already running.
    pub fn begin_export(&self) -> Option<ExportRequest> {
        let reference = self.loaded()?.reference.clone();
        self.exporting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(ExportRequest {
            reference,
            guard: ExportGuard {
                flag: Arc::clone(&self.exporting),
            },
        })
    }

    /// Run a whole export on the calling thread. `None` means export was not
    /// available (see `begin_export`).
    pub fn export_document(
        &self,
        service: &dyn AnalysisService,
        sink: &dyn ReportSink,
    ) -> Option<Result<PathBuf, ExportError>> {
        self.begin_export().map(|request| request.run(service, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures;
    use crate::error::EMPTY_REFERENCE_MESSAGE;
    use crate::report::DirectorySink;
    use proptest::prelude::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// In-memory service with scripted responses.
    #[derive(Default)]
    struct ScriptedService {
        lookups: AtomicUsize,
        lookup_refs: Mutex<Vec<String>>,
        lookup_error: Option<LookupError>,
        report: Option<Vec<u8>>,
        /// Export flag as seen from inside `generate_report`.
        observed_flag: Mutex<Option<bool>>,
        status: Option<ExportStatus>,
    }

    impl AnalysisService for ScriptedService {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch_analysis(&self, reference: &str) -> Result<AnalysisResult, LookupError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.lookup_refs.lock().unwrap().push(reference.to_string());
            match &self.lookup_error {
                Some(e) => Err(e.clone()),
                None => Ok(fixtures::normal(reference)),
            }
        }

        fn generate_report(&self, _reference: &str) -> Result<Vec<u8>, ExportError> {
            if let Some(status) = &self.status {
                *self.observed_flag.lock().unwrap() = Some(status.is_active());
            }
            self.report
                .clone()
                .ok_or(ExportError::Service { status: 500 })
        }
    }

    fn loaded_panel(service: &ScriptedService) -> LookupPanel {
        let mut panel = LookupPanel::new();
        panel.submit_lookup("REF123", service);
        assert!(panel.loaded().is_some());
        panel
    }

    #[test]
    fn starts_idle() {
        let panel = LookupPanel::new();
        assert_eq!(panel.state(), &LookupState::Idle);
        assert!(!panel.is_loading());
        assert!(!panel.is_exporting());
    }

    #[test]
    fn successful_lookup_shows_result() {
        let service = ScriptedService::default();
        let mut panel = LookupPanel::new();
        panel.submit_lookup("REF123", &service);

        let loaded = panel.loaded().unwrap();
        assert_eq!(loaded.reference, "REF123");
        assert_eq!(loaded.result, fixtures::normal("REF123"));
        assert_eq!(loaded.result.analysis_result, "Normal");
        assert_eq!(loaded.result.confidence_label(), "Confidence: 97.0%");
    }

    #[test]
    fn lookup_uses_trimmed_reference() {
        let service = ScriptedService::default();
        let mut panel = LookupPanel::new();
        panel.submit_lookup("  REF123\t", &service);
        assert_eq!(*service.lookup_refs.lock().unwrap(), vec!["REF123".to_string()]);
        assert_eq!(panel.loaded().unwrap().reference, "REF123");
    }

    #[test]
    fn empty_input_never_calls_service() {
        let service = ScriptedService::default();
        let mut panel = LookupPanel::new();
        panel.submit_lookup("", &service);
        assert_eq!(service.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(panel.error().unwrap().to_string(), EMPTY_REFERENCE_MESSAGE);
    }

    #[test]
    fn service_error_message_is_shown() {
        let service = ScriptedService {
            lookup_error: Some(LookupError::service(404, Some("Not found".into()))),
            ..Default::default()
        };
        let mut panel = LookupPanel::new();
        panel.submit_lookup("BADREF", &service);
        assert_eq!(panel.error().unwrap().to_string(), "Not found");
        assert!(panel.result().is_none());
    }

    #[test]
    fn begin_lookup_clears_previous_result() {
        let service = ScriptedService::default();
        let mut panel = loaded_panel(&service);

        let ticket = panel.begin_lookup("REF999").unwrap();
        assert!(panel.result().is_none());
        assert!(panel.error().is_none());
        assert_eq!(
            panel.state(),
            &LookupState::Loading {
                reference: "REF999".into()
            }
        );
        assert_eq!(ticket.reference, "REF999");
    }

    #[test]
    fn begin_lookup_clears_previous_error() {
        let mut panel = LookupPanel::new();
        assert!(panel.begin_lookup("   ").is_none());
        assert!(panel.error().is_some());
        panel.begin_lookup("REF1").unwrap();
        assert!(panel.error().is_none());
        assert!(panel.is_loading());
    }

    #[test]
    fn repeated_lookup_refetches() {
        let service = ScriptedService::default();
        let mut panel = LookupPanel::new();
        panel.submit_lookup("REF123", &service);
        panel.submit_lookup("REF123", &service);
        assert_eq!(service.lookups.load(Ordering::SeqCst), 2);
        assert!(panel.loaded().is_some());
    }

    #[test]
    fn superseded_completion_is_dropped() {
        let mut panel = LookupPanel::new();
        let first = panel.begin_lookup("OLD").unwrap();
        let second = panel.begin_lookup("NEW").unwrap();

        // The newer request resolves first.
        assert!(panel.complete_lookup(&second, Ok(fixtures::normal("NEW"))));
        // The stale response arrives late and must not overwrite it.
        assert!(!panel.complete_lookup(&first, Ok(fixtures::pneumonia("OLD"))));

        assert_eq!(panel.loaded().unwrap().reference, "NEW");
        assert!(panel.result().unwrap().is_normal());
    }

    #[test]
    fn validation_error_supersedes_in_flight_lookup() {
        let mut panel = LookupPanel::new();
        let ticket = panel.begin_lookup("REF1").unwrap();
        assert!(panel.begin_lookup("").is_none());
        assert!(!panel.complete_lookup(&ticket, Ok(fixtures::normal("REF1"))));
        assert_eq!(panel.error(), Some(&LookupError::EmptyReference));
    }

    #[test]
    fn export_without_result_is_noop() {
        let service = ScriptedService {
            report: Some(b"%PDF".to_vec()),
            ..Default::default()
        };
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path());

        let mut panel = LookupPanel::new();
        assert!(panel.export_document(&service, &sink).is_none());

        panel.begin_lookup("REF1");
        assert!(panel.begin_export().is_none(), "no export while loading");

        panel.submit_lookup("", &service);
        assert!(panel.begin_export().is_none(), "no export in error state");
        assert!(!panel.is_exporting());
    }

    #[test]
    fn export_saves_under_reference_filename() {
        let service = ScriptedService {
            report: Some(b"%PDF-1.7 report".to_vec()),
            ..Default::default()
        };
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path());
        let panel = loaded_panel(&service);

        let path = panel.export_document(&service, &sink).unwrap().unwrap();
        assert_eq!(path, tmp.path().join("xray-analysis-REF123.pdf"));
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.7 report");
    }

    #[test]
    fn export_flag_is_set_only_during_successful_export() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path());
        let mut service = ScriptedService {
            report: Some(b"%PDF".to_vec()),
            ..Default::default()
        };
        let mut panel = LookupPanel::new();
        panel.submit_lookup("REF123", &service);
        service.status = Some(panel.export_status());

        assert!(!panel.is_exporting());
        assert!(panel.export_document(&service, &sink).unwrap().is_ok());
        assert_eq!(*service.observed_flag.lock().unwrap(), Some(true));
        assert!(!panel.is_exporting());
    }

    #[test]
    fn export_flag_is_released_on_failure_and_result_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path());
        let mut service = ScriptedService::default(); // report: None -> HTTP 500
        let mut panel = LookupPanel::new();
        panel.submit_lookup("REF123", &service);
        service.status = Some(panel.export_status());
        let before = panel.state().clone();

        let err = panel.export_document(&service, &sink).unwrap().unwrap_err();
        assert_eq!(err.notice(), "Failed to download PDF report. Please try again.");
        assert_eq!(*service.observed_flag.lock().unwrap(), Some(true));
        assert!(!panel.is_exporting());
        assert_eq!(panel.state(), &before);
    }

    #[test]
    fn second_export_refused_while_first_runs() {
        let service = ScriptedService::default();
        let panel = loaded_panel(&service);

        let first = panel.begin_export().unwrap();
        assert!(panel.is_exporting());
        assert!(panel.begin_export().is_none());

        drop(first);
        assert!(!panel.is_exporting());
        assert!(panel.begin_export().is_some());
    }

    #[test]
    fn export_uses_reference_from_loaded_result() {
        let service = ScriptedService::default();
        let mut panel = loaded_panel(&service);
        let request = panel.begin_export().unwrap();
        // A new lookup after export started does not change the export target.
        panel.begin_lookup("OTHER");
        assert_eq!(request.reference, "REF123");
    }

    #[test]
    fn export_guard_released_when_worker_thread_panics() {
        let service = ScriptedService::default();
        let panel = loaded_panel(&service);
        let request = panel.begin_export().unwrap();

        let handle = std::thread::spawn(move || {
            let _held = request;
            panic!("worker died");
        });
        assert!(handle.join().is_err());
        assert!(!panel.is_exporting());
    }

    proptest! {
        /// Whitespace-only input never reaches the service.
        #[test]
        fn blank_input_is_validation_error(input in "[ \t\r\n]{0,16}") {
            let service = ScriptedService::default();
            let mut panel = LookupPanel::new();
            panel.submit_lookup(&input, &service);
            prop_assert_eq!(service.lookups.load(Ordering::SeqCst), 0);
            prop_assert_eq!(panel.error(), Some(&LookupError::EmptyReference));
        }

        /// Any non-blank input reaches the service exactly once, trimmed.
        #[test]
        fn non_blank_input_is_looked_up_trimmed(
            pad in "[ \t]{0,3}",
            reference in "[A-Za-z0-9-]{1,12}",
        ) {
            let service = ScriptedService::default();
            let mut panel = LookupPanel::new();
            panel.submit_lookup(&format!("{pad}{reference}{pad}"), &service);
            prop_assert_eq!(service.lookups.load(Ordering::SeqCst), 1);
            prop_assert_eq!(&panel.loaded().unwrap().reference, &reference);
        }
    }
}
