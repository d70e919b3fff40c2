//! Application state — single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDateTime;

use medrecord_core::resources::{HEALTH_TIPS, QUICK_ACTIONS};
use medrecord_core::{LookupError, LookupPanel};

use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Lookup,
    Resources,
    Help,
}

impl Panel {
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        match self {
            Panel::Lookup => 0,
            Panel::Resources => 1,
            Panel::Help => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Lookup),
            1 => Some(Panel::Resources),
            2 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Lookup => "Track Scan",
            Panel::Resources => "Resources",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % Self::COUNT).unwrap_or(Panel::Lookup)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + Self::COUNT - 1) % Self::COUNT).unwrap_or(Panel::Lookup)
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Service,
    Network,
    Export,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "VAL",
            ErrorCategory::Service => "SVC",
            ErrorCategory::Network => "NET",
            ErrorCategory::Export => "PDF",
        }
    }

    pub fn of_lookup(err: &LookupError) -> Self {
        match err {
            LookupError::EmptyReference | LookupError::InvalidReference => {
                ErrorCategory::Validation
            }
            LookupError::Service { .. } => ErrorCategory::Service,
            LookupError::Transport(_) => ErrorCategory::Network,
        }
    }
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    ErrorHistory,
    /// Blocking notification; must be dismissed.
    Notice(String),
}

/// Reference input on the lookup panel.
#[derive(Debug, Clone)]
pub struct ReferenceInput {
    pub text: String,
    /// When true, printable keys edit the text instead of triggering shortcuts.
    pub editing: bool,
}

impl Default for ReferenceInput {
    fn default() -> Self {
        Self {
            text: String::new(),
            editing: true,
        }
    }
}

/// Resources panel cursor over quick actions followed by health tips.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourcesCursor {
    pub row: usize,
}

impl ResourcesCursor {
    pub fn row_count() -> usize {
        QUICK_ACTIONS.len() + HEALTH_TIPS.len()
    }

    /// Title and text of the selected card.
    pub fn selected(&self) -> (&'static str, &'static str) {
        if self.row < QUICK_ACTIONS.len() {
            let a = &QUICK_ACTIONS[self.row];
            (a.title, a.description)
        } else {
            let t = &HEALTH_TIPS[(self.row - QUICK_ACTIONS.len()).min(HEALTH_TIPS.len() - 1)];
            (t.title, t.summary)
        }
    }
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // Panel states
    pub lookup: LookupPanel,
    pub input: ReferenceInput,
    pub resources: ResourcesCursor,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,

    // Paths
    pub download_dir: PathBuf,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            active_panel: Panel::Lookup,
            running: true,
            lookup: LookupPanel::new(),
            input: ReferenceInput::default(),
            resources: ResourcesCursor::default(),
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            download_dir,
        }
    }

    /// Submit the current input as a lookup.
    pub fn submit_lookup(&mut self) {
        if self.lookup.is_loading() {
            return;
        }
        match self.lookup.begin_lookup(&self.input.text) {
            None => {
                if let Some(err) = self.lookup.error().cloned() {
                    self.push_error(ErrorCategory::Validation, err.to_string(), String::new());
                }
            }
            Some(ticket) => {
                let reference = ticket.reference.clone();
                if let Err(e) = self.worker_tx.send(WorkerCommand::Lookup { ticket }) {
                    if let WorkerCommand::Lookup { ticket } = e.0 {
                        let err = LookupError::transport("background worker is not running");
                        self.lookup.complete_lookup(&ticket, Err(err.clone()));
                        self.push_error(ErrorCategory::Network, err.to_string(), reference);
                    }
                    return;
                }
                self.set_status(format!("Searching for {reference}..."));
            }
        }
    }

    /// Start downloading the PDF report for the loaded analysis.
    pub fn request_export(&mut self) {
        let Some(request) = self.lookup.begin_export() else {
            if self.lookup.is_exporting() {
                self.set_warning("The report is already being generated");
            } else {
                self.set_warning("Look up an analysis before downloading its report");
            }
            return;
        };
        let reference = request.reference.clone();
        // On send failure the request, and with it the export guard, is dropped.
        if self.worker_tx.send(WorkerCommand::Export { request }).is_err() {
            self.export_failed(reference, "background worker is not running".into());
            return;
        }
        self.set_status("Generating PDF report...");
    }

    /// Apply a worker response.
    pub fn handle_worker_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::LookupFinished { ticket, outcome } => {
                let failure = outcome.as_ref().err().cloned();
                if !self.lookup.complete_lookup(&ticket, outcome) {
                    return;
                }
                match failure {
                    None => self.set_status(format!("Analysis {} loaded", ticket.reference)),
                    Some(err) => {
                        self.push_error(ErrorCategory::of_lookup(&err), err.to_string(), ticket.reference)
                    }
                }
            }
            WorkerResponse::ExportFinished { reference, outcome } => match outcome {
                Ok(path) => self.set_status(format!("Report saved to {}", path.display())),
                Err(detail) => self.export_failed(reference, detail),
            },
        }
    }

    fn export_failed(&mut self, reference: String, detail: String) {
        let notice = medrecord_core::error::EXPORT_FAILED_NOTICE.to_string();
        self.push_error(ErrorCategory::Export, detail, reference);
        self.status_message = Some((notice.clone(), StatusLevel::Error));
        self.overlay = Overlay::Notice(notice);
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrecord_core::AnalysisResult;
    use std::sync::mpsc;

    fn app() -> (AppState, Receiver<WorkerCommand>) {
        let (tx, cmd_rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        (AppState::new(tx, resp_rx, PathBuf::from(".")), cmd_rx)
    }

    fn record(reference: &str) -> AnalysisResult {
        AnalysisResult {
            id: "1".into(),
            reference_number: reference.into(),
            image_url: "https://images.example.org/1.png".into(),
            analysis_result: "Normal".into(),
            confidence_score: 0.97,
            created_at: "2024-01-01T00:00:00Z".into(),
            doctor_name: "Dr. Test".into(),
            pneumonia_type: None,
            severity: None,
            recommended_action: None,
            patient_name: None,
        }
    }

    #[test]
    fn panel_cycle() {
        assert_eq!(Panel::Lookup.next(), Panel::Resources);
        assert_eq!(Panel::Help.next(), Panel::Lookup);
        assert_eq!(Panel::Lookup.prev(), Panel::Help);
        assert_eq!(Panel::Resources.prev(), Panel::Lookup);
    }

    #[test]
    fn panel_from_index() {
        for i in 0..Panel::COUNT {
            let p = Panel::from_index(i).unwrap();
            assert_eq!(p.index(), i);
        }
        assert!(Panel::from_index(Panel::COUNT).is_none());
    }

    #[test]
    fn error_history_caps_at_50() {
        let (mut app, _rx) = app();
        for i in 0..60 {
            app.push_error(ErrorCategory::Network, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), 50);
        assert!(app.error_history[0].message.contains("59"));
    }

    #[test]
    fn empty_submit_sends_nothing() {
        let (mut app, cmd_rx) = app();
        app.input.text = "   ".into();
        app.submit_lookup();
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(
            app.lookup.error().unwrap().to_string(),
            "Please enter a reference number"
        );
        assert_eq!(app.error_history[0].category, ErrorCategory::Validation);
    }

    #[test]
    fn submit_sends_trimmed_ticket() {
        let (mut app, cmd_rx) = app();
        app.input.text = " REF123 ".into();
        app.submit_lookup();
        match cmd_rx.try_recv().unwrap() {
            WorkerCommand::Lookup { ticket } => assert_eq!(ticket.reference, "REF123"),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(app.lookup.is_loading());
    }

    #[test]
    fn submit_ignored_while_loading() {
        let (mut app, cmd_rx) = app();
        app.input.text = "REF1".into();
        app.submit_lookup();
        app.submit_lookup();
        assert!(cmd_rx.try_recv().is_ok());
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn lookup_error_categories() {
        assert_eq!(ErrorCategory::of_lookup(&LookupError::EmptyReference).label(), "VAL");
        assert_eq!(ErrorCategory::of_lookup(&LookupError::InvalidReference).label(), "VAL");
        assert_eq!(ErrorCategory::of_lookup(&LookupError::service(404, None)).label(), "SVC");
        assert_eq!(ErrorCategory::of_lookup(&LookupError::transport("reset")).label(), "NET");
    }

    #[test]
    fn lookup_failure_goes_to_history() {
        let (mut app, cmd_rx) = app();
        app.input.text = "BADREF".into();
        app.submit_lookup();
        let WorkerCommand::Lookup { ticket } = cmd_rx.try_recv().unwrap() else {
            panic!("expected lookup");
        };
        app.handle_worker_response(WorkerResponse::LookupFinished {
            ticket,
            outcome: Err(LookupError::service(404, Some("Not found".into()))),
        });
        assert_eq!(app.lookup.error().unwrap().to_string(), "Not found");
        assert_eq!(app.error_history[0].category, ErrorCategory::Service);
        assert_eq!(app.error_history[0].context, "BADREF");
    }

    #[test]
    fn export_without_result_warns() {
        let (mut app, cmd_rx) = app();
        app.request_export();
        assert!(cmd_rx.try_recv().is_err());
        assert!(matches!(app.status_message, Some((_, StatusLevel::Warning))));
    }

    #[test]
    fn export_failure_opens_notice_and_keeps_result() {
        let (mut app, cmd_rx) = app();
        app.input.text = "REF123".into();
        app.submit_lookup();
        let WorkerCommand::Lookup { ticket } = cmd_rx.try_recv().unwrap() else {
            panic!("expected lookup");
        };
        app.handle_worker_response(WorkerResponse::LookupFinished {
            ticket,
            outcome: Ok(record("REF123")),
        });

        app.request_export();
        assert!(app.lookup.is_exporting());
        let WorkerCommand::Export { request } = cmd_rx.try_recv().unwrap() else {
            panic!("expected export");
        };
        assert_eq!(request.reference, "REF123");
        drop(request);
        app.handle_worker_response(WorkerResponse::ExportFinished {
            reference: "REF123".into(),
            outcome: Err("report generation failed: HTTP 500".into()),
        });

        assert_eq!(
            app.overlay,
            Overlay::Notice("Failed to download PDF report. Please try again.".into())
        );
        assert!(!app.lookup.is_exporting());
        assert_eq!(app.lookup.loaded().unwrap().reference, "REF123");
        assert_eq!(app.error_history[0].category, ErrorCategory::Export);
    }

    #[test]
    fn dead_worker_fails_lookup() {
        let (mut app, cmd_rx) = app();
        drop(cmd_rx);
        app.input.text = "REF1".into();
        app.submit_lookup();
        assert!(matches!(app.lookup.error(), Some(LookupError::Transport(_))));
        assert!(!app.lookup.is_loading());
    }

    #[test]
    fn resources_cursor_covers_actions_then_tips() {
        let mut cursor = ResourcesCursor::default();
        assert_eq!(cursor.selected().0, "Schedule Appointment");
        cursor.row = QUICK_ACTIONS.len();
        assert_eq!(cursor.selected().0, "Understanding Your X-Ray Results");
        assert_eq!(ResourcesCursor::row_count(), 5);
    }
}
