//! Background worker thread — all network calls run here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Each command
//! runs on its own short-lived thread so a slow report download never holds up
//! a lookup; the worker joins them all before it exits.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use medrecord_core::{
    AnalysisResult, AnalysisService, ExportRequest, LookupError, LookupTicket, ReportSink,
};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Lookup { ticket: LookupTicket },
    /// The request carries the export guard; it is released when the export ends.
    Export { request: ExportRequest },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    LookupFinished {
        ticket: LookupTicket,
        outcome: Result<AnalysisResult, LookupError>,
    },
    ExportFinished {
        reference: String,
        /// Saved path, or the failure detail for the log and error history.
        outcome: Result<PathBuf, String>,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    service: Arc<dyn AnalysisService>,
    sink: Arc<dyn ReportSink>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("medrecord-worker".into())
        .spawn(move || worker_loop(rx, tx, service, sink))
}

fn worker_loop(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    service: Arc<dyn AnalysisService>,
    sink: Arc<dyn ReportSink>,
) {
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => {
                tasks.retain(|t| !t.is_finished());
                match dispatch(cmd, &tx, &service, &sink) {
                    Ok(Some(handle)) => tasks.push(handle),
                    Ok(None) => {}
                    Err(e) => tracing::error!(error = %e, "failed to spawn task thread"),
                }
            }
        }
    }

    for task in tasks {
        let _ = task.join();
    }
    tracing::debug!("worker stopped");
}

fn dispatch(
    cmd: WorkerCommand,
    tx: &Sender<WorkerResponse>,
    service: &Arc<dyn AnalysisService>,
    sink: &Arc<dyn ReportSink>,
) -> std::io::Result<Option<JoinHandle<()>>> {
    let tx = tx.clone();
    let service = Arc::clone(service);
    match cmd {
        WorkerCommand::Lookup { ticket } => thread::Builder::new()
            .name("medrecord-lookup".into())
            .spawn(move || handle_lookup(ticket, &tx, service.as_ref()))
            .map(Some),
        WorkerCommand::Export { request } => {
            let sink = Arc::clone(sink);
            thread::Builder::new()
                .name("medrecord-export".into())
                .spawn(move || handle_export(request, &tx, service.as_ref(), sink.as_ref()))
                .map(Some)
        }
        WorkerCommand::Shutdown => Ok(None), // handled in loop
    }
}

fn handle_lookup(ticket: LookupTicket, tx: &Sender<WorkerResponse>, service: &dyn AnalysisService) {
    let outcome = service.fetch_analysis(&ticket.reference);
    let _ = tx.send(WorkerResponse::LookupFinished { ticket, outcome });
}

fn handle_export(
    request: ExportRequest,
    tx: &Sender<WorkerResponse>,
    service: &dyn AnalysisService,
    sink: &dyn ReportSink,
) {
    let reference = request.reference.clone();
    // `run` drops the guard before returning, so the flag is already clear
    // when the TUI sees the response.
    let outcome = request.run(service, sink).map_err(|e| e.to_string());
    let _ = tx.send(WorkerResponse::ExportFinished { reference, outcome });
}
