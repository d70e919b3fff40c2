//! MedRecord patient portal — three-panel terminal interface.
//!
//! Panels:
//! 1. Track Scan — reference lookup, analysis results, PDF report download
//! 2. Resources — quick actions and health tips
//! 3. Help — keyboard shortcuts

use std::env;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use medrecord_core::{DirectorySink, HttpAnalysisService, PortalConfig};
use medrecord_tui::worker::{self, WorkerCommand};
use medrecord_tui::{input, logging, ui, AppState};

/// Overrides the default config file location.
const CONFIG_ENV: &str = "MEDRECORD_CONFIG";

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Config
    let config_path = env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(PortalConfig::default_path);
    let config = PortalConfig::load_or_default(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    logging::init_tracing(&config.log_file())?;
    tracing::info!(
        base_url = %config.base_url,
        config = %config_path.display(),
        "starting portal"
    );

    let service = HttpAnalysisService::new(&config.base_url, config.request_timeout())?;
    let download_dir = config.download_dir();
    let sink = DirectorySink::new(download_dir.clone());

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    // Spawn worker
    let worker_handle =
        worker::spawn_worker(cmd_rx, resp_tx, Arc::new(service), Arc::new(sink))
            .context("spawning worker thread")?;

    let mut app = AppState::new(cmd_tx.clone(), resp_rx, download_dir);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);

    teardown(|| restore_terminal(&mut terminal), &cmd_tx, worker_handle)?;

    result
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Hand the terminal back, then stop the worker. In-flight requests finish
/// before the join returns, so the screen must not wait on them.
fn teardown(
    restore: impl FnOnce() -> Result<()>,
    cmd_tx: &Sender<WorkerCommand>,
    worker_handle: JoinHandle<()>,
) -> Result<()> {
    let restored = restore();
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();
    tracing::info!("portal stopped");
    restored
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_worker_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
