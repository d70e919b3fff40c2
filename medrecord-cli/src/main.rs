//! MedRecord CLI — look up X-ray analyses and download their PDF reports.
//!
//! Commands:
//! - `lookup` — fetch an analysis by reference number and print it
//! - `export` — fetch an analysis, then save its PDF report

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use medrecord_core::{
    AnalysisResult, DirectorySink, HttpAnalysisService, LookupPanel, LookupState, PortalConfig,
};

#[derive(Parser)]
#[command(
    name = "medrecord",
    version,
    about = "MedRecord CLI — X-ray analysis lookup and report download"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to <config_dir>/medrecord/portal.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Analysis service base URL; overrides the config file.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up an analysis by reference number.
    Lookup {
        /// Reference number provided by the doctor.
        reference: String,

        /// Print the raw analysis record as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Look up an analysis and save its PDF report.
    Export {
        /// Reference number provided by the doctor.
        reference: String,

        /// Directory for the report. Defaults to the configured download directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = load_config(cli.config.as_ref(), cli.base_url)?;
    let service = HttpAnalysisService::new(&config.base_url, config.request_timeout())?;
    tracing::debug!(base_url = %service.base_url(), "using analysis service");

    match cli.command {
        Commands::Lookup { reference, json } => {
            let mut panel = LookupPanel::new();
            let result = lookup(&mut panel, &reference, &service)?;
            if json {
                println!("{}", serde_json::to_string_pretty(result)?);
            } else {
                print!("{}", render_result(result));
            }
        }
        Commands::Export { reference, out_dir } => {
            let dir = out_dir.unwrap_or_else(|| config.download_dir());
            let sink = DirectorySink::new(dir);
            let mut panel = LookupPanel::new();
            lookup(&mut panel, &reference, &service)?;
            match panel.export_document(&service, &sink) {
                Some(Ok(path)) => println!("Report saved to: {}", path.display()),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "report export failed");
                    bail!("{}", e.notice());
                }
                None => bail!("no analysis loaded for {reference}"),
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_env("MEDRECORD_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn load_config(path: Option<&PathBuf>, base_url: Option<String>) -> Result<PortalConfig> {
    let mut config = match path {
        // An explicit path must exist.
        Some(path) => PortalConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PortalConfig::load_or_default(&PortalConfig::default_path())?,
    };
    if let Some(url) = base_url {
        config.base_url = url;
        config.validate()?;
    }
    Ok(config)
}

/// Run a lookup through the panel and return the loaded record, or the
/// user-facing failure message as the error.
fn lookup<'p>(
    panel: &'p mut LookupPanel,
    reference: &str,
    service: &HttpAnalysisService,
) -> Result<&'p AnalysisResult> {
    match panel.submit_lookup(reference, service) {
        LookupState::Success(loaded) => Ok(&loaded.result),
        LookupState::Error(e) => bail!("{e}"),
        other => bail!("lookup did not complete: {other:?}"),
    }
}

fn render_result(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("Diagnosis: {}\n", result.analysis_result));
    out.push_str(&format!("{}\n", result.confidence_label()));
    if let Some(kind) = &result.pneumonia_type {
        out.push_str(&format!("Type: {kind}\n"));
    }
    if let Some(severity) = &result.severity {
        out.push_str(&format!("Severity: {severity}\n"));
    }
    out.push('\n');
    out.push_str(&format!("{:<16}{}\n", "Reference:", result.reference_number));
    out.push_str(&format!(
        "{:<16}{}\n",
        "Patient Name:",
        result.patient_name_or_placeholder()
    ));
    out.push_str(&format!("{:<16}{}\n", "Analyzed By:", result.doctor_name));
    out.push_str(&format!("{:<16}{}\n", "Date:", result.display_date()));
    out.push_str(&format!("{:<16}{}\n", "X-Ray Image:", result.image_url));
    if let Some(action) = &result.recommended_action {
        out.push_str(&format!("\nRecommended Action:\n  {action}\n"));
    }
    out
}
