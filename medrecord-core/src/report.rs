//! PDF report naming and saving.
//!
//! Reports are written through a `.part` file that is renamed into place, so
//! a failed export never leaves a truncated PDF under the final name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ExportError;

/// File name for a reference's report: `xray-analysis-<reference>.pdf`.
///
/// Characters outside `[A-Za-z0-9._-]` are replaced with `_`, so distinct
/// references can share a file name (`A/B` and `A_B` both give
/// `xray-analysis-A_B.pdf`); a later export replaces the earlier file.
pub fn report_filename(reference: &str) -> String {
    let safe: String = reference
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("xray-analysis-{safe}.pdf")
}

/// Destination for downloaded reports.
pub trait ReportSink: Send + Sync {
    /// Store `bytes` under `filename`, returning where it ended up.
    fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Saves reports into a directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for DirectorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let target = self.dir.join(filename);
        let partial = self.dir.join(format!(".{filename}.part"));

        if let Err(e) = fs::write(&partial, bytes).and_then(|_| fs::rename(&partial, &target)) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        Ok(target)
    }
}

/// Save a generated report for `reference` into `sink`.
pub fn save_report(
    sink: &dyn ReportSink,
    reference: &str,
    bytes: &[u8],
) -> Result<PathBuf, ExportError> {
    if bytes.is_empty() {
        return Err(ExportError::EmptyPayload);
    }
    let filename = report_filename(reference);
    sink.save(&filename, bytes)
        .map_err(|source| ExportError::Save {
            path: PathBuf::from(&filename),
            source,
        })
}
