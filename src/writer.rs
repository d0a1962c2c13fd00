use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::ReportError;
use crate::report::ReportDocument;
use crate::validate::check_embedded;

/// What was written and where
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Pretty-printed (2-space indent) text of the report
pub fn to_json_text(report: &ReportDocument) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Re-parse `text` and confirm it is the same tree as `report`, with every
/// embedded blob still parseable. Returns the re-parsed tree.
pub fn verify_round_trip(report: &ReportDocument, text: &str) -> Result<Value, ReportError> {
    let expected = serde_json::to_value(report)?;
    let readback: Value = serde_json::from_str(text)?;
    if readback != expected {
        return Err(ReportError::RoundTrip(
            "re-parsed document differs from the assembled report".to_string(),
        ));
    }
    let violations = check_embedded(&readback, "root");
    if !violations.is_empty() {
        return Err(ReportError::Validation(violations));
    }
    Ok(readback)
}

/// Serialize, verify and write the report to `path`.
///
/// Missing parent directories are created. The text goes to a temporary file
/// next to the destination which is then renamed over it, so the destination
/// either keeps its old content or holds the complete new report.
pub fn write_report(report: &ReportDocument, path: &Path) -> Result<WriteSummary, ReportError> {
    let text = to_json_text(report)?;
    verify_round_trip(report, &text)?;
    debug!("round-trip check passed ({} bytes)", text.len());

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let io_err = |source: std::io::Error| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(&dir).map_err(|source| ReportError::Io {
        path: dir.clone(),
        source,
    })?;
    let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
    tmp.write_all(text.as_bytes()).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    info!("wrote {} ({} bytes)", path.display(), text.len());
    Ok(WriteSummary {
        path: path.to_path_buf(),
        bytes: text.len(),
    })
}
