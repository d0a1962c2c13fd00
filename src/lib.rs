// Library exports for pbireport

pub mod config;
pub mod dashboard;
pub mod embedded;
pub mod error;
pub mod filter;
pub mod literal;
pub mod page;
pub mod query;
pub mod report;
pub mod validate;
pub mod visual;
pub mod writer;

use log::{info, warn};
use std::path::PathBuf;

use crate::config::GeneratorConfig;
use crate::error::ReportError;
use crate::report::ReportDocument;

/// Per-page line of the run summary
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub display_name: String,
    pub visuals: usize,
}

/// Result of a generator run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    /// `None` when nothing was written
    pub path: Option<PathBuf>,
    pub pages: Vec<PageSummary>,
    pub bytes: usize,
}

impl GenerationSummary {
    fn new(report: &ReportDocument, path: Option<PathBuf>, bytes: usize) -> Self {
        Self {
            path,
            pages: report
                .sections
                .iter()
                .map(|p| PageSummary {
                    display_name: p.display_name.clone(),
                    visuals: p.visual_containers.len(),
                })
                .collect(),
            bytes,
        }
    }
}

/// Build the dashboard and validate it. Fails with every violation found.
pub fn build_checked(config: &GeneratorConfig) -> Result<ReportDocument, ReportError> {
    let report = dashboard::build_report(config)?;
    info!(
        "built report: {} pages, {} visuals",
        report.sections.len(),
        report.visual_count()
    );

    let violations = validate::validate(&report);
    if !violations.is_empty() {
        for v in &violations {
            warn!("{}", v);
        }
        return Err(ReportError::Validation(violations));
    }
    info!("validation passed");
    Ok(report)
}

/// Build and validate without touching the filesystem
pub fn check(config: &GeneratorConfig) -> Result<GenerationSummary, ReportError> {
    let report = build_checked(config)?;
    let text = writer::to_json_text(&report)?;
    writer::verify_round_trip(&report, &text)?;
    Ok(GenerationSummary::new(&report, None, text.len()))
}

/// Build, validate and write the report to the configured output path
pub fn generate(config: &GeneratorConfig) -> Result<GenerationSummary, ReportError> {
    let path = config.output_path()?;
    let report = build_checked(config)?;
    let written = writer::write_report(&report, path)?;
    Ok(GenerationSummary::new(&report, Some(written.path), written.bytes))
}
