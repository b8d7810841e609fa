use super::calculator::compute;
use super::cleaning::clean;
use super::io::{Source, load};
use super::types::{DerivedDataset, ValidationReport};
use super::validation::validate;
use crate::config::PipelineSettings;
use crate::error::Result;

/// Everything the presentation layer needs after a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report: ValidationReport,
    pub derived: DerivedDataset,
    pub duration: std::time::Duration,
}

/// Load → validate → clean → compute.
///
/// Validation runs against `settings.required_columns`; with
/// `settings.strict_validation` set, missing values abort the run.
///
/// # Errors
///
/// Propagates the first stage error unchanged.
pub fn run_pipeline(source: impl Into<Source>, settings: &PipelineSettings) -> Result<PipelineOutcome> {
    let start = std::time::Instant::now();
    let dataset = load(source)?;

    let mut report = validate(&dataset, &settings.required_columns)?;
    if settings.strict_validation {
        report = report.into_strict()?;
    }

    let cleaned = clean(&dataset)?;
    let derived = compute(&cleaned)?;

    let duration = start.elapsed();
    tracing::info!(
        records = derived.height(),
        elapsed_ms = duration.as_millis(),
        "Pipeline finished"
    );

    Ok(PipelineOutcome {
        report,
        derived,
        duration,
    })
}
