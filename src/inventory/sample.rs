//! A small synthetic inventory covering one activity per IPCC sector group.

use super::types::Dataset;
use crate::error::{Result, ResultExt as _};
use polars::prelude::*;
use std::path::Path;

/// Five activity records: energy, transport, industry, agriculture and waste.
///
/// # Errors
///
/// Fails only if polars cannot build the frame.
pub fn sample_dataset() -> Result<Dataset> {
    let df = df!(
        "record_id" => &[1i64, 2, 3, 4, 5],
        "sector_code" => &["1A1", "1A3", "2C", "3B", "5D"],
        "sector_name" => &[
            "Energy industries",
            "Transport",
            "Industrial processes",
            "Agriculture",
            "Waste",
        ],
        "activity_type" => &[
            "Electricity",
            "Road Travel",
            "Cement Production",
            "Crop Burning",
            "Wastewater Handling",
        ],
        "quantity" => &[500.0, 300.0, 150.0, 200.0, 1000.0],
        "emission_factor" => &[0.233, 2.31, 0.92, 1.7, 0.85],
        "unit" => &["kWh", "km", "tonnes", "hectares", "m3"],
        "date" => &["2023-01-01", "2023-01-03", "2023-01-04", "2023-01-06", "2023-01-08"]
    )?;
    Dataset::new(df)
}

/// Writes [`sample_dataset`] as CSV, creating parent directories as needed.
pub fn write_sample_csv(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut df = sample_dataset()?.into_frame();
    let file = std::fs::File::create(path).context("Failed to create sample CSV")?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut df)
        .context("Failed to write sample CSV")?;

    tracing::info!(path = %path.display(), "Sample activity data written");
    Ok(())
}
