//! File export and console tables for derived datasets.
//!
//! This is the presentation side of the pipeline: it reads what the
//! calculator and analyser produce and never feeds anything back.

use crate::error::{CarbonError, Result, ResultExt as _};
use crate::inventory::{ActivitySummary, DerivedDataset, Record};
use polars::prelude::*;
use std::path::Path;

/// Writes a derived dataset as CSV, Parquet or JSON, chosen by extension.
///
/// # Errors
///
/// [`CarbonError::UnsupportedFormat`] for other extensions; I/O and polars
/// failures otherwise.
pub fn export(derived: &DerivedDataset, path: &Path) -> Result<()> {
    let mut df = derived.frame().clone();
    save_df(&mut df, path)?;
    tracing::info!(path = %path.display(), rows = df.height(), "Derived dataset exported");
    Ok(())
}

/// Writes the per-activity rollup in the same formats as [`export`].
pub fn export_summary(summaries: &[ActivitySummary], path: &Path) -> Result<()> {
    let activity: Vec<&str> = summaries.iter().map(|s| s.activity_type.as_str()).collect();
    let records: Vec<u64> = summaries.iter().map(|s| s.records as u64).collect();
    let emissions: Vec<f64> = summaries.iter().map(|s| s.emissions_co2e_kg).collect();

    let mut df = df!(
        "activity_type" => activity,
        "records" => records,
        "emissions_co2e_kg" => emissions
    )?;
    save_df(&mut df, path)
}

fn save_df(df: &mut DataFrame, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_lowercase();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::create(path).context("Failed to create CSV file")?;
            CsvWriter::new(file)
                .include_header(true)
                .finish(df)
                .context("Failed to write CSV file")?;
        }
        "parquet" => {
            let file = std::fs::File::create(path).context("Failed to create Parquet file")?;
            ParquetWriter::new(file)
                .finish(df)
                .context("Failed to write Parquet file")?;
        }
        "json" => {
            let file = std::fs::File::create(path).context("Failed to create JSON file")?;
            JsonWriter::new(file)
                .with_json_format(JsonFormat::Json)
                .finish(df)
                .context("Failed to write JSON file")?;
        }
        other => {
            return Err(CarbonError::UnsupportedFormat(format!(
                "export to .{other}"
            )));
        }
    }
    Ok(())
}

/// Fixed-width table of records for terminal output.
pub fn render_table(records: &[Record]) -> String {
    let id_width = records
        .iter()
        .map(|r| r.record_id.len())
        .chain([9])
        .max()
        .unwrap_or(9);
    let activity_width = records
        .iter()
        .map(|r| r.activity_type.len())
        .chain([13])
        .max()
        .unwrap_or(13);

    let mut lines = vec![format!(
        "{:<id_width$}  {:<activity_width$}  {:>12}  {:>10}  {:>17}",
        "record_id", "activity_type", "quantity", "factor", "emissions_co2e_kg"
    )];
    lines.extend(records.iter().map(|record| {
        format!(
            "{:<id_width$}  {:<activity_width$}  {:>12.3}  {:>10.4}  {:>17.3}",
            record.record_id,
            record.activity_type,
            record.quantity,
            record.emission_factor,
            record.emissions_co2e_kg
        )
    }));
    join_lines(&lines)
}

pub fn render_summary(summaries: &[ActivitySummary]) -> String {
    let width = summaries
        .iter()
        .map(|s| s.activity_type.len())
        .chain([13])
        .max()
        .unwrap_or(13);

    let mut lines = vec![format!(
        "{:<width$}  {:>7}  {:>17}",
        "activity_type", "records", "emissions_co2e_kg"
    )];
    lines.extend(summaries.iter().map(|summary| {
        format!(
            "{:<width$}  {:>7}  {:>17.3}",
            summary.activity_type, summary.records, summary.emissions_co2e_kg
        )
    }));
    join_lines(&lines)
}

fn join_lines(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{compute, sample_dataset, summary_by_activity};

    #[test]
    fn test_export_formats() -> anyhow::Result<()> {
        let derived = compute(&sample_dataset()?)?;
        let dir = tempfile::tempdir()?;

        for name in ["out.csv", "out.parquet", "out.json"] {
            let path = dir.path().join(name);
            export(&derived, &path)?;
            assert!(path.exists(), "{name} should be written");
        }
        Ok(())
    }

    #[test]
    fn test_export_rejects_unknown_extension() -> anyhow::Result<()> {
        let derived = compute(&sample_dataset()?)?;
        let dir = tempfile::tempdir()?;
        let result = export(&derived, &dir.path().join("out.xlsx"));
        assert!(matches!(result, Err(CarbonError::UnsupportedFormat(_))));
        Ok(())
    }

    #[test]
    fn test_summary_export_and_render() -> anyhow::Result<()> {
        let derived = compute(&sample_dataset()?)?;
        let summaries = summary_by_activity(&derived)?;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reports").join("summary.csv");
        export_summary(&summaries, &path)?;

        let written = std::fs::read_to_string(&path)?;
        assert!(written.starts_with("activity_type,records,emissions_co2e_kg"));

        let table = render_summary(&summaries);
        assert_eq!(table.lines().count(), 6);
        assert!(table.contains("Wastewater Handling"));
        Ok(())
    }

    #[test]
    fn test_render_table_lists_every_record() -> anyhow::Result<()> {
        let derived = compute(&sample_dataset()?)?;
        let table = render_table(&derived.records()?);
        assert_eq!(table.lines().count(), 6);
        assert!(table.contains("Road Travel"));
        assert!(table.contains("693.000"));
        Ok(())
    }

    #[test]
    fn test_rendered_tables_end_every_line() {
        let table = render_table(&[]);
        assert_eq!(table.matches('\n').count(), 1);
        assert!(table.starts_with("record_id"));

        let summary = render_summary(&[ActivitySummary {
            activity_type: "Electricity".to_owned(),
            records: 2,
            emissions_co2e_kg: 400.0,
        }]);
        assert_eq!(summary.matches('\n').count(), 2);
        assert!(summary.ends_with("400.000\n"));
    }
}
