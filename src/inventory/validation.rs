//! Read-only schema and completeness checks.

use super::types::{Dataset, FieldKind, FieldMissing, ValidationReport};
use crate::error::{CarbonError, Result};
use polars::prelude::*;

/// Checks that every `required` field exists and counts missing values.
///
/// Missing *columns* are fatal. Missing *values* (nulls, and empty or
/// whitespace-only strings) are only counted in the returned report; the
/// caller decides whether to treat them as fatal.
///
/// # Errors
///
/// [`CarbonError::Schema`] naming every required field that is absent, in the
/// order requested.
pub fn validate<S: AsRef<str>>(dataset: &Dataset, required: &[S]) -> Result<ValidationReport> {
    let missing: Vec<String> = required
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !dataset.has_column(name))
        .map(str::to_owned)
        .collect();

    if !missing.is_empty() {
        tracing::error!(?missing, "Required columns are absent");
        return Err(CarbonError::Schema { missing });
    }

    let df = dataset.frame();
    let mut fields = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        fields.push(FieldMissing {
            name: column.name().to_string(),
            kind: FieldKind::of(column.dtype()),
            missing: count_missing(column)?,
        });
    }

    let report = ValidationReport {
        row_count: df.height(),
        fields,
    };

    if report.has_warnings() {
        for field in report.warnings() {
            tracing::warn!(
                field = %field.name,
                missing = field.missing,
                "Missing values detected"
            );
        }
    } else {
        tracing::info!(rows = report.row_count, "No missing values detected");
    }

    Ok(report)
}

fn count_missing(column: &Column) -> Result<usize> {
    let nulls = column.null_count();
    if !matches!(column.dtype(), DataType::String) {
        return Ok(nulls);
    }

    let blanks = column
        .as_materialized_series()
        .str()?
        .into_iter()
        .flatten()
        .filter(|value| value.trim().is_empty())
        .count();
    Ok(nulls + blanks)
}
