use super::types::Dataset;
use crate::error::{Result, ResultExt as _};
use polars::prelude::*;

/// Returns a copy of `dataset` with leading/trailing whitespace stripped from
/// every string column. Other columns pass through untouched.
///
/// Stripping is idempotent, so `clean(&clean(d)?)` equals `clean(d)`.
///
/// # Errors
///
/// Fails only if polars cannot evaluate the trimming plan.
pub fn clean(dataset: &Dataset) -> Result<Dataset> {
    let df = dataset.frame();
    let text_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|column| matches!(column.dtype(), DataType::String))
        .map(|column| column.name().to_string())
        .collect();

    if text_columns.is_empty() {
        return Ok(dataset.clone());
    }

    let expressions: Vec<Expr> = text_columns
        .iter()
        .map(|name| trim_expr(name))
        .collect();

    let cleaned = df
        .clone()
        .lazy()
        .with_columns(expressions)
        .collect()
        .context("Failed to collect cleaned dataset")?;

    tracing::info!(
        columns = text_columns.len(),
        "Data cleaned: whitespace removed"
    );
    Dataset::new(cleaned)
}

fn trim_expr(name: &str) -> Expr {
    col(name).str().strip_chars(lit(NULL)).alias(name)
}
