//! CO2e derivation: `emissions_co2e_kg = quantity × emission_factor`.
//!
//! No unit conversion happens here. The caller is responsible for supplying
//! factors expressed as kg CO2e per unit of `quantity`.

use super::types::{
    DerivedDataset, Dataset, EMISSION_FACTOR, EMISSIONS_CO2E_KG, QUANTITY, record_label,
};
use crate::error::{CarbonError, Result};
use polars::prelude::*;

/// Derives the emissions column for every record.
///
/// `quantity` and `emission_factor` are normalised to `Float64` in the
/// result. Text cells are parsed after trimming surrounding whitespace.
///
/// # Errors
///
/// - [`CarbonError::Schema`] if `quantity` or `emission_factor` is absent.
/// - [`CarbonError::InvalidValue`] naming the first record whose quantity or
///   factor is null, empty, not a number, NaN or infinite.
pub fn compute(dataset: &Dataset) -> Result<DerivedDataset> {
    let missing: Vec<&str> = [QUANTITY, EMISSION_FACTOR]
        .into_iter()
        .filter(|name| !dataset.has_column(name))
        .collect();
    if !missing.is_empty() {
        return Err(CarbonError::schema(missing));
    }

    let df = dataset.frame();
    let quantity = numeric_values(df, QUANTITY)?;
    let factor = numeric_values(df, EMISSION_FACTOR)?;

    let emissions: Vec<f64> = quantity
        .iter()
        .zip(&factor)
        .map(|(q, f)| q * f)
        .collect();

    let negative = quantity.iter().filter(|q| **q < 0.0).count();
    if negative > 0 {
        tracing::debug!(negative, "Records with negative quantity kept as-is");
    }

    let derived = with_float_columns(
        df.clone(),
        [
            (QUANTITY, quantity),
            (EMISSION_FACTOR, factor),
            (EMISSIONS_CO2E_KG, emissions),
        ],
    )?;

    tracing::info!(records = derived.height(), "Emissions computed");
    Ok(DerivedDataset::from_computed(derived))
}

/// Replaces (or appends) whole `Float64` columns on a frame.
pub(crate) fn with_float_columns<const N: usize>(
    mut df: DataFrame,
    columns: [(&str, Vec<f64>); N],
) -> Result<DataFrame> {
    for (name, values) in columns {
        let series = Float64Chunked::from_vec(name.into(), values).into_series();
        df.with_column(series)?;
    }
    Ok(df)
}

/// Reads a column as real numbers, refusing to coerce anything.
fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?;
    let series = column.as_materialized_series();

    if series.dtype().is_primitive_numeric() {
        let floats = series.cast(&DataType::Float64)?;
        return floats
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(v) if v.is_finite() => Ok(v),
                Some(v) => Err(CarbonError::invalid_value(record_label(df, row), name, v.to_string())),
                None => Err(CarbonError::invalid_value(record_label(df, row), name, "null")),
            })
            .collect();
    }

    let text = series.cast(&DataType::String)?;
    text.str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| parse_number(value).ok_or_else(|| {
            CarbonError::invalid_value(record_label(df, row), name, value.unwrap_or("null"))
        }))
        .collect()
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(Some(" 2.31 ")), Some(2.31));
        assert_eq!(parse_number(Some("-5")), Some(-5.0));
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(Some("kWh")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        for text in ["NaN", "nan", "inf", "-inf", "infinity"] {
            assert_eq!(parse_number(Some(text)), None, "{text} should not parse");
        }
    }
}
