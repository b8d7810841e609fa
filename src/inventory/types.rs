use crate::error::{CarbonError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const RECORD_ID: &str = "record_id";
pub const SOURCE_CATEGORY: &str = "source_category";
pub const SECTOR: &str = "sector";
pub const ACTIVITY_TYPE: &str = "activity_type";
pub const UNIT: &str = "unit";
pub const QUANTITY: &str = "quantity";
pub const EMISSION_FACTOR: &str = "emission_factor";
pub const EMISSION_FACTOR_UNIT: &str = "emission_factor_unit";
pub const PERIOD: &str = "period";
pub const DATE: &str = "date";
pub const EMISSIONS_CO2E_KG: &str = "emissions_co2e_kg";

/// Minimum schema for the full load → compute → analyse pipeline.
pub const REQUIRED_COLUMNS: [&str; 4] = [RECORD_ID, ACTIVITY_TYPE, QUANTITY, EMISSION_FACTOR];

/// Full activity-record schema, for sources that carry every descriptive field.
pub const EXTENDED_COLUMNS: [&str; 8] = [
    RECORD_ID,
    SOURCE_CATEGORY,
    ACTIVITY_TYPE,
    UNIT,
    QUANTITY,
    EMISSION_FACTOR,
    EMISSION_FACTOR_UNIT,
    PERIOD,
];

/// Coarse type of a column, derived from its polars dtype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Numeric,
    Text,
    Temporal,
    Other,
}

impl FieldKind {
    pub fn of(dtype: &DataType) -> Self {
        if dtype.is_primitive_numeric() {
            Self::Numeric
        } else if dtype.is_temporal() {
            Self::Temporal
        } else if matches!(dtype, DataType::String) {
            Self::Text
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Text => "Text",
            Self::Temporal => "Temporal",
            Self::Other => "Other",
        }
    }
}

/// Tabular activity data as produced by ingestion.
///
/// Column names are normalised to snake_case on construction, so a source
/// header of `Emission_Factor` is addressed as `emission_factor`.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
}

impl Dataset {
    /// Wraps a frame, normalising its column names.
    ///
    /// # Errors
    ///
    /// Fails if polars rejects the renamed columns.
    pub fn new(df: DataFrame) -> Result<Self> {
        let current: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        let normalised = super::naming::sanitize_column_names(&current);

        let mut df = df;
        if current != normalised {
            df.set_column_names(normalised.iter().map(String::as_str))?;
        }
        Ok(Self { df })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_frame(self) -> DataFrame {
        self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_index(name).is_some()
    }

    pub fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.df
            .column(name)
            .ok()
            .map(|column| FieldKind::of(column.dtype()))
    }

    /// Human-readable label for a row: its `record_id` if present, else the
    /// 1-based row number.
    pub fn record_label(&self, row: usize) -> String {
        record_label(&self.df, row)
    }
}

/// A dataset carrying a non-null `Float64` emissions column computed from
/// `Float64` `quantity` and `emission_factor` columns.
///
/// Only the calculator and the analyser construct these.
#[derive(Debug, Clone)]
pub struct DerivedDataset {
    df: DataFrame,
}

impl DerivedDataset {
    pub(crate) fn from_computed(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_frame(self) -> DataFrame {
        self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Values of one of the derived `Float64` columns, in row order.
    ///
    /// # Errors
    ///
    /// Fails with a schema error if the column does not exist.
    pub fn float_values(&self, name: &str) -> Result<Vec<f64>> {
        let column = self
            .df
            .column(name)
            .map_err(|_| CarbonError::schema([name]))?;
        let series = column.as_materialized_series().cast(&DataType::Float64)?;
        Ok(series.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect())
    }

    pub fn emissions(&self) -> Result<Vec<f64>> {
        self.float_values(EMISSIONS_CO2E_KG)
    }

    pub fn record_label(&self, row: usize) -> String {
        record_label(&self.df, row)
    }

    /// Materialises every row as a typed [`Record`], in dataset order.
    ///
    /// # Errors
    ///
    /// Fails if a row cannot be read back from the frame.
    pub fn records(&self) -> Result<Vec<Record>> {
        let quantity = self.float_values(QUANTITY)?;
        let factor = self.float_values(EMISSION_FACTOR)?;
        let emissions = self.emissions()?;

        let core = [RECORD_ID, ACTIVITY_TYPE, QUANTITY, EMISSION_FACTOR, EMISSIONS_CO2E_KG];
        let extra: Vec<&Column> = self
            .df
            .get_columns()
            .iter()
            .filter(|c| !core.contains(&c.name().as_str()))
            .collect();

        let mut records = Vec::with_capacity(self.df.height());
        for row in 0..self.df.height() {
            let mut attributes = BTreeMap::new();
            for column in &extra {
                if let Some(value) = cell_text(column, row)? {
                    attributes.insert(column.name().to_string(), value);
                }
            }

            let activity_type = match self.df.column(ACTIVITY_TYPE) {
                Ok(column) => cell_text(column, row)?.unwrap_or_default(),
                Err(_) => String::new(),
            };

            records.push(Record {
                record_id: record_label(&self.df, row),
                activity_type,
                quantity: quantity.get(row).copied().unwrap_or_default(),
                emission_factor: factor.get(row).copied().unwrap_or_default(),
                emissions_co2e_kg: emissions.get(row).copied().unwrap_or_default(),
                attributes,
            });
        }
        Ok(records)
    }
}

/// One activity observation with its derived emissions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub record_id: String,
    pub activity_type: String,
    pub quantity: f64,
    pub emission_factor: f64,
    pub emissions_co2e_kg: f64,
    /// Pass-through descriptive fields (sector, unit, date, ...).
    pub attributes: BTreeMap<String, String>,
}

/// Null or empty values found in one field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMissing {
    pub name: String,
    pub kind: FieldKind,
    pub missing: usize,
}

/// Advisory result of validating a dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub row_count: usize,
    /// One entry per column, in dataset order.
    pub fields: Vec<FieldMissing>,
}

impl ValidationReport {
    pub fn missing_in(&self, field: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.missing)
    }

    pub fn total_missing(&self) -> usize {
        self.fields.iter().map(|f| f.missing).sum()
    }

    pub fn has_warnings(&self) -> bool {
        self.total_missing() > 0
    }

    /// Fields that have at least one missing value.
    pub fn warnings(&self) -> impl Iterator<Item = &FieldMissing> {
        self.fields.iter().filter(|f| f.missing > 0)
    }

    /// Turns missing-value warnings into a hard error.
    ///
    /// # Errors
    ///
    /// Returns [`CarbonError::InvalidArgument`] listing the incomplete fields.
    pub fn into_strict(self) -> Result<Self> {
        if !self.has_warnings() {
            return Ok(self);
        }
        let detail = self
            .warnings()
            .map(|f| format!("{} ({})", f.name, f.missing))
            .collect::<Vec<_>>()
            .join(", ");
        Err(CarbonError::InvalidArgument(format!(
            "strict validation: missing values in {detail}"
        )))
    }
}

/// Non-fatal signal that a filter matched no records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoMatchWarning {
    pub field: String,
    pub value: String,
}

impl fmt::Display for NoMatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No records with {} = '{}'", self.field, self.value)
    }
}

/// Outcome of a reduction scenario.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub dataset: DerivedDataset,
    pub matched: usize,
    pub warning: Option<NoMatchWarning>,
}

/// Emissions rolled up for one activity type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub activity_type: String,
    pub records: usize,
    pub emissions_co2e_kg: f64,
}

pub(crate) fn record_label(df: &DataFrame, row: usize) -> String {
    df.column(RECORD_ID)
        .ok()
        .and_then(|column| cell_text(column, row).ok().flatten())
        .unwrap_or_else(|| format!("row {}", row + 1))
}

/// Text form of a cell, `None` for nulls.
pub(crate) fn cell_text(column: &Column, row: usize) -> Result<Option<String>> {
    let value = column.get(row)?;
    Ok(match value {
        AnyValue::Null => None,
        AnyValue::String(s) => Some(s.to_owned()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        other => Some(other.to_string()),
    })
}
