//! Hotspot ranking and "what-if" reduction scenarios over derived data.
//!
//! Every function here is a stateless query: the input is never modified and
//! any adjusted data comes back as a new [`DerivedDataset`].

use super::calculator::with_float_columns;
use super::types::{
    ACTIVITY_TYPE, ActivitySummary, DerivedDataset, EMISSION_FACTOR, EMISSIONS_CO2E_KG,
    NoMatchWarning, QUANTITY, Simulation,
};
use crate::error::{CarbonError, Result};
use polars::prelude::*;

/// The `n` records with the largest emissions, largest first.
///
/// Ties keep ingestion order. An `n` beyond the dataset size returns every
/// record.
///
/// # Errors
///
/// [`CarbonError::InvalidArgument`] if `n` is negative.
pub fn top_emitters(derived: &DerivedDataset, n: i64) -> Result<DerivedDataset> {
    let n = usize::try_from(n).map_err(|_| {
        CarbonError::InvalidArgument(format!("top_emitters: n must not be negative (got {n})"))
    })?;

    let emissions = derived.emissions()?;
    let mut order: Vec<usize> = (0..emissions.len()).collect();
    // `sort_by` is stable, so equal emissions stay in ingestion order.
    order.sort_by(|a, b| emissions[*b].total_cmp(&emissions[*a]));
    order.truncate(n);

    let indices = order
        .into_iter()
        .map(IdxSize::try_from)
        .collect::<std::result::Result<Vec<IdxSize>, _>>()
        .map_err(|_| CarbonError::DataProcessing("row index overflow".to_owned()))?;
    let idx = IdxCa::from_vec("idx".into(), indices);
    let ranked = derived.frame().take(&idx)?;

    Ok(DerivedDataset::from_computed(ranked))
}

/// Applies a percentage cut to the emission factor of one activity type.
///
/// Matching records get `emission_factor × (1 − reduction_percent / 100)` and
/// their emissions recomputed; every other record is copied unchanged. When
/// nothing matches, the copy is returned together with a [`NoMatchWarning`].
///
/// # Errors
///
/// - [`CarbonError::InvalidArgument`] if `reduction_percent` is NaN or outside
///   `[0, 100]`.
/// - [`CarbonError::Schema`] if the data has no `activity_type` column.
pub fn simulate_reduction(
    derived: &DerivedDataset,
    activity_type: &str,
    reduction_percent: f64,
) -> Result<Simulation> {
    if !(0.0..=100.0).contains(&reduction_percent) {
        return Err(CarbonError::InvalidArgument(format!(
            "reduction_percent must be within [0, 100] (got {reduction_percent})"
        )));
    }

    let mask = activity_mask(derived, activity_type)?;
    let matched = mask.iter().filter(|m| **m).count();

    if matched == 0 {
        tracing::warn!(activity_type, "No activity found for reduction scenario");
        return Ok(Simulation {
            dataset: derived.clone(),
            matched,
            warning: Some(NoMatchWarning {
                field: ACTIVITY_TYPE.to_owned(),
                value: activity_type.to_owned(),
            }),
        });
    }

    let scale = 1.0 - reduction_percent / 100.0;
    let quantity = derived.float_values(QUANTITY)?;
    let mut factor = derived.float_values(EMISSION_FACTOR)?;
    let mut emissions = derived.emissions()?;

    for (row, hit) in mask.iter().enumerate() {
        if !*hit {
            continue;
        }
        if let (Some(f), Some(e), Some(q)) =
            (factor.get_mut(row), emissions.get_mut(row), quantity.get(row))
        {
            *f *= scale;
            *e = q * *f;
        }
    }

    let adjusted = with_float_columns(
        derived.frame().clone(),
        [(EMISSION_FACTOR, factor), (EMISSIONS_CO2E_KG, emissions)],
    )?;

    tracing::info!(
        activity_type,
        reduction_percent,
        matched,
        "Reduction scenario applied"
    );

    Ok(Simulation {
        dataset: DerivedDataset::from_computed(adjusted),
        matched,
        warning: None,
    })
}

/// Total emissions and record count per activity type, largest total first.
///
/// Ties keep the order in which each activity first appears. Records with a
/// null activity type are grouped under an empty name.
///
/// # Errors
///
/// [`CarbonError::Schema`] if the data has no `activity_type` column.
pub fn summary_by_activity(derived: &DerivedDataset) -> Result<Vec<ActivitySummary>> {
    let activities = activity_values(derived)?;
    let emissions = derived.emissions()?;

    let mut summaries: Vec<ActivitySummary> = Vec::new();
    for (activity, value) in activities.into_iter().zip(emissions) {
        let activity = activity.unwrap_or_default();
        match summaries.iter_mut().find(|s| s.activity_type == activity) {
            Some(summary) => {
                summary.records += 1;
                summary.emissions_co2e_kg += value;
            }
            None => summaries.push(ActivitySummary {
                activity_type: activity,
                records: 1,
                emissions_co2e_kg: value,
            }),
        }
    }

    summaries.sort_by(|a, b| b.emissions_co2e_kg.total_cmp(&a.emissions_co2e_kg));
    Ok(summaries)
}

/// Sum of `emissions_co2e_kg` across every record.
pub fn total_emissions(derived: &DerivedDataset) -> Result<f64> {
    Ok(derived.emissions()?.iter().sum())
}

fn activity_mask(derived: &DerivedDataset, activity_type: &str) -> Result<Vec<bool>> {
    Ok(activity_values(derived)?
        .into_iter()
        .map(|value| value.as_deref() == Some(activity_type))
        .collect())
}

fn activity_values(derived: &DerivedDataset) -> Result<Vec<Option<String>>> {
    let column = derived
        .frame()
        .column(ACTIVITY_TYPE)
        .map_err(|_| CarbonError::schema([ACTIVITY_TYPE]))?;
    let text = column.as_materialized_series().cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_owned))
        .collect())
}
