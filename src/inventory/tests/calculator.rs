use super::{assert_close, scenario_dataset};
use crate::error::CarbonError;
use crate::inventory::calculator::compute;
use crate::inventory::types::{Dataset, EMISSIONS_CO2E_KG};
use anyhow::Result;
use polars::prelude::*;

#[test]
fn test_scenario_emissions() -> Result<()> {
    let derived = compute(&scenario_dataset()?)?;
    let emissions = derived.emissions()?;

    assert_eq!(emissions.len(), 2);
    assert_close(emissions[0], 693.0);
    assert_close(emissions[1], 116.5);
    Ok(())
}

#[test]
fn test_emissions_equal_quantity_times_factor() -> Result<()> {
    let quantity = [0.0, -12.5, 1e6, 3.25, 7.0];
    let factor = [4.2, 0.1, 0.000_233, -1.0, 0.0];
    let df = df!(
        "record_id" => &[1i64, 2, 3, 4, 5],
        "quantity" => &quantity,
        "emission_factor" => &factor
    )?;

    let derived = compute(&Dataset::new(df)?)?;
    let emissions = derived.emissions()?;
    for i in 0..quantity.len() {
        assert_eq!(emissions[i], quantity[i] * factor[i], "row {i}");
    }
    Ok(())
}

#[test]
fn test_integer_columns_are_promoted_to_float() -> Result<()> {
    let df = df!(
        "quantity" => &[3i64, 4],
        "emission_factor" => &[2i64, 5]
    )?;
    let derived = compute(&Dataset::new(df)?)?;

    assert_eq!(derived.frame().column("quantity")?.dtype(), &DataType::Float64);
    assert_eq!(derived.emissions()?, vec![6.0, 20.0]);
    Ok(())
}

#[test]
fn test_numeric_text_is_parsed() -> Result<()> {
    let df = df!(
        "record_id" => &["A", "B"],
        "quantity" => &[" 300 ", "500"],
        "emission_factor" => &["2.31", " 0.233"]
    )?;
    let derived = compute(&Dataset::new(df)?)?;
    let emissions = derived.emissions()?;
    assert_close(emissions[0], 693.0);
    assert_close(emissions[1], 116.5);
    Ok(())
}

#[test]
fn test_missing_factor_column_is_a_schema_error() -> Result<()> {
    let df = df!(
        "record_id" => &["A"],
        "activity_type" => &["Electricity"],
        "quantity" => &[500.0]
    )?;
    let err = compute(&Dataset::new(df)?).unwrap_err();

    assert!(matches!(&err, CarbonError::Schema { .. }));
    assert_eq!(err.missing_fields(), ["emission_factor".to_owned()]);
    assert!(err.to_string().contains("emission_factor"));
    Ok(())
}

#[test]
fn test_both_columns_missing_are_reported() -> Result<()> {
    let df = df!("record_id" => &["A"])?;
    let err = compute(&Dataset::new(df)?).unwrap_err();
    assert_eq!(
        err.missing_fields(),
        ["quantity".to_owned(), "emission_factor".to_owned()]
    );
    Ok(())
}

#[test]
fn test_unparseable_value_names_the_record() -> Result<()> {
    let df = df!(
        "record_id" => &["A", "B", "C"],
        "quantity" => &["1", "two", "3"],
        "emission_factor" => &[1.0, 1.0, 1.0]
    )?;
    let err = compute(&Dataset::new(df)?).unwrap_err();

    match err {
        CarbonError::InvalidValue {
            record,
            field,
            value,
        } => {
            assert_eq!(record, "B");
            assert_eq!(field, "quantity");
            assert_eq!(value, "two");
        }
        other => panic!("expected invalid value, got {other}"),
    }
    Ok(())
}

#[test]
fn test_null_value_is_not_coerced_to_zero() -> Result<()> {
    let df = df!(
        "quantity" => &[Some(1.0), None],
        "emission_factor" => &[1.0, 1.0]
    )?;
    let err = compute(&Dataset::new(df)?).unwrap_err();

    match err {
        CarbonError::InvalidValue { record, value, .. } => {
            assert_eq!(record, "row 2");
            assert_eq!(value, "null");
        }
        other => panic!("expected invalid value, got {other}"),
    }
    Ok(())
}

#[test]
fn test_compute_does_not_touch_input() -> Result<()> {
    let dataset = scenario_dataset()?;
    let before = dataset.frame().clone();
    let derived = compute(&dataset)?;

    assert!(dataset.frame().equals_missing(&before));
    assert!(!dataset.has_column(EMISSIONS_CO2E_KG));
    assert_eq!(derived.column_names().last().map(String::as_str), Some(EMISSIONS_CO2E_KG));
    Ok(())
}

#[test]
fn test_compute_is_deterministic() -> Result<()> {
    let dataset = scenario_dataset()?;
    let first = compute(&dataset)?;
    let second = compute(&dataset)?;
    assert!(first.frame().equals_missing(second.frame()));
    Ok(())
}

#[test]
fn test_existing_emissions_column_is_recomputed() -> Result<()> {
    let df = df!(
        "quantity" => &[2.0],
        "emission_factor" => &[3.0],
        "emissions_co2e_kg" => &[999.0]
    )?;
    let derived = compute(&Dataset::new(df)?)?;
    assert_eq!(derived.emissions()?, vec![6.0]);
    assert_eq!(derived.frame().width(), 3);
    Ok(())
}

#[test]
fn test_non_finite_text_is_rejected() -> Result<()> {
    let cases = [
        (["NaN", "10", "3"], "A", "NaN"),
        (["1", "10", "inf"], "C", "inf"),
    ];
    for (quantity, expected_record, bad) in cases {
        let df = df!(
            "record_id" => &["A", "B", "C"],
            "quantity" => &quantity,
            "emission_factor" => &["1.0", "1.0", "2"]
        )?;
        let err = compute(&Dataset::new(df)?).unwrap_err();

        match err {
            CarbonError::InvalidValue { record, field, value } => {
                assert_eq!(record, expected_record);
                assert_eq!(field, "quantity");
                assert_eq!(value, bad);
            }
            other => panic!("expected invalid value for {bad}, got {other}"),
        }
    }
    Ok(())
}

#[test]
fn test_nan_in_float_column_is_rejected() -> Result<()> {
    let df = df!(
        "record_id" => &["A", "B"],
        "quantity" => &[f64::NAN, 5.0],
        "emission_factor" => &[1.0, 1.0]
    )?;
    let err = compute(&Dataset::new(df)?).unwrap_err();

    match err {
        CarbonError::InvalidValue { record, field, .. } => {
            assert_eq!(record, "A");
            assert_eq!(field, "quantity");
        }
        other => panic!("expected invalid value, got {other}"),
    }
    Ok(())
}

#[test]
fn test_infinite_factor_is_rejected() -> Result<()> {
    let df = df!(
        "record_id" => &["A", "B"],
        "quantity" => &[1.0, 5.0],
        "emission_factor" => &[1.0, f64::NEG_INFINITY]
    )?;
    let err = compute(&Dataset::new(df)?).unwrap_err();
    assert!(matches!(
        err,
        CarbonError::InvalidValue { ref record, ref field, .. } if record == "B" && field == "emission_factor"
    ));
    Ok(())
}

#[test]
fn test_non_finite_csv_cells_never_reach_ranking() -> Result<()> {
    let csv = "record_id,activity_type,quantity,emission_factor\nA,x,NaN,1.0\nB,y,10,1.0\nC,z,inf,2\n";
    let dataset = crate::inventory::load(crate::inventory::Source::bytes("upload.csv", csv))?;
    let err = compute(&dataset).unwrap_err();
    assert!(matches!(err, CarbonError::InvalidValue { ref record, .. } if record == "A"));
    Ok(())
}
