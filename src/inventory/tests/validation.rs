use super::scenario_dataset;
use crate::error::CarbonError;
use crate::inventory::types::{Dataset, EXTENDED_COLUMNS, FieldKind, REQUIRED_COLUMNS};
use crate::inventory::validation::validate;
use anyhow::Result;
use polars::prelude::*;

#[test]
fn test_complete_dataset_has_no_warnings() -> Result<()> {
    let dataset = scenario_dataset()?;
    let report = validate(&dataset, &REQUIRED_COLUMNS)?;

    assert_eq!(report.row_count, 2);
    assert_eq!(report.fields.len(), 5);
    assert!(!report.has_warnings());
    assert_eq!(report.total_missing(), 0);
    Ok(())
}

#[test]
fn test_missing_columns_are_named_in_request_order() -> Result<()> {
    let dataset = scenario_dataset()?;
    let err = validate(&dataset, &EXTENDED_COLUMNS).unwrap_err();

    match err {
        CarbonError::Schema { missing } => assert_eq!(
            missing,
            vec!["source_category", "emission_factor_unit", "period"]
        ),
        other => panic!("expected schema error, got {other}"),
    }
    Ok(())
}

#[test]
fn test_missing_values_are_warnings_not_errors() -> Result<()> {
    let df = df!(
        "record_id" => &[Some("A"), Some("B"), Some("C")],
        "activity_type" => &[Some("Electricity"), Some("   "), None],
        "quantity" => &[Some(1.0), None, None],
        "emission_factor" => &[Some(0.5), Some(0.5), Some(0.5)]
    )?;
    let dataset = Dataset::new(df)?;

    let report = validate(&dataset, &REQUIRED_COLUMNS)?;
    assert!(report.has_warnings());
    assert_eq!(report.missing_in("activity_type"), Some(2));
    assert_eq!(report.missing_in("quantity"), Some(2));
    assert_eq!(report.missing_in("emission_factor"), Some(0));
    assert_eq!(report.total_missing(), 4);

    let flagged: Vec<&str> = report.warnings().map(|f| f.name.as_str()).collect();
    assert_eq!(flagged, vec!["activity_type", "quantity"]);
    Ok(())
}

#[test]
fn test_all_null_column_still_validates() -> Result<()> {
    let df = df!(
        "record_id" => &["A", "B"],
        "activity_type" => &["x", "y"],
        "quantity" => &[None::<f64>, None],
        "emission_factor" => &[1.0, 2.0]
    )?;
    let dataset = Dataset::new(df)?;

    let report = validate(&dataset, &REQUIRED_COLUMNS)?;
    assert_eq!(report.missing_in("quantity"), Some(2));
    Ok(())
}

#[test]
fn test_validation_does_not_modify_dataset() -> Result<()> {
    let dataset = scenario_dataset()?;
    let before = dataset.frame().clone();
    let _report = validate(&dataset, &REQUIRED_COLUMNS)?;
    assert!(dataset.frame().equals_missing(&before));
    Ok(())
}

#[test]
fn test_report_records_field_kinds() -> Result<()> {
    let dataset = scenario_dataset()?;
    let report = validate(&dataset, &["quantity".to_owned()])?;
    let quantity = report.fields.iter().find(|f| f.name == "quantity").unwrap();
    assert_eq!(quantity.kind, FieldKind::Numeric);
    Ok(())
}
