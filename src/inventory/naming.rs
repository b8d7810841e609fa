//! Header normalisation: `Emission_Factor`, `emission factor` and
//! ` EMISSION-FACTOR ` all address the `emission_factor` field.

use std::collections::HashSet;

pub fn sanitize_column_name(name: &str) -> String {
    let lowered: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    // Collapse runs of underscores
    let mut result = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c == '_' && result.ends_with('_') {
            continue;
        }
        result.push(c);
    }

    let result = result.trim_matches('_');
    if result.is_empty() {
        return "column".to_owned();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("col_{result}");
    }
    result.to_owned()
}

/// Sanitises every header, suffixing `_1`, `_2`, ... on collisions so the
/// result stays unique.
pub fn sanitize_column_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(names.len());

    for name in names {
        let base = sanitize_column_name(name);
        let mut candidate = base.clone();
        let mut count = 0;
        while seen.contains(&candidate) {
            count += 1;
            candidate = format!("{base}_{count}");
        }
        seen.insert(candidate.clone());
        cleaned.push(candidate);
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_source_headers() {
        assert_eq!(sanitize_column_name("Record_ID"), "record_id");
        assert_eq!(sanitize_column_name(" Emission Factor "), "emission_factor");
        assert_eq!(sanitize_column_name("Emissions (CO2e, kg)"), "emissions_co2e_kg");
        assert_eq!(sanitize_column_name("2023"), "col_2023");
        assert_eq!(sanitize_column_name("__"), "column");
    }

    #[test]
    fn test_sanitize_deduplicates() {
        let names = vec!["Unit".to_owned(), "unit".to_owned(), "UNIT ".to_owned()];
        assert_eq!(sanitize_column_names(&names), vec!["unit", "unit_1", "unit_2"]);
    }
}
