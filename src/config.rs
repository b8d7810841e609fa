use crate::inventory::types::REQUIRED_COLUMNS;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides `top_n` when set to a non-negative integer.
pub const TOP_N_ENV: &str = "CARBONSIGHT_TOP_N";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineSettings {
    /// Columns that must exist before any computation runs
    pub required_columns: Vec<String>,
    /// Number of hotspots reported when the caller does not ask for a count
    pub top_n: usize,
    /// Treat missing values as fatal instead of advisory
    pub strict_validation: bool,
    /// Extension used for exports when the output path has none
    pub export_format: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            required_columns: REQUIRED_COLUMNS.iter().map(|c| (*c).to_owned()).collect(),
            top_n: 5,
            strict_validation: false,
            export_format: "csv".to_owned(),
        }
    }
}

impl PipelineSettings {
    fn apply_env_overrides(mut self) -> Self {
        if let Ok(raw) = std::env::var(TOP_N_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(top_n) => self.top_n = top_n,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid {TOP_N_ENV}"),
            }
        }
        self
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("carbonsight").join("settings.json"))
}

/// Loads settings from `path`, or the default location when `None`.
///
/// A missing file yields defaults. Environment overrides are applied last.
///
/// # Errors
///
/// Fails if the file exists but cannot be read or parsed.
pub fn load_settings(path: Option<&Path>) -> Result<PipelineSettings> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => get_config_path(),
    };

    let settings = match path {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings: {}", path.display()))?;
            let settings: PipelineSettings = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "Settings loaded");
            settings
        }
        _ => PipelineSettings::default(),
    };

    Ok(settings.apply_env_overrides())
}

pub fn save_settings(settings: &PipelineSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write settings: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_require_core_columns() {
        let settings = PipelineSettings::default();
        assert_eq!(
            settings.required_columns,
            vec!["record_id", "activity_type", "quantity", "emission_factor"]
        );
        assert_eq!(settings.top_n, 5);
        assert!(!settings.strict_validation);
    }

    #[test]
    fn test_settings_round_trip_through_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("settings.json");

        let settings = PipelineSettings {
            strict_validation: true,
            export_format: "parquet".to_owned(),
            ..Default::default()
        };
        save_settings(&settings, &path)?;

        let loaded = load_settings(Some(&path))?;
        assert!(loaded.strict_validation);
        assert_eq!(loaded.export_format, "parquet");
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "strict_validation": true }"#)?;

        let loaded = load_settings(Some(&path))?;
        assert!(loaded.strict_validation);
        assert_eq!(loaded.required_columns.len(), 4);
        Ok(())
    }

    #[test]
    fn test_missing_file_yields_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let loaded = load_settings(Some(&dir.path().join("absent.json")))?;
        assert_eq!(loaded.required_columns.len(), 4);
        Ok(())
    }
}
