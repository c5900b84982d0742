use crate::report::PageSize;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    /// Rows shown in table previews and on the first report page
    pub preview_rows: usize,
    /// Decimal places kept in the descriptive statistics table
    pub stats_decimals: u32,
    /// Number of histogram panes per grid row
    pub histogram_grid_width: usize,
    /// How many numeric columns a report uses when a selection is left empty
    pub report_fallback_columns: usize,
    /// Standalone figure size in pixels
    pub figure_width: u32,
    pub figure_height: u32,
    /// Report page size in pixels (A4 at 96 dpi by default)
    pub page_width: u32,
    pub page_height: u32,
    /// File name suggested for CSV exports
    pub export_file_name: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            stats_decimals: 3,
            histogram_grid_width: 3,
            report_fallback_columns: 10,
            figure_width: 1000,
            figure_height: 600,
            page_width: 794,
            page_height: 1123,
            export_file_name: "processed_data.csv".to_owned(),
        }
    }
}

impl AppSettings {
    pub fn page_size(&self) -> PageSize {
        PageSize {
            width: self.page_width,
            height: self.page_height,
        }
    }

    pub fn figure_size(&self) -> (u32, u32) {
        (self.figure_width, self.figure_height)
    }
}

/// Default location: `<config dir>/idmd/config.json`.
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("idmd").join("config.json"))
}

/// Loads settings from `path`, or from the default location when `None`.
///
/// A missing file yields defaults. An unreadable or malformed file also
/// yields defaults, with a warning, so a bad settings file never blocks a
/// command.
pub fn load_app_config(path: Option<&Path>) -> AppSettings {
    let Some(path) = path.map(Path::to_path_buf).or_else(get_config_path) else {
        return AppSettings::default();
    };

    if !path.exists() {
        return AppSettings::default();
    }

    match read_settings(&path) {
        Ok(settings) => {
            tracing::debug!("Loaded settings from {}", path.display());
            settings
        }
        Err(e) => {
            tracing::warn!("Ignoring settings file {}: {e:#}", path.display());
            AppSettings::default()
        }
    }
}

fn read_settings(path: &Path) -> Result<AppSettings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse settings JSON")
}

pub fn save_app_config(settings: &AppSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_app_config(Some(&dir.path().join("nope.json")));
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let settings = AppSettings {
            preview_rows: 12,
            histogram_grid_width: 4,
            ..Default::default()
        };
        save_app_config(&settings, &path).unwrap();
        assert_eq!(load_app_config(Some(&path)), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "stats_decimals": 4 }"#).unwrap();
        let settings = load_app_config(Some(&path));
        assert_eq!(settings.stats_decimals, 4);
        assert_eq!(settings.preview_rows, 5);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(load_app_config(Some(&path)), AppSettings::default());
    }
}
