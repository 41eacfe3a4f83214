use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "sales-dashboard.json";

/// Runtime settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Products endpoint queried with `regiao` / `ano`.
    pub endpoint: String,
    pub request_timeout_secs: u64,
    /// Bounds of the dashboard's year slider.
    pub first_year: i32,
    pub last_year: i32,
    /// Bounds and default of the "top sellers" input.
    pub top_sellers_min: usize,
    pub top_sellers_max: usize,
    pub top_sellers_default: usize,
    /// Pre-filled export file name, without extension.
    pub export_stem: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://labdados.com/produtos".to_string(),
            request_timeout_secs: 30,
            first_year: 2020,
            last_year: 2023,
            top_sellers_min: 2,
            top_sellers_max: 10,
            top_sellers_default: 5,
            export_stem: "dados".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// `CONFIG_FILE` if it exists and parses, defaults otherwise.
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::from_json_file(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {CONFIG_FILE}");
                config
            }
            Err(e) => {
                log::error!("Ignoring invalid configuration: {e:#}");
                Self::default()
            }
        }
    }

    /// Keep the slider and top-K bounds ordered and the default inside them.
    fn normalized(mut self) -> Self {
        if self.first_year > self.last_year {
            std::mem::swap(&mut self.first_year, &mut self.last_year);
        }
        if self.top_sellers_min > self.top_sellers_max {
            std::mem::swap(&mut self.top_sellers_min, &mut self.top_sellers_max);
        }
        self.top_sellers_default = self
            .top_sellers_default
            .clamp(self.top_sellers_min, self.top_sellers_max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = DashboardConfig::from_json_str(r#"{"request_timeout_secs": 5}"#).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.endpoint, "https://labdados.com/produtos");
        assert_eq!(config.top_sellers_default, 5);
    }

    #[test]
    fn bounds_are_normalized() {
        let config = DashboardConfig::from_json_str(
            r#"{"first_year": 2024, "last_year": 2019, "top_sellers_default": 50}"#,
        )
        .unwrap();
        assert_eq!((config.first_year, config.last_year), (2019, 2024));
        assert_eq!(config.top_sellers_default, 10);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(DashboardConfig::from_json_str(r#"{"first_year": "x"}"#).is_err());
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"export_stem": "vendas"}"#).unwrap();
        let config = DashboardConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.export_stem, "vendas");
    }
}
