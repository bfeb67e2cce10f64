use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    catalog::{self, CityCatalog, DEFAULT_TIME_RANGE, DEFAULT_VARIABLES},
    provider::open_meteo::{AIR_QUALITY_URL, FORECAST_URL},
    units::UnitSystem,
};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// units = "imperial"
/// time_range = 72
/// variables = ["temperature_2m", "windspeed_10m"]
/// default_city = "Oslo"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub forecast_url: String,
    pub air_quality_url: String,
    pub units: UnitSystem,
    /// Hours of forecast to show; one of the catalog ranges.
    pub time_range: u32,
    pub variables: Vec<String>,
    /// City selected at startup. Falls back to the first catalog city.
    pub default_city: Option<String>,
    /// Delay before the loading indicator appears.
    pub loading_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// JSON list of `{name, lat, lon}` replacing the bundled cities.
    pub cities_file: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    /// Where favorites are persisted.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            forecast_url: FORECAST_URL.to_string(),
            air_quality_url: AIR_QUALITY_URL.to_string(),
            units: UnitSystem::Metric,
            time_range: DEFAULT_TIME_RANGE,
            variables: DEFAULT_VARIABLES.iter().map(|v| v.to_string()).collect(),
            default_city: None,
            loading_delay_ms: 200,
            request_timeout_secs: 30,
            cities_file: None,
            export_dir: None,
            data_dir: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Reject ranges and variables outside the fixed catalogs.
    pub fn validate(&self) -> Result<()> {
        if catalog::time_range(self.time_range).is_none() {
            return Err(anyhow!(
                "Unsupported time_range {}. Supported values: 24, 48, 72, 168.",
                self.time_range
            ));
        }
        if let Some(unknown) = self.variables.iter().find(|v| catalog::variable(v).is_none()) {
            return Err(anyhow!("Unknown variable '{unknown}' in config."));
        }
        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-dashboard", "dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory for persisted favorites.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    /// Directory exports are written to.
    pub fn export_dir(&self) -> Result<PathBuf> {
        match &self.export_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("exports")),
        }
    }

    /// The configured city list, or the bundled one.
    pub fn city_catalog(&self) -> Result<CityCatalog> {
        match &self.cities_file {
            Some(path) => CityCatalog::load(path),
            None => CityCatalog::builtin(),
        }
    }
}
