//! Configuration file handling.
//!
//! Settings come from an optional `uhv-dashboard.toml` in the working
//! directory (or a path given with `--config`); command-line values win.

use crate::cli::Args;
use crate::taxonomy::MeasureGroup;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "uhv-dashboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data source settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Dashboard display settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Locations of the two CMS CSV files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_hospital_csv")]
    pub hospital_csv: PathBuf,

    #[serde(default = "default_state_csv")]
    pub state_csv: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            hospital_csv: default_hospital_csv(),
            state_csv: default_state_csv(),
        }
    }
}

fn default_hospital_csv() -> PathBuf {
    PathBuf::from("Unplanned_Hospital_Visits-Hospital.csv")
}

fn default_state_csv() -> PathBuf {
    PathBuf::from("Unplanned_Hospital_Visits-State.csv")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Measure group selected at startup, by display name.
    #[serde(default = "default_group")]
    pub default_group: String,

    #[serde(default = "default_true")]
    pub dark_mode: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_group: default_group(),
            dark_mode: true,
        }
    }
}

fn default_group() -> String {
    MeasureGroup::default().name().to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments. CLI values take precedence.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref path) = args.hospital_csv {
            self.data.hospital_csv = path.clone();
        }
        if let Some(ref path) = args.state_csv {
            self.data.state_csv = path.clone();
        }
        if let Some(ref group) = args.group {
            self.dashboard.default_group = group.clone();
        }
    }

    /// The configured startup group.
    pub fn default_group(&self) -> Result<MeasureGroup> {
        MeasureGroup::from_name(&self.dashboard.default_group)
            .ok_or_else(|| anyhow!("Unknown measure group: {}", self.dashboard.default_group))
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
