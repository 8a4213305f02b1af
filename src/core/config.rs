use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User configuration for the telemetry adapters
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Vendors that must not be registered (case-insensitive)
    #[serde(default)]
    pub disabled_vendors: Vec<String>,
    #[serde(default)]
    pub rocm_smi_path: Option<String>,
    #[serde(default)]
    pub mx_smi_path: Option<String>,
    /// Directory scanned for `corex*` installs
    #[serde(default)]
    pub corex_root: Option<String>,
    /// DRM class directory read by the sysfs adapter
    #[serde(default)]
    pub drm_root: Option<String>,
}

impl Config {
    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("gpu-tools").join("config.json"))
    }

    pub fn is_vendor_enabled(&self, vendor: &str) -> bool {
        !self
            .disabled_vendors
            .iter()
            .any(|v| v.eq_ignore_ascii_case(vendor))
    }

    pub fn disable_vendor(&mut self, vendor: &str) {
        if self.is_vendor_enabled(vendor) {
            self.disabled_vendors.push(vendor.to_string());
        }
    }
}
