//! Configuration management for the sng-inspect CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sng_inspect::Layout;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// `nm` listing of the daemon binary
    pub symbols: Option<PathBuf>,
    /// Load bias added to symbol addresses: hex value or "auto"
    pub load_bias: Option<String>,
    pub max_queue_length: Option<usize>,
    /// Structure offset overrides
    #[serde(skip_serializing_if = "is_default_layout")]
    pub layout: Layout,
}

fn is_default_layout(layout: &Layout) -> bool {
    *layout == Layout::default()
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("sng-inspect");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }
}

/// Read a standalone layout override file
pub fn load_layout(path: &Path) -> Result<Layout> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout from {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Failed to parse layout {}", path.display()))
}
