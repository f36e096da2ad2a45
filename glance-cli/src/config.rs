use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use glance_core::PrivacyMode;

use crate::state::ensure_glance_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySection {
    /// IANA zone used to resolve "today". Never inferred from the device.
    pub timezone: String,
    /// How many tasks the glance shows.
    pub limit: usize,
    pub privacy: PrivacyMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplaySection {
                timezone: "UTC".to_string(),
                limit: 5,
                privacy: PrivacyMode::Visible,
            },
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_glance_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
