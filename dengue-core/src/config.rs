use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::api::DEFAULT_BASE_URL;

/// Settings stored on disk between runs.
///
/// Example TOML:
/// ```toml
/// api_base_url = "http://localhost:8000"
/// user_city = "Chennai"
/// request_timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Origin of the prediction service; defaults to [`DEFAULT_BASE_URL`].
    pub api_base_url: Option<String>,

    /// City whose live weather is shown on the dashboard.
    pub user_city: Option<String>,

    /// Per-request timeout. Requests wait indefinitely when unset.
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn user_city(&self) -> Option<&str> {
        self.user_city.as_deref().filter(|c| !c.trim().is_empty())
    }

    pub fn set_user_city(&mut self, city: impl Into<String>) {
        self.user_city = Some(city.into());
    }

    /// First run: no city has been chosen yet.
    pub fn needs_location_prompt(&self) -> bool {
        self.user_city().is_none()
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "dengue-risk", "dengue-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// A [`Config`] bound to the file it was loaded from.
///
/// The dashboard persists the user's city through this instead of touching
/// the platform config directory itself.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    pub fn open_default() -> Result<Self> {
        Self::open(Config::config_file_path()?)
    }

    pub fn open(path: PathBuf) -> Result<Self> {
        let config = Config::load_from(&path)?;
        Ok(Self { path, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the chosen city.
    pub fn save_user_city(&mut self, city: &str) -> Result<()> {
        self.config.set_user_city(city);
        self.config.save_to(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_needs_location_prompt() {
        let cfg = Config::default();
        assert!(cfg.needs_location_prompt());
        assert_eq!(cfg.api_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn blank_city_counts_as_unset() {
        let mut cfg = Config::default();
        cfg.set_user_city("  ");
        assert!(cfg.needs_location_prompt());

        cfg.set_user_city("Jaipur");
        assert!(!cfg.needs_location_prompt());
        assert_eq!(cfg.user_city(), Some("Jaipur"));
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_base_url: Some("http://10.0.0.5:8000".into()),
            user_city: Some("Kolkata".into()),
            request_timeout_secs: Some(15),
        };
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "user_city = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn store_persists_city_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut store = ConfigStore::open(path.clone()).unwrap();
        assert!(store.config().needs_location_prompt());

        store.save_user_city("Hyderabad").unwrap();

        let reopened = ConfigStore::open(path).unwrap();
        assert_eq!(reopened.config().user_city(), Some("Hyderabad"));
        assert!(!reopened.config().needs_location_prompt());
    }
}
