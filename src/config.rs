use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const BASE_URL_ENV: &str = "KB_SEARCH_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn save_base_url(url: &str) -> Result<PathBuf> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.base_url = Some(url.to_string());
        config.save()?;
        Self::get_config_path()
    }

    /// Backend base URL: CLI flag, then `KB_SEARCH_URL`, then the config
    /// file, then the default. A blank source counts as unset.
    pub fn resolve_base_url(&self, cli_override: Option<&str>, env_value: Option<&str>) -> String {
        let non_blank = |url: &&str| !url.trim().is_empty();

        cli_override
            .filter(non_blank)
            .or(env_value.filter(non_blank))
            .or(self.base_url.as_deref().filter(non_blank))
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        match &self.log_file {
            Some(path) => Some(PathBuf::from(path)),
            None => dirs::cache_dir().map(|dir| dir.join("kb-search").join("kb-search.log")),
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("kb-search").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            base_url: Some("http://kb.internal:8080".to_string()),
            log_level: Some("debug".to_string()),
            log_file: None,
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_base_url_precedence() {
        let config = Config {
            base_url: Some("http://from-file".to_string()),
            ..Config::default()
        };

        assert_eq!(config.resolve_base_url(Some("http://cli"), Some("http://env")), "http://cli");
        assert_eq!(config.resolve_base_url(None, Some("http://env")), "http://env");
        assert_eq!(config.resolve_base_url(None, None), "http://from-file");
        assert_eq!(Config::new().resolve_base_url(None, None), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_blank_base_url_falls_through_to_next_source() {
        let config = Config {
            base_url: Some("http://from-file".to_string()),
            ..Config::default()
        };

        assert_eq!(config.resolve_base_url(None, Some("")), "http://from-file");
        assert_eq!(config.resolve_base_url(Some("  "), None), "http://from-file");
        assert_eq!(config.resolve_base_url(Some(""), Some("http://env")), "http://env");

        let blank_file = Config {
            base_url: Some(" ".to_string()),
            ..Config::default()
        };
        assert_eq!(blank_file.resolve_base_url(None, Some("")), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_explicit_log_file() {
        let config = Config {
            log_file: Some("/tmp/kb.log".to_string()),
            ..Config::default()
        };
        assert_eq!(config.log_path(), Some(PathBuf::from("/tmp/kb.log")));
    }
}
