//! Configuration file handling.
//!
//! Reads from `~/.config/recipebox/recipebox.toml`

use anyhow::{Context, Result};
use recipebox_core::albums::DEFAULT_ALBUM_COLOR;
use recipebox_core::ApiConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service endpoints and request timeout.
    #[serde(default)]
    pub api: ApiConfig,
    /// Delay between carousel frames.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Colour used for albums created from the save dialog.
    #[serde(default = "default_album_color")]
    pub default_album_color: String,
    /// Whether to show the strength meter on password fields.
    #[serde(default = "default_show_password_strength")]
    pub show_password_strength: bool,
}

fn default_frame_interval_ms() -> u64 {
    33
}

fn default_album_color() -> String {
    DEFAULT_ALBUM_COLOR.to_string()
}

fn default_show_password_strength() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            frame_interval_ms: default_frame_interval_ms(),
            default_album_color: default_album_color(),
            show_password_strength: default_show_password_strength(),
        }
    }
}

impl Config {
    /// Load configuration from the config file.
    ///
    /// If `custom_path` is provided, load from that path, which must exist.
    /// Otherwise, load from the default XDG config location, creating it with
    /// defaults on first run.
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self> {
        match custom_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Self::read(&path)
            }
            None => {
                let path = Self::config_path()?;
                if path.exists() {
                    Self::read(&path)
                } else {
                    let config = Config::default();
                    config.save_to(&path)?;
                    tracing::info!("Created default config at {}", path.display());
                    Ok(config)
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Point every resource at `<base>/recipes`, `<base>/albums`, `<base>/auth`.
    pub fn override_api_base(&mut self, base: &str) {
        let timeout_secs = self.api.timeout_secs;
        self.api = ApiConfig {
            timeout_secs,
            ..ApiConfig::with_base(base)
        };
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("recipebox").join("recipebox.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_custom_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "frame_interval_ms = 50").unwrap();

        let config = Config::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.frame_interval_ms, 50);
        assert_eq!(config.default_album_color, DEFAULT_ALBUM_COLOR);
        assert!(config.show_password_strength);
        assert_eq!(config.api.recipes_url, ApiConfig::default().recipes_url);
    }

    #[test]
    fn api_table_is_read() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nrecipes_url = \"https://food.example/recipes\"\ntimeout_secs = 5"
        )
        .unwrap();

        let config = Config::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.api.recipes_url, "https://food.example/recipes");
        assert_eq!(config.api.timeout_secs, 5);
    }

    #[test]
    fn invalid_toml_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "frame_interval_ms = \"fast\"").unwrap();
        let err = Config::load(Some(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("recipebox.toml");
        let mut config = Config::default();
        config.override_api_base("http://api.test:9000/");
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(path)).unwrap();
        assert_eq!(loaded.api.albums_url, "http://api.test:9000/albums");
        assert_eq!(loaded.api.timeout_secs, ApiConfig::default().timeout_secs);
    }
}
