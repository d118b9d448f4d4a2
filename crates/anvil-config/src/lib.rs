use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_AUTOSAVE_SECS: u64 = 30;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file at {config_path}: {reason}")]
    ConfigInvalid {
        config_path: PathBuf,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one `<content-id>.json` file per page.
    pub content_path: PathBuf,
    /// Quiet period before an edited page is saved automatically.
    #[serde(default = "default_autosave_secs")]
    pub autosave_secs: u64,
    /// Undo steps kept per editing session.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_autosave_secs() -> u64 {
    DEFAULT_AUTOSAVE_SECS
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Config {
    pub fn new(content_path: impl Into<PathBuf>) -> Self {
        Self {
            content_path: content_path.into(),
            autosave_secs: DEFAULT_AUTOSAVE_SECS,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_secs(self.autosave_secs)
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if config.autosave_secs == 0 {
            return Err(ConfigError::ConfigInvalid {
                config_path: config_path.to_path_buf(),
                reason: "autosave_secs must be at least 1".to_string(),
            });
        }

        // Expand shell variables and tilde in the content directory
        config.content_path =
            Self::expand_path(&config.content_path).unwrap_or(config.content_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/anvil");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn write_config(temp_dir: &TempDir, content: &str) -> PathBuf {
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, content).unwrap();
        config_file
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/anvil/config.toml"));
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, "content_path = \"/srv/pages\"\n");

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config, Config::new("/srv/pages"));
        assert_eq!(config.autosave_delay(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            content_path: PathBuf::from("/tmp/anvil-pages"),
            autosave_secs: 5,
            history_limit: 200,
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, "content_path = [not valid");

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_zero_autosave_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(
            &temp_dir,
            "content_path = \"/srv/pages\"\nautosave_secs = 0\n",
        );

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_absolute_path() {
        let path = PathBuf::from("/absolute/path");
        assert_eq!(Config::expand_path(&path).unwrap(), path);
    }

    #[test]
    fn test_content_path_with_env_var_in_toml() {
        unsafe {
            env::set_var("ANVIL_TEST_SITE_ROOT", "/custom/site");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(
            &temp_dir,
            "content_path = \"$ANVIL_TEST_SITE_ROOT/pages\"\nhistory_limit = 10\n",
        );
        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.content_path, PathBuf::from("/custom/site/pages"));
        assert_eq!(config.history_limit, 10);

        unsafe {
            env::remove_var("ANVIL_TEST_SITE_ROOT");
        }
    }
}
