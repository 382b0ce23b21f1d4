//! Configuration management for taskdeck.
//!
//! Loads configuration from ${TASKDECK_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::client::ClientConfig;

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "TASKDECK_BASE_URL";

/// Returns the default configuration template.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments and sections from the template are always present, while
/// the user's values win.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;
    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for taskdeck configuration and data.
    //!
    //! TASKDECK_HOME resolution order:
    //! 1. TASKDECK_HOME environment variable (if set)
    //! 2. ~/.config/taskdeck (default)
    //! 3. <tmp>/taskdeck when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the taskdeck home directory.
    pub fn taskdeck_home() -> PathBuf {
        if let Ok(home) = std::env::var("TASKDECK_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || std::env::temp_dir().join("taskdeck"),
            |h| h.join(".config").join("taskdeck"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        taskdeck_home().join("config.toml")
    }

    /// Returns the path to the persisted session cookies.
    pub fn session_path() -> PathBuf {
        taskdeck_home().join("session.json")
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> PathBuf {
        taskdeck_home().join("logs")
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive; `TASKDECK_LOG` wins when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Write a daily log file under `logs_dir()`.
    pub file: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub request_timeout_secs: u32,
    pub refresh_timeout_secs: u32,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_timeout_secs: Self::DEFAULT_REFRESH_TIMEOUT_SECS,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 30;
    const DEFAULT_REFRESH_TIMEOUT_SECS: u32 = 10;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Saves only the base_url field to the default config file.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the file cannot be written.
    pub fn save_base_url(base_url: &str) -> Result<()> {
        Self::save_base_url_to(&paths::config_path(), base_url)
    }

    /// Saves only the base_url field to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the file cannot be written.
    pub fn save_base_url_to(path: &Path, base_url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let base_url = validate_base_url(base_url)?;

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        doc["base_url"] = value(base_url);

        Self::write_config(path, &doc.to_string())
    }

    /// Resolves the API base URL: `TASKDECK_BASE_URL`, then config, then
    /// the built-in default.
    ///
    /// # Errors
    /// Returns an error if the winning value is not an http(s) URL.
    pub fn resolve_base_url(&self) -> Result<String> {
        self.resolve_base_url_with(std::env::var(BASE_URL_ENV).ok())
    }

    fn resolve_base_url_with(&self, env_override: Option<String>) -> Result<String> {
        let non_empty = |s: &str| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        let (source, raw) = if let Some(url) = env_override.as_deref().and_then(non_empty) {
            (BASE_URL_ENV, url)
        } else if let Some(url) = self.base_url.as_deref().and_then(non_empty) {
            ("config", url)
        } else {
            ("default", Self::DEFAULT_BASE_URL.to_string())
        };

        let url = validate_base_url(&raw)
            .with_context(|| format!("Invalid base URL from {source}"))?;
        tracing::debug!(%url, source, "resolved base URL");
        Ok(url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        secs_or_disabled(self.request_timeout_secs)
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        secs_or_disabled(self.refresh_timeout_secs)
    }

    /// Builds the client settings from this config.
    ///
    /// # Errors
    /// Returns an error if the base URL cannot be resolved.
    pub fn client_config(&self) -> Result<ClientConfig> {
        Ok(ClientConfig {
            base_url: self.resolve_base_url()?,
            request_timeout: self.request_timeout(),
            refresh_timeout: self.refresh_timeout(),
        })
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

fn secs_or_disabled(secs: u32) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(u64::from(secs)))
}

/// Accepts absolute http(s) URLs; strips a trailing slash.
fn validate_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed =
        url::Url::parse(trimmed).with_context(|| format!("'{trimmed}' is not a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("'{trimmed}' must use http or https");
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.refresh_timeout_secs, 10);
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "refresh_timeout_secs = 3\n[log]\nfile = true\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.refresh_timeout_secs, 3);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.log.file);
        assert_eq!(config.log.level, None);
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_init_creates_config_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# taskdeck Configuration"));
        assert!(contents.contains("# base_url ="));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_timeouts_zero_disables() {
        let config = Config {
            request_timeout_secs: 0,
            refresh_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.refresh_timeout(), None);
        assert_eq!(
            Config::default().refresh_timeout(),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_base_url_precedence() {
        let config = Config {
            base_url: Some("https://tasks.example.com/api/v1/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_base_url_with(None).unwrap(),
            "https://tasks.example.com/api/v1"
        );
        assert_eq!(
            config
                .resolve_base_url_with(Some("http://127.0.0.1:9000/api/v1".to_string()))
                .unwrap(),
            "http://127.0.0.1:9000/api/v1"
        );
        assert_eq!(
            Config::default().resolve_base_url_with(Some("  ".to_string())).unwrap(),
            Config::DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = Config {
            base_url: Some("ftp://tasks.example.com".to_string()),
            ..Default::default()
        };
        assert!(config.resolve_base_url_with(None).is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn test_save_base_url_creates_file_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.toml");

        Config::save_base_url_to(&config_path, "https://tasks.example.com/api/v1").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(
            config.base_url.as_deref(),
            Some("https://tasks.example.com/api/v1")
        );
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Per-request timeout"));
    }

    #[test]
    fn test_save_base_url_preserves_other_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "request_timeout_secs = 5\n[log]\nlevel = \"debug\"\n",
        )
        .unwrap();

        Config::save_base_url_to(&config_path, "http://localhost:9000/api/v1").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000/api/v1"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.log.level.as_deref(), Some("debug"));
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# taskdeck Configuration"));
    }

    #[test]
    fn test_save_base_url_rejects_invalid() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        assert!(Config::save_base_url_to(&config_path, "localhost").is_err());
        assert!(!config_path.exists());
    }
}
