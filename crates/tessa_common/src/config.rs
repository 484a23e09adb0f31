//! Tessa configuration
//!
//! Selects the catalog source and its parameters. Resolved once at
//! startup and handed to the loader; never re-evaluated mid-session.
//! Config file: ~/.config/tessa/config.toml or /etc/tessa/config.toml,
//! with TESSA_* environment overrides on top.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where the catalog comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Pre-materialized JSON payload bundled with the install.
    Snapshot,
    /// Remote technique service.
    Remote,
    /// In-memory fixture records.
    Mock,
}

impl SourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceMode::Snapshot => "snapshot",
            SourceMode::Remote => "remote",
            SourceMode::Mock => "mock",
        }
    }
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SourceMode {
    fn default() -> Self {
        Self::Snapshot
    }
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snapshot" => Ok(SourceMode::Snapshot),
            "remote" => Ok(SourceMode::Remote),
            "mock" => Ok(SourceMode::Mock),
            other => Err(format!(
                "Invalid source mode: '{}'. Valid values: snapshot, remote, mock",
                other
            )),
        }
    }
}

/// Catalog source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source variant; chosen once per session.
    #[serde(default)]
    pub mode: SourceMode,

    /// Payload path for the snapshot variant.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Base URL for the remote variant.
    #[serde(default = "default_remote_url")]
    pub remote_url: String,

    /// Per-request timeout for the remote variant.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/techniques.json")
}

fn default_remote_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::default(),
            snapshot_path: default_snapshot_path(),
            remote_url: default_remote_url(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

/// Main Tessa configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TessaConfig {
    #[serde(default)]
    pub source: SourceConfig,
}

impl TessaConfig {
    /// Default user config path: ~/.config/tessa/config.toml
    pub fn user_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("XDG_CONFIG_HOME"))
            .context("Cannot determine home directory")?;

        let config_dir = if home.contains("/.config") {
            PathBuf::from(home)
        } else {
            Path::new(&home).join(".config")
        };

        Ok(config_dir.join("tessa").join("config.toml"))
    }

    /// System config path: /etc/tessa/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/tessa/config.toml")
    }

    /// Load configuration.
    ///
    /// Priority:
    /// 1. User config (~/.config/tessa/config.toml)
    /// 2. System config (/etc/tessa/config.toml)
    /// 3. Defaults
    ///
    /// TESSA_SOURCE, TESSA_SNAPSHOT_PATH and TESSA_REMOTE_URL override
    /// whatever the file said.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        if let Ok(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::parse_file(&user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::parse_file(&system_path);
        }

        Ok(Self::default())
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(mode) = std::env::var("TESSA_SOURCE") {
            self.source.mode = mode
                .parse::<SourceMode>()
                .map_err(|e| anyhow::anyhow!("TESSA_SOURCE: {}", e))?;
        }
        if let Ok(path) = std::env::var("TESSA_SNAPSHOT_PATH") {
            self.source.snapshot_path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("TESSA_REMOTE_URL") {
            self.source.remote_url = url;
        }
        Ok(())
    }

    /// Save configuration to the user config file.
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(&path, toml_string)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_the_snapshot_source() {
        let config = TessaConfig::default();
        assert_eq!(config.source.mode, SourceMode::Snapshot);
        assert_eq!(config.source.snapshot_path, PathBuf::from("data/techniques.json"));
        assert_eq!(config.source.request_timeout_secs, 10);
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Remote".parse::<SourceMode>(), Ok(SourceMode::Remote));
        assert_eq!("MOCK".parse::<SourceMode>(), Ok(SourceMode::Mock));
        assert!("live".parse::<SourceMode>().is_err());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: TessaConfig = toml::from_str(
            r#"
            [source]
            mode = "remote"
            remote_url = "https://techniques.example.org"
            "#,
        )
        .unwrap();
        assert_eq!(config.source.mode, SourceMode::Remote);
        assert_eq!(config.source.remote_url, "https://techniques.example.org");
        assert_eq!(config.source.request_timeout_secs, 10);
    }
}
