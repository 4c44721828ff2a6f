//! Application configuration for the KM portal.
//!
//! User config lives at `~/.kmportal/kmportal.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PortalError, Result};
use crate::taxonomy::Locale;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "kmportal.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".kmportal";

/// Shortest search text that activates the explorer's text predicate.
pub const DEFAULT_MIN_QUERY_CHARS: usize = 2;

// ---------------------------------------------------------------------------
// Config structs (matching kmportal.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Explorer behaviour.
    #[serde(default)]
    pub explorer: ExplorerConfig,

    /// Catalog source.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Display language.
    #[serde(default)]
    pub locale: Locale,

    /// Directory holding the contribution snapshot and session file.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "~/.kmportal/data".into()
}

/// `[explorer]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Minimum characters before the search text filters anything.
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            min_query_chars: default_min_query_chars(),
        }
    }
}

fn default_min_query_chars() -> usize {
    DEFAULT_MIN_QUERY_CHARS
}

/// `[catalog]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON catalog replacing the built-in sample catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl AppConfig {
    /// Resolve `defaults.data_dir`, expanding a leading `~/`.
    pub fn data_dir(&self) -> Result<PathBuf> {
        expand_home(&self.defaults.data_dir)
    }
}

/// Expand a leading `~/` against the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| PortalError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.kmportal/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PortalError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.kmportal/kmportal.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PortalError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        PortalError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    if config.explorer.min_query_chars == 0 {
        return Err(PortalError::config(
            "explorer.min_query_chars must be at least 1",
        ));
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PortalError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PortalError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PortalError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("min_query_chars = 2"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.explorer.min_query_chars, DEFAULT_MIN_QUERY_CHARS);
        assert_eq!(parsed.defaults.locale, Locale::En);
        assert!(parsed.catalog.path.is_none());
    }

    #[test]
    fn config_with_overrides() {
        let toml_str = r#"
[defaults]
locale = "id"
data_dir = "/tmp/km"

[explorer]
min_query_chars = 3

[catalog]
path = "/tmp/catalog.json"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.locale, Locale::Id);
        assert_eq!(config.explorer.min_query_chars, 3);
        assert_eq!(config.data_dir().expect("data dir"), PathBuf::from("/tmp/km"));
        assert_eq!(config.catalog.path.as_deref(), Some("/tmp/catalog.json"));
    }

    #[test]
    fn zero_min_query_is_rejected() {
        let path = std::env::temp_dir().join(format!("km_cfg_{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, "[explorer]\nmin_query_chars = 0\n").expect("write");
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("min_query_chars"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn home_expansion_leaves_absolute_paths() {
        assert_eq!(
            expand_home("/var/km").expect("expand"),
            PathBuf::from("/var/km")
        );
    }
}
