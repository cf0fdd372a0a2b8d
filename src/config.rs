//! Project configuration module.
//!
//! Handles loading, validating, and merging `docnav.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top of it, so
//! a config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! Place `docnav.toml` in the project directory (the one passed as
//! `--project`, defaulting to the current directory):
//!
//! ```text
//! project/
//! ├── docnav.toml
//! └── docs/
//!     └── articles/            # content_dir
//!         ├── 1.cs/
//!         └── 2.code/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_dir = "docs/articles"  # Relative to the project directory
//!
//! [navbar]
//! home_text = "Home"             # Empty string drops the home entry
//! home_link = "/"
//!
//! [watch]
//! debounce_secs = 10             # Idle seconds before an edit is stamped
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "docnav.toml";

/// Upper bound for `watch.debounce_secs`.
const MAX_DEBOUNCE_SECS: u64 = 3600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `docnav.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Content directory, relative to the project directory.
    pub content_dir: String,
    /// Top navigation settings.
    pub navbar: NavbarConfig,
    /// File watcher settings.
    pub watch: WatchConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: "docs/articles".to_string(),
            navbar: NavbarConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "content_dir must not be empty".into(),
            ));
        }
        let has_home = self
            .navbar
            .home_text
            .as_deref()
            .is_some_and(|t| !t.is_empty());
        if has_home && self.navbar.home_link.trim().is_empty() {
            return Err(ConfigError::Validation(
                "navbar.home_link must not be empty when navbar.home_text is set".into(),
            ));
        }
        if self.watch.debounce_secs > MAX_DEBOUNCE_SECS {
            return Err(ConfigError::Validation(format!(
                "watch.debounce_secs must be at most {MAX_DEBOUNCE_SECS}"
            )));
        }
        Ok(())
    }

    /// Absolute-or-relative path of the content directory.
    pub fn content_path(&self, project: &Path) -> PathBuf {
        project.join(&self.content_dir)
    }
}

/// Top navigation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavbarConfig {
    /// Label of the leading home entry. `None` or empty drops the entry.
    pub home_text: Option<String>,
    /// Target of the home entry.
    pub home_link: String,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            home_text: Some("Home".to_string()),
            home_link: "/".to_string(),
        }
    }
}

/// File watcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Idle period after the last modification before `updatetime` is written.
    pub debounce_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_secs: 10 }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `docnav.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `docnav.toml` in the project directory.
pub fn load_config(project: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(project)?)
}

/// Returns a fully-commented stock `docnav.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# docnav Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Directory holding the categories, relative to this file.
# Its last path component ("articles") prefixes every generated link.
content_dir = "docs/articles"

# ---------------------------------------------------------------------------
# Top navigation
# ---------------------------------------------------------------------------
[navbar]
# Label of the first navbar entry. Set to "" to leave it out.
home_text = "Home"
home_link = "/"

# ---------------------------------------------------------------------------
# File watcher
# ---------------------------------------------------------------------------
[watch]
# Seconds without further edits before a modified file gets a new
# updatetime. Each save restarts the countdown.
debounce_secs = 10
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "docs/articles");
        assert_eq!(config.navbar.home_text.as_deref(), Some("Home"));
        assert_eq!(config.navbar.home_link, "/");
        assert_eq!(config.watch.debounce(), Duration::from_secs(10));
    }

    #[test]
    fn parse_partial_config() {
        let config: SiteConfig = toml::from_str("[watch]\ndebounce_secs = 30\n").unwrap();
        assert_eq!(config.watch.debounce_secs, 30);
        assert_eq!(config.content_dir, "docs/articles");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
content_dir = "content"

[navbar]
home_text = "首页"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.navbar.home_text.as_deref(), Some("首页"));
        // Unspecified values keep their defaults
        assert_eq!(config.navbar.home_link, "/");
        assert_eq!(config.watch.debounce_secs, 10);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[watch]\ndebounce = 3\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn validate_empty_content_dir() {
        let config = SiteConfig {
            content_dir: " ".into(),
            ..SiteConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_home_link_required_with_home_text() {
        let mut config = SiteConfig::default();
        config.navbar.home_link = String::new();
        assert!(config.validate().is_err());

        config.navbar.home_text = Some(String::new());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_debounce_upper_bound() {
        let mut config = SiteConfig::default();
        config.watch.debounce_secs = MAX_DEBOUNCE_SECS + 1;
        assert!(config.validate().is_err());
        config.watch.debounce_secs = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn content_path_joins_project() {
        let config = SiteConfig::default();
        assert_eq!(
            config.content_path(Path::new("/site")),
            PathBuf::from("/site/docs/articles")
        );
    }

    #[test]
    fn stock_config_toml_matches_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, SiteConfig::default());
    }
}
