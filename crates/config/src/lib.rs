pub mod schema;
pub mod watcher;

pub use schema::{
    CalendarConfig, CalendarSourceConfig, GlobalConfig, Position, SidebarConfig, ThemeConfig,
    WeatherConfig,
};
pub use watcher::FileWatcher;

use sidebar_core::{Result, SidebarError};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `SidebarConfig::default()` if
/// the file doesn't exist so the sidebar always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<SidebarConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(SidebarConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| SidebarError::Config(format!("cannot read '{}': {e}", path.display())))?;

    toml::from_str(&raw).map_err(|e| SidebarError::Config(format!("TOML parse error: {e}")))
}

/// Directory holding `sidebar.toml`, honouring `$XDG_CONFIG_HOME`.
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("sidebar")
}

/// Return the default config path.
pub fn default_path() -> PathBuf {
    config_dir().join("sidebar.toml")
}

/// Path of the state snapshot file: the configured one, or `states.json`
/// next to the config file.
pub fn states_path(config: &SidebarConfig) -> PathBuf {
    config
        .global
        .states_file
        .clone()
        .unwrap_or_else(|| config_dir().join("states.json"))
}
