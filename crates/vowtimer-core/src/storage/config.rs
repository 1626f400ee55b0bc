//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Session length and content rotation interval
//! - Which content (quotes or poems) is shown during a session
//! - Storage time budget
//! - Terminal colour palette
//!
//! Configuration is stored at `~/.config/vowtimer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::content::DisplayMode;
use crate::error::{ConfigError, Result};

/// Session timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_duration_min")]
    pub duration_min: u64,
    /// Seconds between quote/poem changes while the timer runs.
    #[serde(default = "default_rotation_interval_secs")]
    pub rotation_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    #[serde(default)]
    pub mode: DisplayMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Upper bound for any single persistence call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Colour palette as `#rrggbb` strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default = "default_secondary")]
    pub secondary: String,
    #[serde(default = "default_muted")]
    pub muted: String,
    #[serde(default = "default_gold")]
    pub gold: String,
    #[serde(default = "default_success")]
    pub success: String,
    #[serde(default = "default_warning")]
    pub warning: String,
    #[serde(default = "default_danger")]
    pub danger: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/vowtimer/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

// Default functions
fn default_duration_min() -> u64 {
    25
}
fn default_rotation_interval_secs() -> u64 {
    180
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_primary() -> String {
    "#E6DCC7".into() // parchment
}
fn default_secondary() -> String {
    "#A9A393".into() // ash
}
fn default_muted() -> String {
    "#7C776C".into()
}
fn default_gold() -> String {
    "#DAA520".into()
}
fn default_success() -> String {
    "#5FD75F".into()
}
fn default_warning() -> String {
    "#FFAF00".into()
}
fn default_danger() -> String {
    "#FF3030".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration_min: default_duration_min(),
            rotation_interval_secs: default_rotation_interval_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            muted: default_muted(),
            gold: default_gold(),
            success: default_success(),
            warning: default_warning(),
            danger: default_danger(),
        }
    }
}

impl ThemeConfig {
    fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("theme.primary", &self.primary),
            ("theme.secondary", &self.secondary),
            ("theme.muted", &self.muted),
            ("theme.gold", &self.gold),
            ("theme.success", &self.success),
            ("theme.warning", &self.warning),
            ("theme.danger", &self.danger),
        ]
    }
}

/// Parse `#rrggbb` (leading `#` optional) into its components.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.to_string()),
                    _ => return Err(invalid("not a scalar setting".into())),
                };
                obj.insert(part.to_string(), new_value);
                return Ok(());
            }
            current = current.get_mut(part).ok_or_else(unknown)?;
        }
        Err(unknown())
    }

    /// `~/.config/vowtimer/config.toml`
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    /// Reject values the timer and renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("timer.duration_min", self.timer.duration_min),
            ("timer.rotation_interval_secs", self.timer.rotation_interval_secs),
            ("storage.timeout_secs", self.storage.timeout_secs),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        for (key, value) in self.theme.entries() {
            if parse_hex_color(value).is_none() {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("'{value}' is not a #rrggbb colour"),
                });
            }
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. Returns error if key is unknown
    /// or the result does not validate.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn rotation_interval(&self) -> Duration {
        Duration::from_secs(self.timer.rotation_interval_secs)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.duration_min, 25);
        assert_eq!(parsed.display.mode, DisplayMode::Quotes);
        parsed.validate().unwrap();
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timer]\nduration_min = 50\n").unwrap();
        assert_eq!(parsed.timer.duration_min, 50);
        assert_eq!(parsed.timer.rotation_interval_secs, 180);
        assert_eq!(parsed.theme.gold, "#DAA520");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.duration_min").as_deref(), Some("25"));
        assert_eq!(cfg.get("display.mode").as_deref(), Some("quotes"));
        assert!(cfg.get("timer").is_none());
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn set_updates_number_and_enum() {
        let mut cfg = Config::default();
        cfg.set("timer.duration_min", "45").unwrap();
        cfg.set("display.mode", "poems").unwrap();
        assert_eq!(cfg.timer.duration_min, 45);
        assert_eq!(cfg.display.mode, DisplayMode::Poems);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.nonexistent_key", "1").is_err());
        assert!(cfg.set("", "1").is_err());
    }

    #[test]
    fn set_rejects_invalid_values() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.duration_min", "soon").is_err());
        assert!(cfg.set("timer.duration_min", "0").is_err());
        assert!(cfg.set("display.mode", "haiku").is_err());
        assert!(cfg.set("theme.gold", "gold").is_err());
        assert_eq!(cfg.timer.duration_min, 25);
    }

    #[test]
    fn hex_colours_parse() {
        assert_eq!(parse_hex_color("#DAA520"), Some((0xDA, 0xA5, 0x20)));
        assert_eq!(parse_hex_color("e6dcc7"), Some((0xE6, 0xDC, 0xC7)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer.duration_min, 25);
        assert!(path.exists());

        let mut cfg = cfg;
        cfg.set("timer.rotation_interval_secs", "60").unwrap();
        cfg.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.rotation_interval(), Duration::from_secs(60));
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\nduration_min = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
