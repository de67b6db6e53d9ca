//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - default time range and optional fixed seed for divination
//! - task analyzer thresholds
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::divination::TimeRange;
use crate::error::ConfigError;

/// Divination defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DivinationConfig {
    #[serde(default = "default_min_minutes")]
    pub min_minutes: u32,
    #[serde(default = "default_max_minutes")]
    pub max_minutes: u32,
    /// Fixed RNG seed. Unset means a fresh seed per draw.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Task analyzer thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Estimates above this many minutes are flagged as too long.
    #[serde(default = "default_long_task_minutes")]
    pub long_task_minutes: u32,
    /// Names shorter than this that use a vague verb are flagged.
    #[serde(default = "default_vague_name_chars")]
    pub vague_name_chars: usize,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub divination: DivinationConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

fn default_min_minutes() -> u32 {
    TimeRange::DEFAULT_MIN_MINUTES
}
fn default_max_minutes() -> u32 {
    TimeRange::DEFAULT_MAX_MINUTES
}
fn default_true() -> bool {
    true
}
fn default_long_task_minutes() -> u32 {
    60
}
fn default_vague_name_chars() -> usize {
    20
}

impl Default for DivinationConfig {
    fn default() -> Self {
        Self {
            min_minutes: default_min_minutes(),
            max_minutes: default_max_minutes(),
            seed: None,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            long_task_minutes: default_long_task_minutes(),
            vague_name_chars: default_vague_name_chars(),
        }
    }
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
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            if existing.is_object() || existing.is_array() {
                return Err(invalid("cannot replace a whole section".to_string()));
            }

            // Empty or "none" clears optional fields; `from_value` rejects
            // null for the required ones.
            let new_value = match (existing, value.trim()) {
                (_, "" | "none" | "null") => serde_json::Value::Null,
                (serde_json::Value::Bool(_), v) => serde_json::Value::Bool(
                    v.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                (serde_json::Value::Number(_) | serde_json::Value::Null, v) => {
                    serde_json::Value::Number(
                        v.parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{v}' as number")))?
                            .into(),
                    )
                }
                _ => serde_json::Value::String(value.to_string()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default config file location.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from the default location, writing defaults if the file is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults if the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
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
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.range().is_valid() {
            return Err(ConfigError::InvalidValue {
                key: "divination".to_string(),
                message: format!(
                    "min_minutes ({}) must not exceed max_minutes ({})",
                    self.divination.min_minutes, self.divination.max_minutes
                ),
            });
        }
        if self.divination.seed.is_some_and(|seed| seed > i64::MAX as u64) {
            return Err(ConfigError::InvalidValue {
                key: "divination.seed".to_string(),
                message: format!("must not exceed {}", i64::MAX),
            });
        }
        Ok(())
    }

    /// Default divination range.
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.divination.min_minutes, self.divination.max_minutes)
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
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.range(), TimeRange::new(90, 150));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[divination]\nmin_minutes = 30\n").unwrap();
        assert_eq!(parsed.divination.min_minutes, 30);
        assert_eq!(parsed.divination.max_minutes, 150);
        assert!(parsed.analyzer.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("divination.min_minutes").as_deref(), Some("90"));
        assert_eq!(cfg.get("analyzer.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("divination.seed").as_deref(), Some("null"));
        assert!(cfg.get("divination.missing").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_number_and_bool() {
        let mut cfg = Config::default();
        cfg.set("divination.max_minutes", "200").unwrap();
        cfg.set("analyzer.enabled", "false").unwrap();
        assert_eq!(cfg.divination.max_minutes, 200);
        assert!(!cfg.analyzer.enabled);
    }

    #[test]
    fn set_and_clear_optional_seed() {
        let mut cfg = Config::default();
        cfg.set("divination.seed", "1234").unwrap();
        assert_eq!(cfg.divination.seed, Some(1234));
        cfg.set("divination.seed", "none").unwrap();
        assert_eq!(cfg.divination.seed, None);
        assert!(cfg.set("divination.seed", "abc").is_err());

        cfg.set("divination.seed", "99").unwrap();
        cfg.set("divination.seed", "").unwrap();
        assert_eq!(cfg.divination.seed, None);
    }

    #[test]
    fn set_refuses_to_clear_required_fields() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("divination.min_minutes", "none"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("analyzer.enabled", ""),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("divination.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("analyzer.enabled", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set("divination", "1").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_rejects_inverted_range() {
        let mut cfg = Config::default();
        let err = cfg.set("divination.min_minutes", "500").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(cfg.divination.min_minutes, 90);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_and_load_preserve_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.set("divination.min_minutes", "45").unwrap();
        cfg.set("divination.seed", "7").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.divination.min_minutes, 45);
        assert_eq!(loaded.divination.seed, Some(7));
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "divination = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
