//! Runtime configuration loaded from TOML.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::name::NameMatch;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "KATAMARI_CONFIG";

/// Config file looked up in the working directory when no override is set.
pub const DEFAULT_CONFIG_FILE: &str = "katamari.toml";

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// How the front end renders dispatch outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Top-level katamari configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KatamariConfig {
    /// Match command names without regard to ASCII case.
    pub case_insensitive: bool,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: Option<String>,
    pub output: OutputFormat,
    /// Prompt printed before each line in interactive mode.
    pub prompt: String,
}

impl Default for KatamariConfig {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            log_level: None,
            output: OutputFormat::Text,
            prompt: "katamari> ".to_string(),
        }
    }
}

impl KatamariConfig {
    /// Parse and validate a config from TOML source.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&source)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Locate and load the active config.
    ///
    /// An explicit path (normally from [`CONFIG_ENV`]) must exist. Otherwise
    /// `katamari.toml` in `dir` is used if present, else defaults.
    pub fn discover(explicit: Option<PathBuf>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(&path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        log::debug!("No config file found; using defaults");
        Ok(Self::default())
    }

    /// The name-matching policy this config selects.
    pub fn name_match(&self) -> NameMatch {
        if self.case_insensitive {
            NameMatch::CaseInsensitive
        } else {
            NameMatch::Exact
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = &self.log_level
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            return Err(ConfigError::Invalid(format!(
                "unknown log_level {level:?} (expected one of {})",
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = KatamariConfig::default();
        assert!(!cfg.case_insensitive);
        assert_eq!(cfg.output, OutputFormat::Text);
        assert_eq!(cfg.prompt, "katamari> ");
        assert_eq!(cfg.name_match(), NameMatch::Exact);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            KatamariConfig::from_toml("").unwrap(),
            KatamariConfig::default()
        );
    }

    #[test]
    fn parse_all_fields() {
        let cfg = KatamariConfig::from_toml(
            r#"
            case_insensitive = true
            log_level = "debug"
            output = "json"
            prompt = "> "
            "#,
        )
        .unwrap();
        assert!(cfg.case_insensitive);
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.output, OutputFormat::Json);
        assert_eq!(cfg.prompt, "> ");
        assert_eq!(cfg.name_match(), NameMatch::CaseInsensitive);
    }

    #[test]
    fn unknown_key_rejected() {
        let err = KatamariConfig::from_toml("colour = true").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn bad_log_level_rejected() {
        let err = KatamariConfig::from_toml(r#"log_level = "loud""#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(format!("{err}").contains("loud"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "output = \"json\"\n").unwrap();
        let cfg = KatamariConfig::load(&path).unwrap();
        assert_eq!(cfg.output, OutputFormat::Json);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = KatamariConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn discover_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "prompt = \"local\"").unwrap();
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "prompt = \"explicit\"").unwrap();
        let cfg = KatamariConfig::discover(Some(explicit), dir.path()).unwrap();
        assert_eq!(cfg.prompt, "explicit");
    }

    #[test]
    fn discover_falls_back_to_working_dir_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "prompt = \"local\"").unwrap();
        let cfg = KatamariConfig::discover(None, dir.path()).unwrap();
        assert_eq!(cfg.prompt, "local");
    }

    #[test]
    fn discover_without_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = KatamariConfig::discover(None, dir.path()).unwrap();
        assert_eq!(cfg, KatamariConfig::default());
    }

    #[test]
    fn discover_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = KatamariConfig::discover(Some(dir.path().join("gone.toml")), dir.path());
        assert!(result.is_err());
    }
}
