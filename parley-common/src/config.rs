//! Configuration loading and config file resolution
//!
//! Resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. User config file (`<config dir>/parley/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing or unreadable file is not fatal: the caller gets a warning and
//! the compiled defaults. A file that parses but carries invalid values is.

use crate::identity::{Participants, DEFAULT_PARTICIPANTS};
use crate::locale::Locale;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "PARLEY_CONFIG";

/// Default log level when neither config nor environment sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// On-disk TOML schema; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub participants: Option<Vec<String>>,
    pub locale: Option<String>,
    pub log_level: Option<String>,
    pub directories: Option<Vec<PathBuf>>,
}

/// Resolved settings handed to query construction and the front-ends
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolConfig {
    pub participants: Participants,
    pub locale: Locale,
    pub log_level: String,
    /// Default search directories for file path answers
    pub directories: Vec<PathBuf>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        ProtocolConfig {
            participants: Participants::default(),
            locale: Locale::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            directories: vec![PathBuf::from(".")],
        }
    }
}

impl ProtocolConfig {
    /// Overlay the keys present in `toml` onto the compiled defaults
    pub fn from_toml(toml: TomlConfig) -> Result<Self> {
        let mut config = ProtocolConfig::default();

        if let Some(names) = toml.participants {
            if names.len() < 2 {
                return Err(Error::Config(format!(
                    "at least two participants are required, got {}",
                    names.len()
                )));
            }
            if let Some(blank) = names.iter().find(|name| name.trim().is_empty()) {
                return Err(Error::Config(format!("blank participant name '{}'", blank)));
            }
            config.participants = Participants::new(names);
        }

        if let Some(code) = toml.locale {
            config.locale = Locale::from_code(&code)
                .ok_or_else(|| Error::Config(format!("unsupported locale '{}'", code)))?;
        }

        if let Some(level) = toml.log_level {
            let level = level.to_lowercase();
            if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
                return Err(Error::Config(format!("unknown log level '{}'", level)));
            }
            config.log_level = level;
        }

        if let Some(directories) = toml.directories {
            if !directories.is_empty() {
                config.directories = directories;
            }
        }

        Ok(config)
    }

    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let toml: TomlConfig = toml::from_str(&content)?;
        ProtocolConfig::from_toml(toml)
    }

    /// Resolve the config file and load it, degrading to defaults when no
    /// file can be read
    pub fn resolve(cli_arg: Option<&str>, env_var_name: &str) -> Result<Self> {
        let Some(path) = resolve_config_path(cli_arg, env_var_name) else {
            info!(
                "No config file found, using defaults (participants: {})",
                DEFAULT_PARTICIPANTS.join(", ")
            );
            return Ok(ProtocolConfig::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                info!("Loading config from {}", path.display());
                let toml: TomlConfig = toml::from_str(&content)?;
                ProtocolConfig::from_toml(toml)
            }
            Err(e) => {
                warn!("Cannot read config {}: {}, using defaults", path.display(), e);
                Ok(ProtocolConfig::default())
            }
        }
    }
}

/// Pick the config file following the priority order; None when no
/// candidate is named or present
pub fn resolve_config_path(cli_arg: Option<&str>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: User config file
    user_config_file().filter(|path| path.exists())
}

fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("parley").join("config.toml"))
}
