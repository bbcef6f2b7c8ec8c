//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::MarketConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable pointing at the configuration file.
pub const CONFIG_ENV_VAR: &str = "YAM_CONFIG";

/// File looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "yam-market.toml";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MarketConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<MarketConfig, ConfigError> {
    let config: MarketConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the configuration path: explicit argument, then `YAM_CONFIG`, then
/// `yam-market.toml` in the working directory.
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load the configuration, falling back to defaults when the file does not exist.
///
/// An explicitly named file that is missing is still an error.
pub fn load_or_default(explicit: Option<&Path>) -> Result<MarketConfig, ConfigError> {
    let path = resolve_path(explicit);
    if explicit.is_none() && !path.exists() {
        tracing::info!(path = %path.display(), "No configuration file found, using defaults");
        return Ok(MarketConfig::default());
    }
    let config = load_config(&path)?;
    tracing::info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}
