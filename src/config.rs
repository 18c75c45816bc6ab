use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "lift.toml";
pub const DEFAULT_DB_PATH: &str = "data/fitness.sqlite";
pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const DEFAULT_IMAGE_BASE_URL: &str =
    "https://raw.githubusercontent.com/yuhonas/free-exercise-db/main/";

/// Resolved settings after flags, environment and file are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: String,
    pub log_level: String,
    pub image_base_url: String,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub db_path: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfigFile {
    #[serde(default)]
    db_path: Option<String>,
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    catalog: RawCatalogSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalogSection {
    #[serde(default)]
    image_base_url: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Toml { path: PathBuf, source: toml::de::Error },
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read config '{}': {}", path.display(), source)
            }
            ConfigError::Toml { path, source } => {
                write!(f, "invalid config TOML in '{}': {}", path.display(), source)
            }
            ConfigError::Invalid(message) => write!(f, "invalid config: {}", message),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl Settings {
    /// Flag or env beats the file, the file beats built-in defaults. A
    /// missing default file is fine; a missing named file is an error.
    pub fn load(overrides: Overrides) -> Result<Self, ConfigError> {
        let file = match &overrides.config_path {
            Some(path) => read_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    read_file(path)?
                } else {
                    RawConfigFile::default()
                }
            }
        };
        Self::merge(file, overrides)
    }

    #[cfg(test)]
    pub(crate) fn from_toml(raw: &str, overrides: Overrides) -> Result<Self, ConfigError> {
        let file: RawConfigFile = toml::from_str(raw).map_err(|source| ConfigError::Toml {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            source,
        })?;
        Self::merge(file, overrides)
    }

    fn merge(file: RawConfigFile, overrides: Overrides) -> Result<Self, ConfigError> {
        let db_path = pick(overrides.db_path, file.db_path, DEFAULT_DB_PATH);
        let log_level = pick(overrides.log_level, file.log_level, DEFAULT_LOG_LEVEL);
        let image_base_url = pick(None, file.catalog.image_base_url, DEFAULT_IMAGE_BASE_URL);

        if db_path.is_empty() {
            return Err(ConfigError::Invalid("db_path must not be empty".to_string()));
        }
        if !image_base_url.starts_with("http://") && !image_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "catalog.image_base_url '{}' must be an http(s) URL",
                image_base_url
            )));
        }

        Ok(Self {
            db_path,
            log_level,
            image_base_url,
        })
    }
}

fn read_file(path: &Path) -> Result<RawConfigFile, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn pick(flag: Option<String>, file: Option<String>, default: &str) -> String {
    flag.or(file)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}
