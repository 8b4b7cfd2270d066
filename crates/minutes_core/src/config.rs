//! Application configuration.
//!
//! # Responsibility
//! - Load `config.toml` with per-field defaults.
//! - Derive database, log and export locations from it.
//!
//! # Invariants
//! - A missing file is not an error; every field falls back to its default.

use crate::logging::default_log_level;
use crate::storage::envelope::STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "minutes";
const CONFIG_FILE_NAME: &str = "config.toml";
const DATABASE_FILE_NAME: &str = "minutes.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "MINUTES_CONFIG";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinutesConfig {
    /// Directory holding the database and logs.
    pub data_dir: PathBuf,
    /// Where exported PDFs are written.
    pub export_dir: PathBuf,
    pub log_level: String,
    /// Slot key the meeting list is persisted under.
    pub storage_key: String,
    /// Seed the sample meetings into an empty store.
    pub seed_sample_meetings: bool,
    pub font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,
}

impl Default for MinutesConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        let export_dir = dirs::download_dir().unwrap_or_else(|| data_dir.join("exports"));
        Self {
            data_dir,
            export_dir,
            log_level: default_log_level().to_string(),
            storage_key: STORAGE_KEY.to_string(),
            seed_sample_meetings: true,
            font_path: None,
            bold_font_path: None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

impl MinutesConfig {
    /// Loads `path`, or defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads from `MINUTES_CONFIG`, else the per-user config directory.
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

/// Config file location: `MINUTES_CONFIG`, else `<config_dir>/minutes/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::MinutesConfig;
    use std::path::PathBuf;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let config = MinutesConfig::from_toml_str(
            r#"
data_dir = "/srv/minutes"
seed_sample_meetings = false
"#,
        )
        .expect("partial config should parse");

        assert_eq!(config.data_dir, PathBuf::from("/srv/minutes"));
        assert!(!config.seed_sample_meetings);
        assert_eq!(config.storage_key, "minutes-pro-storage");
        assert_eq!(
            config.database_path(),
            PathBuf::from("/srv/minutes/minutes.sqlite3")
        );
        assert_eq!(config.log_dir(), PathBuf::from("/srv/minutes/logs"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = MinutesConfig::load(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config, MinutesConfig::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "seed_sample_meetings = \"maybe\"").expect("write config");

        let error = MinutesConfig::load(&path).expect_err("wrong type should fail");
        assert!(error.to_string().contains("failed to parse config"));
    }
}
