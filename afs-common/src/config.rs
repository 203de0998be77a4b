//! Bootstrap configuration and root folder resolution
//!
//! Configuration sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`AFS_ROOT_FOLDER`, `AFS_PORT`, `AFS_CONFIG`)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! A missing TOML file is not an error: defaults apply and the caller logs a
//! warning.
//! A TOML file that exists but cannot be parsed is a [`Error::Config`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "AFS_ROOT_FOLDER";

/// Environment variable naming the TOML config file
pub const CONFIG_FILE_ENV: &str = "AFS_CONFIG";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5780;

/// Database file name inside the root folder
pub const DATABASE_FILENAME: &str = "afs.db";

/// Where [`TomlConfig::load_or_default`] got its values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// File named by `--config` or `AFS_CONFIG` does not exist; defaults apply
    Missing(PathBuf),
    /// No file named and none in the standard locations
    Defaults,
}

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the database (and anything else the service writes)
    pub root_folder: Option<PathBuf>,

    /// Explicit database file; overrides `<root_folder>/afs.db`
    pub database_path: Option<PathBuf>,

    pub server: ServerConfig,

    pub logging: LoggingConfig,

    pub analysis: AnalysisConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests running longer than this are aborted with 408
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            request_timeout_secs: 60,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Which implementation backs the toxicity stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToxicityBackend {
    /// External toxicity classifier
    Model,
    /// No classifier; every evaluation fails open
    Disabled,
}

/// Which implementation backs the sentiment stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBackend {
    /// External sequence-classification model, keyword fallback on failure
    Model,
    /// Keyword tables only
    Keyword,
}

/// Which implementation backs the summarization stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerBackend {
    /// External abstractive summarizer, truncation fallback on failure
    Model,
    /// Truncation only
    Truncation,
}

/// Analysis pipeline configuration
///
/// One struct describes every stage's backing implementation; the service
/// builds its pipeline from this at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Base URL of the inference server hosting the models
    pub inference_url: String,
    /// Per-call timeout for model requests
    pub model_timeout_secs: u64,
    pub toxicity: ToxicityBackend,
    pub sentiment: SentimentBackend,
    pub summarizer: SummarizerBackend,
    pub toxicity_model: String,
    pub sentiment_model: String,
    pub summarization_model: String,
    /// Generation bound passed to the summarizer (tokens)
    pub summary_max_length: u32,
    /// Generation bound passed to the summarizer (tokens)
    pub summary_min_length: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            inference_url: "http://127.0.0.1:8080".to_string(),
            model_timeout_secs: 30,
            toxicity: ToxicityBackend::Model,
            sentiment: SentimentBackend::Model,
            summarizer: SummarizerBackend::Model,
            toxicity_model: "unitary/toxic-bert".to_string(),
            sentiment_model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            summarization_model: "facebook/bart-large-cnn".to_string(),
            summary_max_length: 90,
            summary_min_length: 20,
        }
    }
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Locate and load the config file, falling back to defaults when absent
    ///
    /// Nothing is logged here: this runs before the tracing subscriber exists,
    /// so the caller reports the returned [`ConfigSource`] once logging is up.
    pub fn load_or_default(cli_path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match locate_config_file(cli_path) {
            Some(path) if path.exists() => {
                let config = Self::load(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            Some(path) => Ok((Self::default(), ConfigSource::Missing(path))),
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// Database file location for a resolved root folder
    pub fn database_path(&self, root_folder: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| root_folder.join(DATABASE_FILENAME))
    }
}

/// Config file lookup: CLI → `AFS_CONFIG` → user config dir → /etc
///
/// Explicit locations (CLI, env) are returned even when they do not exist so the
/// caller can warn about them; implicit locations are only returned if present.
pub fn locate_config_file(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("afs").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/afs/config.toml");
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Root folder resolution: CLI → `AFS_ROOT_FOLDER` → TOML → OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("afs"))
        .unwrap_or_else(|| PathBuf::from("./afs_data"))
}

/// Create the root folder if it does not exist yet
pub fn ensure_directory_exists(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(())
}
