//! # Application Configuration
//!
//! Settings are layered: built-in defaults, then an optional `config.yml` (with
//! `${VAR}` substitution), then plain environment variables such as `SERVER_PORT`
//! or `LLM_BASE_URL`. A `.env` file is loaded by `start` before this runs.

use autolinker::constants::{DEFAULT_LLM_API_KEY, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL};
use autolinker_pdf::{marker::DEFAULT_MARKER_COMMAND, DEFAULT_ARXIV_API_URL};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::info;

/// Environment variable naming an alternative YAML config file.
pub const CONFIG_PATH_ENV: &str = "AUTOLINKER_CONFIG";
/// Vault used when neither vault path is configured.
pub const DEFAULT_VAULT_DIR: &str = "./vault";

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").expect("static regex is valid")
});

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    General(#[from] config::ConfigError),
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which `PdfConverter` the pipeline uses.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// The built-in text-layer extractor.
    #[default]
    Text,
    /// The external `marker` tool.
    Marker,
}

/// The root configuration structure.
///
/// `Debug` output redacts the LLM API key.
#[derive(Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_llm_api_key")]
    pub llm_api_key: String,
    #[serde(default = "default_llm_model_name")]
    pub llm_model_name: String,
    /// The vault as seen from outside a container.
    #[serde(default)]
    pub vault_path: Option<String>,
    /// The vault as mounted inside a container. Wins over `vault_path`.
    #[serde(default)]
    pub vault_path_internal: Option<String>,
    /// Where uploads are staged until their pipeline run finishes.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default)]
    pub pdf_converter: ConverterKind,
    #[serde(default = "default_marker_command")]
    pub marker_command: String,
    #[serde(default = "default_metadata_api_url")]
    pub metadata_api_url: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_llm_base_url() -> String {
    DEFAULT_LLM_BASE_URL.to_string()
}
fn default_llm_api_key() -> String {
    DEFAULT_LLM_API_KEY.to_string()
}
fn default_llm_model_name() -> String {
    DEFAULT_LLM_MODEL.to_string()
}
fn default_upload_dir() -> String {
    "temp_uploads".to_string()
}
fn default_marker_command() -> String {
    DEFAULT_MARKER_COMMAND.to_string()
}
fn default_metadata_api_url() -> String {
    DEFAULT_ARXIV_API_URL.to_string()
}

impl AppConfig {
    /// The vault root: `vault_path_internal`, else `vault_path`, else `./vault`.
    pub fn vault_root(&self) -> PathBuf {
        [&self.vault_path_internal, &self.vault_path]
            .into_iter()
            .flatten()
            .map(|p| p.trim())
            .find(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VAULT_DIR))
    }

    /// The API key to send, or `None` when it is blank.
    pub fn llm_api_key(&self) -> Option<String> {
        Some(self.llm_api_key.trim().to_string()).filter(|k| !k.is_empty())
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.llm_api_key().is_some() {
            "<redacted>"
        } else {
            ""
        };
        f.debug_struct("AppConfig")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_api_key", &api_key)
            .field("llm_model_name", &self.llm_model_name)
            .field("vault_path", &self.vault_path)
            .field("vault_path_internal", &self.vault_path_internal)
            .field("upload_dir", &self.upload_dir)
            .field("pdf_converter", &self.pdf_converter)
            .field("marker_command", &self.marker_command)
            .field("metadata_api_url", &self.metadata_api_url)
            .finish()
    }
}

// Reads a file and substitutes `${VAR}` placeholders from the environment.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;

    let expanded = ENV_PLACEHOLDER.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded.into_owned()))
}

/// Loads the application configuration.
///
/// The YAML file is `config_path_override`, else `$AUTOLINKER_CONFIG`, else
/// `config.yml` in the working directory; a missing file is not an error.
/// Environment variables override file values (`SERVER_PORT` -> `server_port`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let config_path = config_path_override
        .map(str::to_string)
        .or_else(|| env::var(CONFIG_PATH_ENV).ok())
        .unwrap_or_else(|| "config.yml".to_string());

    let mut builder = ConfigBuilder::builder();
    if let Some(content) = read_and_substitute(&config_path)? {
        info!("Loading configuration from '{config_path}'.");
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(Environment::default().try_parsing(true))
        .build()?;

    Ok(settings.try_deserialize()?)
}
