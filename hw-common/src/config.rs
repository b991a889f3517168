//! Configuration loading
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument
//! 2. Environment variable (`HW_ROOT_FOLDER`, `HW_PORT`, `HW_API_BASE`, `HW_UI_LANGUAGE`)
//! 3. TOML config file (`<config dir>/holywritings/config.toml`)
//! 4. Compiled default
//!
//! A missing config file is normal. An unreadable or invalid one is logged
//! and ignored so the service still starts.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::curation::Handoff;
use crate::gateway::DEFAULT_API_BASE;
use crate::{Error, Result};

pub const ROOT_FOLDER_ENV: &str = "HW_ROOT_FOLDER";
pub const PORT_ENV: &str = "HW_PORT";
pub const API_BASE_ENV: &str = "HW_API_BASE";
pub const UI_LANGUAGE_ENV: &str = "HW_UI_LANGUAGE";

pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_UI_LANGUAGE: &str = "en";
pub const DATABASE_FILE: &str = "holywritings.db";

/// Contents of `config.toml`; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub api_base: Option<String>,
    pub ui_language: Option<String>,
    pub handoff: Handoff,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub api_base: Option<String>,
    pub ui_language: Option<String>,
    pub config_file: Option<PathBuf>,
}

/// Fully resolved service settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root_folder: PathBuf,
    pub port: u16,
    pub api_base: String,
    pub ui_language: String,
    pub handoff: Handoff,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_folder: default_root_folder(),
            port: DEFAULT_PORT,
            api_base: DEFAULT_API_BASE.to_string(),
            ui_language: DEFAULT_UI_LANGUAGE.to_string(),
            handoff: Handoff::default(),
            log_level: LoggingConfig::default().level,
        }
    }
}

impl Settings {
    /// Resolve settings from the CLI, the environment and the config file
    pub fn load(cli: &CliOverrides) -> Settings {
        let path = cli.config_file.clone().or_else(default_config_path);
        let toml = match path {
            Some(path) if path.exists() => match load_toml(&path) {
                Ok(config) => {
                    info!(path = %path.display(), "Loaded config file");
                    Some(config)
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring invalid config file");
                    None
                }
            },
            _ => None,
        };
        Self::resolve(cli, toml.as_ref())
    }

    /// Merge sources in priority order
    pub fn resolve(cli: &CliOverrides, toml: Option<&TomlConfig>) -> Settings {
        let defaults = Settings::default();

        let root_folder = cli
            .root_folder
            .clone()
            .or_else(|| env_var(ROOT_FOLDER_ENV).map(PathBuf::from))
            .or_else(|| toml.and_then(|t| t.root_folder.clone()))
            .unwrap_or(defaults.root_folder);

        let port = cli
            .port
            .or_else(|| env_var(PORT_ENV).and_then(|p| parse_port(&p)))
            .or_else(|| toml.and_then(|t| t.port))
            .unwrap_or(defaults.port);

        let api_base = cli
            .api_base
            .clone()
            .or_else(|| env_var(API_BASE_ENV))
            .or_else(|| toml.and_then(|t| t.api_base.clone()))
            .unwrap_or(defaults.api_base);

        let ui_language = cli
            .ui_language
            .clone()
            .or_else(|| env_var(UI_LANGUAGE_ENV))
            .or_else(|| toml.and_then(|t| t.ui_language.clone()))
            .map(|l| primary_subtag(&l))
            .unwrap_or(defaults.ui_language);

        Settings {
            root_folder,
            port,
            api_base: api_base.trim_end_matches('/').to_string(),
            ui_language,
            handoff: toml.map(|t| t.handoff.clone()).unwrap_or(defaults.handoff),
            log_level: toml.map(|t| t.logging.level.clone()).unwrap_or(defaults.log_level),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}

/// Parse a config file
pub fn load_toml(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// `<config dir>/holywritings/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("holywritings").join("config.toml"))
}

/// OS data directory for the store, `./holywritings_data` as a last resort
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("holywritings"))
        .unwrap_or_else(|| PathBuf::from("./holywritings_data"))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_port(value: &str) -> Option<u16> {
    match value.trim().parse() {
        Ok(port) => Some(port),
        Err(_) => {
            warn!(value = %value, "Ignoring invalid port");
            None
        }
    }
}

/// `pt-BR` -> `pt`
fn primary_subtag(language: &str) -> String {
    language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
