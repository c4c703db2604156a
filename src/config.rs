//! Run configuration: a TOML file plus environment overrides.
//!
//! The file is looked up in this order: an explicit path, `$HW_RESET_CONFIG`,
//! `./hot-water-reset.toml`, then `<config dir>/hot-water-reset/config.toml`.
//! A `.env` file is loaded into the environment first. `SMAP_URL`, `SMAP_KEY`
//! and `BRICK_MODEL_FILE` override the matching file entries.

use crate::archive::download::DEFAULT_BATCH_SIZE;
use crate::graph::building_graph::Namespaces;
use crate::report::{default_reports, Report};
use crate::types::time_series::TimeWindow;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "HW_RESET_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "hot-water-reset.toml";
const CONFIG_DIR_NAME: &str = "hot-water-reset";
const CONFIG_FILE_NAME: &str = "config.toml";

const URL_ENV: &str = "SMAP_URL";
const KEY_ENV: &str = "SMAP_KEY";
const MODEL_FILE_ENV: &str = "BRICK_MODEL_FILE";

const DEFAULT_URL: &str = "http://localhost:8079";
const DEFAULT_SOURCE_NAME: &str = "Field Study 4";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MODEL_FILE: &str = "dbc_brick_expanded.ttl";
const DEFAULT_WINDOW_START: &str = "2021-09-09T00:00:00Z";
const DEFAULT_WINDOW_END: &str = "2021-09-17T00:00:00Z";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Missing required setting {0}")]
    MissingKey(&'static str),

    #[error("Invalid timestamp '{value}' for {field}; expected RFC 3339 or YYYY-MM-DD")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Time window start {start} is not before end {end}")]
    EmptyWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Config file as written on disk; every entry is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub archive: ArchiveSection,
    pub graph: GraphSection,
    pub window: WindowSection,
    pub output: OutputSection,
    pub reports: Option<Vec<Report>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveSection {
    pub url: Option<String>,
    pub key: Option<String>,
    pub source_name: Option<String>,
    pub batch_size: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphSection {
    pub model_file: Option<PathBuf>,
    pub brick_namespace: Option<String>,
    pub connstring_namespace: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSection {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub dir: Option<PathBuf>,
    pub export_csv: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveSettings {
    pub url: String,
    pub key: String,
    pub source_name: String,
    pub batch_size: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphSettings {
    pub model_file: PathBuf,
    pub namespaces: Namespaces,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub export_csv: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub archive: ArchiveSettings,
    pub graph: GraphSettings,
    pub window: TimeWindow,
    pub output: OutputSettings,
    pub reports: Vec<Report>,
}

impl AppConfig {
    /// Loads `.env`, finds and parses the config file, and applies environment
    /// overrides. Without any config file, defaults plus environment are used.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Ignoring unreadable .env file: {}", e),
        }

        let from_env = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        let file = match locate_config(explicit, from_env) {
            Some(path) => {
                info!("Using config file {}", path.display());
                read_config(&path)?
            }
            None => {
                info!("No config file found; using defaults and environment");
                FileConfig::default()
            }
        };
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Applies defaults and the overrides returned by `env` to a parsed file.
    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let FileConfig {
            archive,
            graph,
            window,
            output,
            reports,
        } = file;

        let batch_size = archive.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "archive.batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        let archive = ArchiveSettings {
            url: env(URL_ENV)
                .or(archive.url)
                .unwrap_or_else(|| DEFAULT_URL.to_string()),
            key: env(KEY_ENV)
                .or(archive.key)
                .filter(|key| !key.is_empty())
                .ok_or(ConfigError::MissingKey("archive.key (or SMAP_KEY)"))?,
            source_name: archive
                .source_name
                .unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string()),
            batch_size,
            timeout: Duration::from_secs(archive.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        };

        let defaults = Namespaces::default();
        let graph = GraphSettings {
            model_file: env(MODEL_FILE_ENV)
                .map(PathBuf::from)
                .or(graph.model_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_FILE)),
            namespaces: Namespaces {
                brick: graph.brick_namespace.unwrap_or(defaults.brick),
                connstring: graph.connstring_namespace.unwrap_or(defaults.connstring),
            },
        };

        let start = parse_timestamp(
            "window.start",
            window.start.as_deref().unwrap_or(DEFAULT_WINDOW_START),
        )?;
        let end = parse_timestamp(
            "window.end",
            window.end.as_deref().unwrap_or(DEFAULT_WINDOW_END),
        )?;
        let window = TimeWindow::new(start, end).ok_or(ConfigError::EmptyWindow { start, end })?;

        let output = OutputSettings {
            dir: output.dir.unwrap_or_else(|| PathBuf::from(".")),
            export_csv: output.export_csv.unwrap_or(true),
        };

        Ok(Self {
            archive,
            graph,
            window,
            output,
            reports: reports.unwrap_or_else(default_reports),
        })
    }
}

/// First existing candidate in lookup order. Explicit and environment paths are
/// returned even when missing so the read error names them.
fn locate_config(explicit: Option<PathBuf>, from_env: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit.or(from_env) {
        return Some(path);
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

pub fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

/// RFC 3339 timestamp, or a bare date taken as midnight UTC.
fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ConfigError> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or(ConfigError::InvalidTimestamp {
                field,
                value: value.to_string(),
                source: rfc_err,
            }),
    }
}
