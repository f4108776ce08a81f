//! Run settings: command-line flags, environment, then the config file.
//!
//! clap resolves flag-over-environment; anything still unset falls back to
//! `~/.config/icsync/config.toml` (or `--config`), then to built-in defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::Args;
use serde::Deserialize;

use icsync_core::constants::{DEFAULT_ICS_PATH, DEFAULT_TIMEZONE};
use icsync_core::context::parse_timezone;
use icsync_core::{FieldKey, PropertyOverrides, RetryPolicy, SyncContext, SyncError, TitleStyle};

#[derive(Args, Debug, Default, Clone)]
pub struct GlobalOptions {
    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Target Notion database id
    #[arg(long, env = "NOTION_DATABASE_ID", global = true)]
    pub database_id: Option<String>,

    /// Calendar file to read
    #[arg(long, env = "ICS_PATH", global = true)]
    pub ics_path: Option<PathBuf>,

    /// IANA timezone timestamps are converted into (e.g. "Asia/Tokyo")
    #[arg(long, env = "SYNC_TIMEZONE", global = true)]
    pub timezone: Option<String>,

    /// Where a final score goes in the title: "slash" or "inline"
    #[arg(long, global = true)]
    pub title_style: Option<TitleStyle>,

    /// Config file (default: ~/.config/icsync/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Contents of config.toml. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub ics_path: Option<PathBuf>,
    pub timezone: Option<String>,
    pub title_style: Option<TitleStyle>,
    /// Candidate property names per field, replacing the defaults
    pub properties: BTreeMap<FieldKey, PropertyNames>,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PropertyNames {
    One(String),
    Many(Vec<String>),
}

impl PropertyNames {
    fn into_vec(self) -> Vec<String> {
        match self {
            PropertyNames::One(name) => vec![name],
            PropertyNames::Many(names) => names,
        }
    }
}

impl FileConfig {
    /// ~/.config/icsync/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("icsync").join("config.toml"))
    }

    /// Load `explicit`, or the default path when it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(SyncError::Config(format!(
                    "Config file not found at {}",
                    path.display()
                ))
                .into());
            }
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        tracing::debug!(path = %path.display(), "loading config file");
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| SyncError::Config(e.to_string()).into())
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub ics_path: PathBuf,
    pub timezone: Tz,
    pub title_style: TitleStyle,
    pub properties: PropertyOverrides,
    pub retry: RetryPolicy,
}

impl Settings {
    pub fn load(options: &GlobalOptions) -> Result<Self> {
        let file = FileConfig::load(options.config.as_deref())?;
        Self::resolve(options.clone(), file)
    }

    pub fn resolve(options: GlobalOptions, file: FileConfig) -> Result<Self> {
        let timezone = options
            .timezone
            .or(file.timezone)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        Ok(Settings {
            token: non_blank(options.token.or(file.token)),
            database_id: non_blank(options.database_id.or(file.database_id)),
            ics_path: options
                .ics_path
                .or(file.ics_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ICS_PATH)),
            timezone: parse_timezone(&timezone)?,
            title_style: options.title_style.or(file.title_style).unwrap_or_default(),
            properties: file
                .properties
                .into_iter()
                .map(|(key, names)| (key, names.into_vec()))
                .collect(),
            retry: file.retry,
        })
    }

    /// Token and database id, required by every command that talks to Notion.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.token.as_deref(), self.database_id.as_deref()) {
            (Some(token), Some(database_id)) => Ok((token, database_id)),
            _ => Err(SyncError::Config(
                "NOTION_TOKEN and NOTION_DATABASE_ID are required \
                 (set them in the environment, pass --token/--database-id, or add them to config.toml)"
                    .to_string(),
            )
            .into()),
        }
    }

    /// Read the calendar file; a missing file is a configuration error.
    pub fn read_calendar(&self) -> Result<String> {
        if !self.ics_path.exists() {
            return Err(SyncError::Config(format!(
                "ICS file not found: {}",
                self.ics_path.display()
            ))
            .into());
        }

        std::fs::read_to_string(&self.ics_path)
            .with_context(|| format!("Failed to read {}", self.ics_path.display()))
    }

    /// Context for this run; captures the clock once.
    pub fn context(&self) -> SyncContext {
        SyncContext::new(self.timezone, self.title_style)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Whether `err` should map to the configuration exit code.
pub fn is_config_error(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<SyncError>().is_some_and(SyncError::is_config))
}
