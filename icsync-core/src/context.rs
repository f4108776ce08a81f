//! Per-run resolution context.
//!
//! Everything the resolver would otherwise read from the environment or the
//! clock lives here, built once per run and passed down explicitly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_EVENT_HOURS;
use crate::error::{SyncError, SyncResult};

/// How a finished match's score is placed in the display title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleStyle {
    /// `A vs B／4-0`
    #[default]
    Slash,
    /// `A 4-0 B`
    Inline,
}

impl FromStr for TitleStyle {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slash" => Ok(TitleStyle::Slash),
            "inline" => Ok(TitleStyle::Inline),
            other => Err(SyncError::Config(format!(
                "Unknown title style '{other}'. Expected 'slash' or 'inline'"
            ))),
        }
    }
}

impl fmt::Display for TitleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleStyle::Slash => write!(f, "slash"),
            TitleStyle::Inline => write!(f, "inline"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncContext {
    /// Zone every timestamp is converted into.
    pub timezone: Tz,
    /// Captured once; all records of a run share this baseline.
    pub now: DateTime<Tz>,
    pub title_style: TitleStyle,
    /// Assumed length of an event without DTEND.
    pub default_duration: Duration,
}

impl SyncContext {
    pub fn new(timezone: Tz, title_style: TitleStyle) -> Self {
        Self::at(Utc::now().with_timezone(&timezone), title_style)
    }

    /// Context with a fixed clock.
    pub fn at(now: DateTime<Tz>, title_style: TitleStyle) -> Self {
        SyncContext {
            timezone: now.timezone(),
            now,
            title_style,
            default_duration: Duration::hours(DEFAULT_EVENT_HOURS),
        }
    }
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Tokyo, TitleStyle::default())
    }
}

/// Parse an IANA zone name such as `Asia/Tokyo`.
pub fn parse_timezone(name: &str) -> SyncResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| SyncError::Config(format!("Unknown timezone '{name}': {e}")))
}
