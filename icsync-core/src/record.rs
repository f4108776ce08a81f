//! The fully resolved match record written downstream.

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// Whether a match is still upcoming or already has a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatusKind {
    Scheduled,
    Result,
}

impl StatusKind {
    /// Token written to the external store.
    pub fn label(&self) -> &'static str {
        match self {
            StatusKind::Scheduled => "予定",
            StatusKind::Result => "結果",
        }
    }
}

impl FromStr for StatusKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "予定" | "Scheduled" => Ok(StatusKind::Scheduled),
            "結果" | "Result" => Ok(StatusKind::Result),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How settled the fixture details are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Certainty {
    Confirmed,
    Provisional,
    Unknown,
}

impl Certainty {
    pub fn label(&self) -> &'static str {
        match self {
            Certainty::Confirmed => "確定",
            Certainty::Provisional => "暫定",
            Certainty::Unknown => "未定",
        }
    }
}

impl FromStr for Certainty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "確定" | "Confirmed" => Ok(Certainty::Confirmed),
            "暫定" | "Provisional" => Ok(Certainty::Provisional),
            "未定" | "Unknown" => Ok(Certainty::Unknown),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Certainty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A match as it should appear in the external store.
///
/// Recomputed from scratch every run. `fingerprint` covers every field below
/// except itself and is only used to decide whether a write is needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub uid: String,
    pub display_title: String,
    pub summary: String,
    pub start: DateTime<Tz>,
    pub end: Option<DateTime<Tz>>,
    pub tournament: String,
    pub round: String,
    pub venue: String,
    pub status_kind: StatusKind,
    pub status_certainty: Certainty,
    pub home: String,
    pub away: String,
    pub matchup: String,
    pub score: String,
    pub source_url: String,
    pub match_type: String,
    pub fingerprint: String,
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_title)
    }
}
