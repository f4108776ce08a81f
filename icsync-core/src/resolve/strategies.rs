//! Ordered fallback strategies per resolved field.
//!
//! Each strategy is a pure function of the event's text sources. The resolver
//! walks a field's list in order and keeps the first hit, so supporting a new
//! calendar convention means adding one function to one list.

use crate::constants::VENUE_UNKNOWN_MARKER;
use crate::labels::{LabelKey, ParsedLabels};
use crate::record::Certainty;
use crate::resolve::matchup::{split_around_score, split_versus};

/// Inputs every strategy may look at.
pub struct Sources<'a> {
    pub labels: &'a ParsedLabels,
    pub summary: &'a str,
    pub location: &'a str,
}

impl<'a> Sources<'a> {
    /// Fullwidth-slash segments of the summary (`大阪府／大会／第1節／A vs B`).
    pub fn summary_segments(&self) -> Vec<&'a str> {
        self.summary.split('／').map(str::trim).collect()
    }

    /// The part of the summary that describes the fixture itself.
    pub fn fixture_text(&self) -> &'a str {
        self.summary.rsplit('／').next().unwrap_or(self.summary).trim()
    }
}

pub type TextStrategy = fn(&Sources<'_>) -> Option<String>;
pub type TeamsStrategy = fn(&Sources<'_>) -> Option<(String, String)>;

/// Evaluate strategies in priority order until one succeeds.
pub fn first_of<T>(strategies: &[fn(&Sources<'_>) -> Option<T>], sources: &Sources<'_>) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(sources))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn label(sources: &Sources<'_>, key: LabelKey) -> Option<String> {
    sources.labels.get(key).and_then(non_empty)
}

// Tournament

fn tournament_label(sources: &Sources<'_>) -> Option<String> {
    label(sources, LabelKey::Tournament)
}

/// Old summaries: `大阪府／大会名／ラウンド…`
fn tournament_summary_segment(sources: &Sources<'_>) -> Option<String> {
    sources.summary_segments().get(1).copied().and_then(non_empty)
}

fn tournament_whole_summary(sources: &Sources<'_>) -> Option<String> {
    non_empty(sources.summary)
}

pub const TOURNAMENT: &[TextStrategy] = &[
    tournament_label,
    tournament_summary_segment,
    tournament_whole_summary,
];

// Round

fn round_label(sources: &Sources<'_>) -> Option<String> {
    label(sources, LabelKey::Round)
}

/// Third summary segment, unless that segment is the fixture itself.
fn round_summary_segment(sources: &Sources<'_>) -> Option<String> {
    let segment = *sources.summary_segments().get(2)?;
    if split_versus(segment).is_some() || split_around_score(segment).is_some() {
        return None;
    }
    non_empty(segment)
}

pub const ROUND: &[TextStrategy] = &[round_label, round_summary_segment];

// Teams

fn teams_matchup_label(sources: &Sources<'_>) -> Option<(String, String)> {
    let matchup = sources.labels.get(LabelKey::Matchup)?;
    split_versus(matchup).or_else(|| split_around_score(matchup))
}

fn teams_summary_versus(sources: &Sources<'_>) -> Option<(String, String)> {
    split_versus(sources.fixture_text())
}

fn teams_summary_score(sources: &Sources<'_>) -> Option<(String, String)> {
    split_around_score(sources.fixture_text())
}

pub const TEAMS: &[TeamsStrategy] = &[
    teams_matchup_label,
    teams_summary_versus,
    teams_summary_score,
];

// Certainty

fn certainty_label(sources: &Sources<'_>) -> Option<Certainty> {
    sources.labels.get(LabelKey::Certainty)?.parse().ok()
}

fn certainty_from_venue(sources: &Sources<'_>) -> Option<Certainty> {
    let venue = sources.location.trim();
    if venue.is_empty() || venue.contains(VENUE_UNKNOWN_MARKER) {
        Some(Certainty::Unknown)
    } else {
        Some(Certainty::Provisional)
    }
}

pub const CERTAINTY: &[fn(&Sources<'_>) -> Option<Certainty>] =
    &[certainty_label, certainty_from_venue];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::parse_description;

    fn sources<'a>(labels: &'a ParsedLabels, summary: &'a str) -> Sources<'a> {
        Sources {
            labels,
            summary,
            location: "",
        }
    }

    #[test]
    fn test_tournament_priority() {
        let labels = parse_description("大会：選手権大阪府予選");
        let s = sources(&labels, "大阪府／新人戦");
        assert_eq!(first_of(TOURNAMENT, &s).as_deref(), Some("選手権大阪府予選"));

        let empty = ParsedLabels::default();
        let s = sources(&empty, "大阪府／新人戦／2回戦");
        assert_eq!(first_of(TOURNAMENT, &s).as_deref(), Some("新人戦"));

        let s = sources(&empty, "練習試合");
        assert_eq!(first_of(TOURNAMENT, &s).as_deref(), Some("練習試合"));
    }

    #[test]
    fn test_round_from_third_segment_only_when_not_fixture() {
        let empty = ParsedLabels::default();
        let s = sources(&empty, "大阪府／新人戦／2回戦");
        assert_eq!(first_of(ROUND, &s).as_deref(), Some("2回戦"));

        let s = sources(&empty, "大阪府／新人戦／清風 vs 興國");
        assert_eq!(first_of(ROUND, &s), None);

        let s = sources(&empty, "清風 vs 興國");
        assert_eq!(first_of(ROUND, &s), None);
    }

    #[test]
    fn test_certainty_defaults_from_venue() {
        let empty = ParsedLabels::default();
        let mut s = sources(&empty, "");
        assert_eq!(first_of(CERTAINTY, &s), Some(Certainty::Unknown));

        s.location = "会場不明（調整中）";
        assert_eq!(first_of(CERTAINTY, &s), Some(Certainty::Unknown));

        s.location = "J-GREEN堺 S4";
        assert_eq!(first_of(CERTAINTY, &s), Some(Certainty::Provisional));

        let labels = parse_description("確度：確定");
        let s = sources(&labels, "");
        assert_eq!(first_of(CERTAINTY, &s), Some(Certainty::Confirmed));
    }

    #[test]
    fn test_teams_prefer_matchup_label() {
        let labels = parse_description("対戦：履正社 vs 関大北陽");
        let s = sources(&labels, "清風 vs 興國");
        assert_eq!(
            first_of(TEAMS, &s),
            Some(("履正社".to_string(), "関大北陽".to_string()))
        );
    }

    #[test]
    fn test_teams_from_last_summary_segment() {
        let empty = ParsedLabels::default();
        let s = sources(&empty, "大阪府／プリンスリーグ／第1節／清風 vs 興國");
        assert_eq!(
            first_of(TEAMS, &s),
            Some(("清風".to_string(), "興國".to_string()))
        );
    }
}
