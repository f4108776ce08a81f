//! Field resolution: raw event + parsed labels → [`MatchRecord`].

mod fingerprint;
mod matchup;
mod strategies;

pub use fingerprint::fingerprint;
pub use matchup::{normalize_score, split_around_score, split_versus};

use chrono::DateTime;
use chrono_tz::Tz;

use crate::context::{SyncContext, TitleStyle};
use crate::error::{SyncError, SyncResult};
use crate::ics::RawEvent;
use crate::labels::{LabelKey, ParsedLabels};
use crate::record::{Certainty, MatchRecord, StatusKind};
use strategies::{CERTAINTY, ROUND, Sources, TEAMS, TOURNAMENT, first_of};

const UNTITLED: &str = "(No title)";

/// Resolve one event into a complete record.
///
/// Fails with [`SyncError::MissingStartTime`] when the event has no usable
/// DTSTART; callers drop that event and carry on with the rest.
pub fn resolve(
    event: &RawEvent,
    labels: &ParsedLabels,
    ctx: &SyncContext,
) -> SyncResult<MatchRecord> {
    let start = event.start.ok_or_else(|| SyncError::MissingStartTime {
        uid: event.uid.clone(),
    })?;

    let sources = Sources {
        labels,
        summary: &event.summary,
        location: &event.location,
    };

    let tournament = first_of(TOURNAMENT, &sources).unwrap_or_default();
    let round = first_of(ROUND, &sources).unwrap_or_default();

    let teams = first_of(TEAMS, &sources);
    let home = labels
        .get(LabelKey::Home)
        .map(str::to_string)
        .or_else(|| teams.as_ref().map(|(home, _)| home.clone()))
        .unwrap_or_default();
    let away = labels
        .get(LabelKey::Away)
        .map(str::to_string)
        .or_else(|| teams.as_ref().map(|(_, away)| away.clone()))
        .unwrap_or_default();

    let matchup = match labels.get(LabelKey::Matchup) {
        Some(matchup) => matchup.to_string(),
        None if !home.is_empty() && !away.is_empty() => format!("{home} vs {away}"),
        None => String::new(),
    };

    let score = resolve_score(&sources, &home, &away);

    // An explicit, valid label always wins over inference.
    let status_kind = labels
        .get(LabelKey::Kind)
        .and_then(|v| v.parse::<StatusKind>().ok())
        .unwrap_or_else(|| infer_status(&score, start, event.end, ctx));

    let status_certainty = first_of(CERTAINTY, &sources).unwrap_or(Certainty::Unknown);

    let display_title = display_title(
        &home,
        &away,
        status_kind,
        &score,
        &round,
        &event.summary,
        ctx.title_style,
    );

    let mut record = MatchRecord {
        uid: event.uid.clone(),
        display_title,
        summary: event.summary.clone(),
        start,
        end: event.end,
        tournament,
        round,
        venue: event.location.clone(),
        status_kind,
        status_certainty,
        home,
        away,
        matchup,
        score,
        source_url: labels.get(LabelKey::Source).unwrap_or_default().to_string(),
        match_type: labels.get(LabelKey::MatchType).unwrap_or_default().to_string(),
        fingerprint: String::new(),
    };
    record.fingerprint = fingerprint(&record);

    Ok(record)
}

/// Score label, else a score embedded in the matchup label, else in the summary.
fn resolve_score(sources: &Sources<'_>, home: &str, away: &str) -> String {
    if let Some(label) = sources.labels.get(LabelKey::Score) {
        return normalize_score(label, home, away).unwrap_or_else(|| label.trim().to_string());
    }

    sources
        .labels
        .get(LabelKey::Matchup)
        .and_then(|matchup| normalize_score(matchup, home, away))
        .or_else(|| normalize_score(sources.fixture_text(), home, away))
        .unwrap_or_default()
}

/// Result once a score is known or the match has ended, else Scheduled.
fn infer_status(
    score: &str,
    start: DateTime<Tz>,
    end: Option<DateTime<Tz>>,
    ctx: &SyncContext,
) -> StatusKind {
    if !score.is_empty() {
        return StatusKind::Result;
    }

    let end = end.unwrap_or(start + ctx.default_duration);
    if end < ctx.now {
        StatusKind::Result
    } else {
        StatusKind::Scheduled
    }
}

fn display_title(
    home: &str,
    away: &str,
    kind: StatusKind,
    score: &str,
    round: &str,
    summary: &str,
    style: TitleStyle,
) -> String {
    if !home.is_empty() && !away.is_empty() {
        if kind == StatusKind::Result && !score.is_empty() {
            return match style {
                TitleStyle::Slash => format!("{home} vs {away}／{score}"),
                TitleStyle::Inline => format!("{home} {score} {away}"),
            };
        }
        return format!("{home} vs {away}");
    }

    if !round.is_empty() {
        return round.to_string();
    }

    let title = strip_prefecture_prefix(summary);
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

/// Drop a leading `大阪府／` style segment.
fn strip_prefecture_prefix(summary: &str) -> &str {
    match summary.split_once('／') {
        Some((head, rest))
            if head.chars().count() <= 4
                && head.trim().ends_with(['都', '道', '府', '県']) =>
        {
            rest.trim()
        }
        _ => summary.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::parse_description;
    use chrono::{Duration, TimeZone};
    use chrono_tz::Asia::Tokyo;

    fn ctx() -> SyncContext {
        SyncContext::at(
            Tokyo.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            TitleStyle::Slash,
        )
    }

    fn event(summary: &str, location: &str, description: &str) -> RawEvent {
        RawEvent {
            uid: "uid-1".to_string(),
            summary: summary.to_string(),
            location: location.to_string(),
            description: description.to_string(),
            start: Some(Tokyo.with_ymd_and_hms(2025, 7, 1, 10, 0, 0).unwrap()),
            end: Some(Tokyo.with_ymd_and_hms(2025, 7, 1, 11, 50, 0).unwrap()),
        }
    }

    fn resolve_event(event: &RawEvent, ctx: &SyncContext) -> MatchRecord {
        resolve(event, &parse_description(&event.description), ctx).unwrap()
    }

    #[test]
    fn test_summary_with_embedded_score() {
        let record = resolve_event(&event("清風 4 - 0 追手門学院", "J-GREEN堺", ""), &ctx());

        assert_eq!(record.home, "清風");
        assert_eq!(record.away, "追手門学院");
        assert_eq!(record.score, "4-0");
        assert_eq!(record.status_kind, StatusKind::Result);
        assert_eq!(record.display_title, "清風 vs 追手門学院／4-0");
        assert_eq!(record.matchup, "清風 vs 追手門学院");
    }

    #[test]
    fn test_inline_title_style() {
        let ctx = SyncContext::at(ctx().now, TitleStyle::Inline);
        let record = resolve_event(&event("清風 4 - 0 追手門学院", "", ""), &ctx);
        assert_eq!(record.display_title, "清風 4-0 追手門学院");
    }

    #[test]
    fn test_legacy_status_value_falls_back_to_time_inference() {
        let upcoming = resolve_event(&event("", "", "区分：予選リーグ（Aグループ）"), &ctx());
        assert_eq!(upcoming.round, "予選リーグ（Aグループ）");
        assert_eq!(upcoming.status_kind, StatusKind::Scheduled);
        assert_eq!(upcoming.display_title, "予選リーグ（Aグループ）");

        let later = SyncContext::at(
            Tokyo.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap(),
            TitleStyle::Slash,
        );
        let past = resolve_event(&event("", "", "区分：予選リーグ（Aグループ）"), &later);
        assert_eq!(past.status_kind, StatusKind::Result);
    }

    #[test]
    fn test_explicit_scheduled_label_is_not_overridden_by_score() {
        let record = resolve_event(
            &event("清風 vs 興國", "", "区分：予定\nスコア：2-1"),
            &ctx(),
        );
        assert_eq!(record.status_kind, StatusKind::Scheduled);
        assert_eq!(record.score, "2-1");
        // No score in the title while the match is still marked scheduled
        assert_eq!(record.display_title, "清風 vs 興國");
    }

    #[test]
    fn test_missing_end_assumes_default_duration() {
        let mut ev = event("清風 vs 興國", "", "");
        ev.end = None;

        let during = SyncContext::at(ev.start.unwrap() + Duration::minutes(90), TitleStyle::Slash);
        assert_eq!(resolve_event(&ev, &during).status_kind, StatusKind::Scheduled);

        let after = SyncContext::at(ev.start.unwrap() + Duration::hours(3), TitleStyle::Slash);
        assert_eq!(resolve_event(&ev, &after).status_kind, StatusKind::Result);
    }

    #[test]
    fn test_certainty_defaults() {
        assert_eq!(
            resolve_event(&event("清風 vs 興國", "", ""), &ctx()).status_certainty,
            Certainty::Unknown
        );
        assert_eq!(
            resolve_event(&event("清風 vs 興國", "会場不明", ""), &ctx()).status_certainty,
            Certainty::Unknown
        );
        assert_eq!(
            resolve_event(&event("清風 vs 興國", "万博記念公園", ""), &ctx()).status_certainty,
            Certainty::Provisional
        );
        assert_eq!(
            resolve_event(&event("清風 vs 興國", "", "確度：確定"), &ctx()).status_certainty,
            Certainty::Confirmed
        );
    }

    #[test]
    fn test_explicit_home_away_labels_win() {
        let record = resolve_event(
            &event("清風 vs 興國", "", "ホーム：履正社\nアウェイ：大阪桐蔭"),
            &ctx(),
        );
        assert_eq!(record.home, "履正社");
        assert_eq!(record.away, "大阪桐蔭");
        assert_eq!(record.matchup, "履正社 vs 大阪桐蔭");
    }

    #[test]
    fn test_score_from_matchup_label() {
        let record = resolve_event(&event("", "", "対戦：金光大阪 1-1 東海大仰星 PK4-3"), &ctx());
        assert_eq!(record.home, "金光大阪");
        assert_eq!(record.away, "東海大仰星");
        assert_eq!(record.score, "1-1 PK4-3");
        assert_eq!(record.matchup, "金光大阪 1-1 東海大仰星 PK4-3");
    }

    #[test]
    fn test_unparseable_score_label_is_kept_verbatim() {
        let record = resolve_event(&event("清風 vs 興國", "", "スコア：不戦勝"), &ctx());
        assert_eq!(record.score, "不戦勝");
        assert_eq!(record.status_kind, StatusKind::Result);
    }

    #[test]
    fn test_title_falls_back_to_stripped_summary() {
        let record = resolve_event(&event("大阪府／高円宮杯 U-18", "", ""), &ctx());
        assert_eq!(record.display_title, "高円宮杯 U-18");
        assert_eq!(record.tournament, "高円宮杯 U-18");

        let untitled = resolve_event(&event("", "", ""), &ctx());
        assert_eq!(untitled.display_title, UNTITLED);
    }

    #[test]
    fn test_missing_start_time() {
        let mut ev = event("清風 vs 興國", "", "");
        ev.start = None;
        let err = resolve(&ev, &ParsedLabels::default(), &ctx()).unwrap_err();
        assert!(matches!(err, SyncError::MissingStartTime { uid } if uid == "uid-1"));
    }

    #[test]
    fn test_fingerprint_is_deterministic_and_sensitive() {
        let ev = event("清風 vs 興國", "J-GREEN堺", "大会：総体\n出典：https://example.jp");
        let a = resolve_event(&ev, &ctx());
        let b = resolve_event(&ev.clone(), &ctx());
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.fingerprint.len(), 40);

        let mut moved = ev.clone();
        moved.location = "J-GREEN堺 S2".to_string();
        assert_ne!(resolve_event(&moved, &ctx()).fingerprint, a.fingerprint);

        let mut sourced = ev.clone();
        sourced.description = "大会：総体\n出典：https://example.jp/v2".to_string();
        assert_ne!(resolve_event(&sourced, &ctx()).fingerprint, a.fingerprint);
    }

    #[test]
    fn test_fingerprint_ignores_sync_time_for_settled_status() {
        let ev = event("清風 vs 興國", "", "区分：予定");
        let earlier = resolve_event(&ev, &ctx());
        let later = resolve_event(
            &ev,
            &SyncContext::at(ctx().now + Duration::days(3), TitleStyle::Slash),
        );
        assert_eq!(earlier.fingerprint, later.fingerprint);
    }
}
