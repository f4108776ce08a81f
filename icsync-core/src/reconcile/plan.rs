//! Pure classification of every record into create, update or skip.

use std::collections::HashMap;

use crate::record::MatchRecord;
use crate::store::RemoteRow;

use super::{DiffKind, RecordDiff};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanCounts {
    pub create: usize,
    pub update: usize,
    pub skip: usize,
}

/// Every record paired with what this run will do about it.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub diffs: Vec<RecordDiff>,
    /// Rows seen while listing the store
    pub total_remote_rows: usize,
}

impl SyncPlan {
    /// Classify `records` against `rows`.
    ///
    /// Rows are keyed by UID; rows without a UID can never match and are
    /// ignored. Rows whose UID has no record are left alone.
    pub fn compute(records: Vec<MatchRecord>, rows: &[RemoteRow]) -> SyncPlan {
        let mut by_uid: HashMap<&str, &RemoteRow> = HashMap::with_capacity(rows.len());
        for row in rows.iter().filter(|r| !r.uid.is_empty()) {
            if by_uid.contains_key(row.uid.as_str()) {
                tracing::warn!(uid = %row.uid, row = %row.id, "duplicate UID in store, keeping the first row");
                continue;
            }
            by_uid.insert(row.uid.as_str(), row);
        }

        let diffs = records
            .into_iter()
            .map(|record| {
                let existing = by_uid.get(record.uid.as_str()).copied();
                RecordDiff::classify(record, existing)
            })
            .collect();

        SyncPlan {
            diffs,
            total_remote_rows: rows.len(),
        }
    }

    pub fn counts(&self) -> PlanCounts {
        self.diffs
            .iter()
            .fold(PlanCounts::default(), |mut counts, diff| {
                match diff.kind {
                    DiffKind::Create => counts.create += 1,
                    DiffKind::Update => counts.update += 1,
                    DiffKind::Skip => counts.skip += 1,
                }
                counts
            })
    }

    /// Diffs that need a write.
    pub fn writes(&self) -> impl Iterator<Item = &RecordDiff> {
        self.diffs.iter().filter(|d| d.kind.is_write())
    }

    pub fn has_writes(&self) -> bool {
        self.writes().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Certainty, StatusKind};
    use chrono::TimeZone;
    use chrono_tz::Asia::Tokyo;

    fn record(uid: &str, fingerprint: &str) -> MatchRecord {
        MatchRecord {
            uid: uid.to_string(),
            display_title: uid.to_string(),
            summary: String::new(),
            start: Tokyo.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap(),
            end: None,
            tournament: String::new(),
            round: String::new(),
            venue: String::new(),
            status_kind: StatusKind::Scheduled,
            status_certainty: Certainty::Unknown,
            home: String::new(),
            away: String::new(),
            matchup: String::new(),
            score: String::new(),
            source_url: String::new(),
            match_type: String::new(),
            fingerprint: fingerprint.to_string(),
        }
    }

    fn row(id: &str, uid: &str, fingerprint: Option<&str>) -> RemoteRow {
        RemoteRow {
            id: id.to_string(),
            uid: uid.to_string(),
            fingerprint: fingerprint.map(str::to_string),
        }
    }

    #[test]
    fn test_classifies_create_update_skip() {
        let records = vec![record("new", "f1"), record("changed", "f2"), record("same", "f3")];
        let rows = vec![
            row("p1", "changed", Some("old")),
            row("p2", "same", Some("f3")),
            row("p3", "orphan", Some("x")),
        ];

        let plan = SyncPlan::compute(records, &rows);
        let kinds: Vec<_> = plan.diffs.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiffKind::Create, DiffKind::Update, DiffKind::Skip]);
        assert_eq!(plan.diffs[1].row_id.as_deref(), Some("p1"));
        assert_eq!(plan.total_remote_rows, 3);
        assert_eq!(
            plan.counts(),
            PlanCounts {
                create: 1,
                update: 1,
                skip: 1
            }
        );
    }

    #[test]
    fn test_missing_stored_fingerprint_is_update() {
        let plan = SyncPlan::compute(vec![record("a", "f")], &[row("p1", "a", None)]);
        assert_eq!(plan.diffs[0].kind, DiffKind::Update);
    }

    #[test]
    fn test_rows_without_uid_never_match() {
        let plan = SyncPlan::compute(vec![record("", "f")], &[row("p1", "", Some("f"))]);
        assert_eq!(plan.diffs[0].kind, DiffKind::Create);
    }

    #[test]
    fn test_duplicate_remote_uid_keeps_first_row() {
        let rows = vec![row("p1", "a", Some("f")), row("p2", "a", Some("other"))];
        let plan = SyncPlan::compute(vec![record("a", "f")], &rows);
        assert_eq!(plan.diffs[0].kind, DiffKind::Skip);
        assert_eq!(plan.diffs[0].row_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_all_skip_plan_has_no_writes() {
        let plan = SyncPlan::compute(vec![record("a", "f")], &[row("p1", "a", Some("f"))]);
        assert!(!plan.has_writes());
        assert_eq!(plan.diffs[0].to_string(), "=: a");
    }
}
