//! End-to-end wiring: calendar text → records → plan against a store.

use std::collections::HashMap;

use crate::context::SyncContext;
use crate::error::{SyncError, SyncResult};
use crate::ics::read_events;
use crate::labels::parse_description;
use crate::projection::{FieldMap, PropertyOverrides};
use crate::reconcile::SyncPlan;
use crate::record::MatchRecord;
use crate::resolve::resolve;
use crate::store::{RecordStore, list_all_rows};

/// Result of reading and resolving one calendar.
#[derive(Debug, Clone, Default)]
pub struct LoadedCalendar {
    /// Resolved records, one per UID, in first-seen order
    pub records: Vec<MatchRecord>,
    /// VEVENTs found in the source, including dropped ones
    pub total_events: usize,
    pub without_uid: usize,
    /// UIDs dropped because DTSTART was missing or unparseable
    pub missing_start: Vec<String>,
}

/// Read, parse and resolve every event in `source`.
///
/// Events without a UID are dropped silently. Events that fail to resolve
/// are logged and dropped; the rest of the calendar is unaffected. When a UID
/// repeats, the last occurrence wins. A file that cannot be read as a
/// calendar at all is an error.
pub fn load_records(source: &str, ctx: &SyncContext) -> SyncResult<LoadedCalendar> {
    let events = read_events(source, ctx.timezone)?;
    let mut loaded = LoadedCalendar {
        total_events: events.len(),
        ..LoadedCalendar::default()
    };

    let mut index: HashMap<String, usize> = HashMap::new();

    for event in &events {
        if !event.has_uid() {
            loaded.without_uid += 1;
            continue;
        }

        let labels = parse_description(&event.description);
        let record = match resolve(event, &labels, ctx) {
            Ok(record) => record,
            Err(SyncError::MissingStartTime { uid }) => {
                tracing::warn!(%uid, "event has no usable DTSTART, skipping");
                loaded.missing_start.push(uid);
                continue;
            }
            Err(e) => {
                tracing::warn!(uid = %event.uid, error = %e, "failed to resolve event, skipping");
                continue;
            }
        };

        match index.get(&record.uid) {
            Some(&at) => {
                tracing::warn!(uid = %record.uid, "duplicate UID in calendar, last occurrence wins");
                loaded.records[at] = record;
            }
            None => {
                index.insert(record.uid.clone(), loaded.records.len());
                loaded.records.push(record);
            }
        }
    }

    tracing::debug!(
        events = loaded.total_events,
        records = loaded.records.len(),
        "calendar loaded"
    );
    Ok(loaded)
}

/// The field map and plan for one run, computed before any write.
#[derive(Debug, Clone)]
pub struct PreparedSync {
    pub fields: FieldMap,
    pub plan: SyncPlan,
}

/// Introspect the schema, list every row, and classify `records`.
pub async fn prepare<S: RecordStore>(
    store: &S,
    records: Vec<MatchRecord>,
    overrides: &PropertyOverrides,
) -> SyncResult<PreparedSync> {
    let schema = store.introspect_schema().await?;
    let fields = FieldMap::from_schema(&schema, overrides)?;
    let rows = list_all_rows(store, &fields).await?;
    let plan = SyncPlan::compute(records, &rows);

    Ok(PreparedSync { fields, plan })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TitleStyle;
    use chrono::TimeZone;
    use chrono_tz::Asia::Tokyo;

    fn ctx() -> SyncContext {
        SyncContext::at(Tokyo.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(), TitleStyle::Slash)
    }

    fn vevent(uid: Option<&str>, dtstart: Option<&str>, summary: &str) -> String {
        let mut out = String::from("BEGIN:VEVENT\r\n");
        if let Some(uid) = uid {
            out.push_str(&format!("UID:{uid}\r\n"));
        }
        if let Some(dtstart) = dtstart {
            out.push_str(&format!("DTSTART:{dtstart}\r\n"));
        }
        out.push_str(&format!("SUMMARY:{summary}\r\nEND:VEVENT\r\n"));
        out
    }

    fn calendar(events: &[String]) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\n{}END:VCALENDAR\r\n",
            events.concat()
        )
    }

    #[test]
    fn test_events_without_uid_never_reach_records() {
        let source = calendar(&[
            vevent(None, Some("20250405T100000"), "清風 vs 興國"),
            vevent(Some("a"), Some("20250405T100000"), "清風 vs 興國"),
        ]);
        let loaded = load_records(&source, &ctx()).unwrap();
        assert_eq!(loaded.total_events, 2);
        assert_eq!(loaded.without_uid, 1);
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].uid, "a");
    }

    #[test]
    fn test_missing_start_drops_only_that_event() {
        let source = calendar(&[
            vevent(Some("bad"), Some("not-a-date"), "x"),
            vevent(Some("good"), Some("20250405"), "y"),
        ]);
        let loaded = load_records(&source, &ctx()).unwrap();
        assert_eq!(loaded.missing_start, vec!["bad".to_string()]);
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].uid, "good");
    }

    #[test]
    fn test_duplicate_uid_last_wins_in_first_position() {
        let source = calendar(&[
            vevent(Some("a"), Some("20250405T100000"), "first"),
            vevent(Some("b"), Some("20250405T100000"), "other"),
            vevent(Some("a"), Some("20250405T100000"), "second"),
        ]);
        let loaded = load_records(&source, &ctx()).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].summary, "second");
        assert_eq!(loaded.records[1].uid, "b");
    }
}
