use std::fmt;

use serde::Serialize;

use crate::record::MatchRecord;
use crate::store::RemoteRow;

use super::DiffKind;

#[derive(Debug, Clone, Serialize)]
pub struct RecordDiff {
    pub kind: DiffKind,
    pub record: MatchRecord,
    /// Store id of the matching row; `None` for creates
    pub row_id: Option<String>,
}

impl fmt::Display for RecordDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.record)
    }
}

impl RecordDiff {
    /// Classify `record` against the row sharing its UID, if any.
    pub fn classify(record: MatchRecord, existing: Option<&RemoteRow>) -> RecordDiff {
        match existing {
            None => RecordDiff {
                kind: DiffKind::Create,
                record,
                row_id: None,
            },
            Some(row) => {
                let kind = if row.fingerprint.as_deref() == Some(record.fingerprint.as_str()) {
                    DiffKind::Skip
                } else {
                    DiffKind::Update
                };
                RecordDiff {
                    kind,
                    record,
                    row_id: Some(row.id.clone()),
                }
            }
        }
    }
}
