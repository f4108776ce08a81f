//! In-process store, used by tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{SyncError, SyncResult};
use crate::projection::{FieldKey, FieldMap, Payload};

use super::{RecordStore, RemoteRow, RowPage, Schema};

#[derive(Debug, Clone)]
struct StoredRow {
    id: String,
    uid: String,
    fingerprint: Option<String>,
    payload: Payload,
}

#[derive(Debug, Clone, Copy)]
enum FailureMode {
    /// The write is refused and nothing is stored.
    Reject { retryable: bool },
    /// The write is stored but the caller sees a retryable error.
    LoseResponse,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    needle: String,
    remaining: usize,
    mode: FailureMode,
}

/// A [`RecordStore`] that keeps rows in memory.
///
/// Rows written through the trait keep their full payload; UID and
/// fingerprint are read back through the caller's [`FieldMap`] on listing.
#[derive(Debug)]
pub struct MemoryStore {
    schema: Schema,
    page_size: usize,
    rows: Mutex<Vec<StoredRow>>,
    failures: Mutex<Vec<InjectedFailure>>,
    list_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new(schema: Schema) -> Self {
        MemoryStore {
            schema,
            page_size: 100,
            rows: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Seed a row that already exists remotely.
    pub fn insert_row(&self, row: RemoteRow) {
        self.lock_rows().push(StoredRow {
            id: row.id,
            uid: row.uid,
            fingerprint: row.fingerprint,
            payload: Payload::default(),
        });
    }

    /// Fail the next `times` writes whose payload mentions `needle`.
    pub fn fail_writes_containing(&self, needle: &str, times: usize, retryable: bool) {
        self.inject(needle, times, FailureMode::Reject { retryable });
    }

    /// Apply the next `times` writes whose payload mentions `needle`, then
    /// report them as failed as if the response had timed out.
    pub fn lose_responses_containing(&self, needle: &str, times: usize) {
        self.inject(needle, times, FailureMode::LoseResponse);
    }

    fn inject(&self, needle: &str, times: usize, mode: FailureMode) {
        self.lock_failures().push(InjectedFailure {
            needle: needle.to_string(),
            remaining: times,
            mode,
        });
    }

    /// Payload of a row as last written, by store id.
    pub fn payload(&self, row_id: &str) -> Option<Payload> {
        self.lock_rows()
            .iter()
            .find(|r| r.id == row_id)
            .map(|r| r.payload.clone())
    }

    pub fn row_count(&self) -> usize {
        self.lock_rows().len()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Create and update attempts, including failed ones.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn lock_rows(&self) -> std::sync::MutexGuard<'_, Vec<StoredRow>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_failures(&self) -> std::sync::MutexGuard<'_, Vec<InjectedFailure>> {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Counts the write and returns the error it should report, if any.
    fn take_injected_failure(&self, payload: &Payload) -> Option<SyncError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);

        let mut failures = self.lock_failures();
        let failure = failures.iter_mut().find(|f| {
            f.remaining > 0 && payload.values().any(|v| v.as_text() == Some(f.needle.as_str()))
        })?;
        failure.remaining -= 1;

        let message = format!("injected failure for '{}'", failure.needle);
        Some(match failure.mode {
            FailureMode::Reject { retryable } => SyncError::RemoteWrite {
                message,
                retryable,
                maybe_applied: false,
            },
            FailureMode::LoseResponse => SyncError::RemoteWrite {
                message,
                retryable: true,
                maybe_applied: true,
            },
        })
    }
}

/// `Err(e)` for an injected failure that stored nothing, otherwise what the
/// caller should see once the write has been stored.
fn split_injected(injected: Option<SyncError>) -> SyncResult<SyncResult<()>> {
    match injected {
        Some(e) if !e.may_have_applied() => Err(e),
        Some(lost) => Ok(Err(lost)),
        None => Ok(Ok(())),
    }
}

fn read_back(stored: &StoredRow, fields: &FieldMap) -> RemoteRow {
    let text = |key: FieldKey| {
        fields
            .property_name(key)
            .and_then(|name| stored.payload.get(name))
            .and_then(|value| value.as_text())
            .map(str::to_string)
    };

    RemoteRow {
        id: stored.id.clone(),
        uid: text(FieldKey::Uid).unwrap_or_else(|| stored.uid.clone()),
        fingerprint: if fields.contains(FieldKey::Fingerprint) {
            text(FieldKey::Fingerprint).or_else(|| stored.fingerprint.clone())
        } else {
            stored.fingerprint.clone()
        },
    }
}

impl RecordStore for MemoryStore {
    async fn introspect_schema(&self) -> SyncResult<Schema> {
        Ok(self.schema.clone())
    }

    async fn list_rows(&self, fields: &FieldMap, cursor: Option<&str>) -> SyncResult<RowPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let offset = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| SyncError::RemoteRead(format!("invalid cursor '{c}'")))?,
            None => 0,
        };

        let rows = self.lock_rows();
        let end = (offset + self.page_size).min(rows.len());
        let page = rows
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|stored| read_back(stored, fields))
            .collect();

        Ok(RowPage {
            rows: page,
            next_cursor: (end < rows.len()).then(|| end.to_string()),
        })
    }

    async fn find_row(&self, fields: &FieldMap, uid: &str) -> SyncResult<Option<RemoteRow>> {
        Ok(self
            .lock_rows()
            .iter()
            .map(|stored| read_back(stored, fields))
            .find(|row| row.uid == uid))
    }

    async fn create_row(&self, payload: &Payload) -> SyncResult<()> {
        let outcome = split_injected(self.take_injected_failure(payload))?;

        let mut rows = self.lock_rows();
        let id = format!("row-{}", rows.len() + 1);
        rows.push(StoredRow {
            id,
            uid: String::new(),
            fingerprint: None,
            payload: payload.clone(),
        });
        outcome
    }

    async fn update_row(&self, row_id: &str, payload: &Payload) -> SyncResult<()> {
        let outcome = split_injected(self.take_injected_failure(payload))?;

        let mut rows = self.lock_rows();
        let row = rows
            .iter_mut()
            .find(|r| r.id == row_id)
            .ok_or_else(|| SyncError::RemoteWrite {
                message: format!("no row with id '{row_id}'"),
                retryable: false,
                maybe_applied: false,
            })?;
        row.payload.merge(payload.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{FieldValue, PropertyOverrides};
    use crate::store::PropertyKind;

    fn schema() -> Schema {
        Schema::new()
            .with_property("Name", PropertyKind::Title)
            .with_property("UID", PropertyKind::RichText)
    }

    fn payload(uid: &str) -> Payload {
        let mut payload = Payload::default();
        payload.insert("UID", FieldValue::RichText(uid.to_string()));
        payload
    }

    #[tokio::test]
    async fn test_find_row_by_uid() {
        let store = MemoryStore::new(schema());
        let fields = FieldMap::from_schema(&schema(), &PropertyOverrides::new()).unwrap();
        store.create_row(&payload("a")).await.unwrap();
        store.create_row(&payload("b")).await.unwrap();

        let found = store.find_row(&fields, "b").await.unwrap().unwrap();
        assert_eq!(found.id, "row-2");
        assert!(store.find_row(&fields, "c").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lost_response_still_stores_row() {
        let store = MemoryStore::new(schema());
        store.lose_responses_containing("a", 1);

        let err = store.create_row(&payload("a")).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.may_have_applied());
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_write_stores_nothing() {
        let store = MemoryStore::new(schema());
        store.fail_writes_containing("a", 1, true);

        let err = store.create_row(&payload("a")).await.unwrap_err();
        assert!(!err.may_have_applied());
        assert_eq!(store.row_count(), 0);
        assert_eq!(store.write_calls(), 1);
    }
}
