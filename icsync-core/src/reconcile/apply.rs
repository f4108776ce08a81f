//! Executing a [`SyncPlan`] against a store.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::SyncResult;
use crate::projection::{FieldMap, Payload};
use crate::retry::{RetryPolicy, with_retry};
use crate::store::RecordStore;

use super::{DiffKind, RecordDiff, SyncPlan};

/// A write that still failed after its last attempt.
#[derive(Debug, Clone, Serialize)]
pub struct WriteFailure {
    pub uid: String,
    pub kind: DiffKind,
    pub message: String,
    pub attempts: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failures: Vec<WriteFailure>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl SyncPlan {
    /// Issue one write per Create/Update diff, sequentially.
    ///
    /// Individual write failures are retried per `policy`, then recorded in
    /// the report; the batch always runs to the end.
    pub async fn apply<S: RecordStore>(
        &self,
        store: &S,
        fields: &FieldMap,
        synced_at: DateTime<Tz>,
        policy: &RetryPolicy,
    ) -> ApplyReport {
        let mut report = ApplyReport::default();

        for diff in &self.diffs {
            if diff.kind == DiffKind::Skip {
                report.skipped += 1;
                continue;
            }

            match write(store, fields, synced_at, policy, diff).await {
                Ok(()) => {
                    tracing::debug!(uid = %diff.record.uid, kind = ?diff.kind, "{diff}");
                    match diff.kind {
                        DiffKind::Create => report.created += 1,
                        _ => report.updated += 1,
                    }
                }
                Err(failure) => {
                    tracing::error!(
                        uid = %failure.uid,
                        attempts = failure.attempts,
                        "{} failed: {}",
                        diff,
                        failure.message
                    );
                    report.failures.push(failure);
                }
            }
        }

        report
    }
}

async fn write<S: RecordStore>(
    store: &S,
    fields: &FieldMap,
    synced_at: DateTime<Tz>,
    policy: &RetryPolicy,
    diff: &RecordDiff,
) -> Result<(), WriteFailure> {
    let payload = fields.project(&diff.record, synced_at);
    let uid = diff.record.uid.as_str();

    let (result, attempts) = match (diff.kind, diff.row_id.as_deref()) {
        (DiffKind::Update, Some(row_id)) => {
            with_retry(policy, "update", || store.update_row(row_id, &payload)).await
        }
        _ => create(store, fields, policy, diff, &payload).await,
    };

    result.map_err(|e| WriteFailure {
        uid: uid.to_string(),
        kind: diff.kind,
        message: e.to_string(),
        attempts,
    })
}

/// Creates are not idempotent: when a failed attempt may still have been
/// committed, look the UID up before trying again. A row found there is
/// finished with an update instead of a second create.
async fn create<S: RecordStore>(
    store: &S,
    fields: &FieldMap,
    policy: &RetryPolicy,
    diff: &RecordDiff,
    payload: &Payload,
) -> (SyncResult<()>, u32) {
    let uid = diff.record.uid.as_str();
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match store.create_row(payload).await {
            Ok(()) => return (Ok(()), attempt),
            Err(e) if e.is_retryable() && attempt < attempts => e,
            Err(e) => return (Err(e), attempt),
        };

        let delay = policy.delay(attempt);
        tracing::warn!(uid, attempt, attempts, ?delay, error = %err, "create failed, retrying");
        tokio::time::sleep(delay).await;
        attempt += 1;

        if !err.may_have_applied() {
            continue;
        }

        match store.find_row(fields, uid).await {
            Ok(None) => {}
            Ok(Some(row)) => {
                tracing::warn!(uid, row_id = %row.id, "create went through despite the error");
                if row.fingerprint.as_deref() == Some(diff.record.fingerprint.as_str()) {
                    return (Ok(()), attempt - 1);
                }
                let remaining = RetryPolicy {
                    max_attempts: attempts - attempt + 1,
                    ..policy.clone()
                };
                let (result, used) =
                    with_retry(&remaining, "update", || store.update_row(&row.id, payload)).await;
                return (result, attempt - 1 + used);
            }
            Err(lookup) => {
                tracing::warn!(uid, error = %lookup, "could not check whether create went through");
                return (Err(err), attempt - 1);
            }
        }
    }
}
