//! Reconciliation of resolved records against rows already in the store.

mod apply;
mod diff_kind;
mod plan;
mod record_diff;

pub use apply::{ApplyReport, WriteFailure};
pub use diff_kind::DiffKind;
pub use plan::{PlanCounts, SyncPlan};
pub use record_diff::RecordDiff;
