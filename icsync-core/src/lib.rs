//! Core library for icsync.
//!
//! Reads match fixtures from an iCalendar file, resolves each event into a
//! [`MatchRecord`], and reconciles the records against an external
//! [`RecordStore`] by UID and content fingerprint. Rows are created or
//! updated, never deleted.

pub mod constants;
pub mod context;
pub mod error;
pub mod ics;
pub mod labels;
pub mod pipeline;
pub mod projection;
pub mod reconcile;
pub mod record;
pub mod resolve;
pub mod retry;
pub mod store;

pub use context::{SyncContext, TitleStyle};
pub use error::{SyncError, SyncResult};
pub use pipeline::{LoadedCalendar, PreparedSync, load_records, prepare};
pub use projection::{FieldKey, FieldMap, FieldValue, Payload, PropertyOverrides};
pub use reconcile::{ApplyReport, DiffKind, RecordDiff, SyncPlan, WriteFailure};
pub use record::{Certainty, MatchRecord, StatusKind};
pub use retry::RetryPolicy;
pub use store::{MemoryStore, PropertyKind, RecordStore, RemoteRow, RowPage, Schema};
