//! The external store seam.
//!
//! The reconciliation engine only ever talks to a [`RecordStore`]: one schema
//! introspection, a paginated listing, a UID lookup, and create/update
//! writes. There is no delete operation.

mod memory;

pub use memory::MemoryStore;

use std::collections::BTreeMap;

use crate::error::SyncResult;
use crate::projection::{FieldMap, Payload};

/// Property types the projection knows how to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    Title,
    RichText,
    Select,
    Date,
    Url,
    /// Any other type (number, people, relation, ...). Never written.
    Other(String),
}

impl PropertyKind {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "title" => PropertyKind::Title,
            "rich_text" => PropertyKind::RichText,
            "select" => PropertyKind::Select,
            "date" => PropertyKind::Date,
            "url" => PropertyKind::Url,
            other => PropertyKind::Other(other.to_string()),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, PropertyKind::Title | PropertyKind::RichText)
    }
}

/// Property names and types reported by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    properties: BTreeMap<String, PropertyKind>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: impl Into<String>, kind: PropertyKind) -> Self {
        self.properties.insert(name.into(), kind);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyKind> {
        self.properties.get(name)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The first title-typed property, if any.
    pub fn title_property(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|(_, kind)| **kind == PropertyKind::Title)
            .map(|(name, _)| name.as_str())
    }
}

impl FromIterator<(String, PropertyKind)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, PropertyKind)>>(iter: I) -> Self {
        Schema {
            properties: iter.into_iter().collect(),
        }
    }
}

/// An existing row, reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRow {
    /// Opaque store id used for updates
    pub id: String,
    pub uid: String,
    /// `None` when the row has no stored fingerprint (or the schema has no
    /// fingerprint property)
    pub fingerprint: Option<String>,
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Default)]
pub struct RowPage {
    pub rows: Vec<RemoteRow>,
    pub next_cursor: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Property names and types present in the store.
    async fn introspect_schema(&self) -> SyncResult<Schema>;

    /// One page of rows, starting at `cursor` (`None` for the first page).
    /// `fields` tells the store where the UID and fingerprint live.
    async fn list_rows(&self, fields: &FieldMap, cursor: Option<&str>) -> SyncResult<RowPage>;

    /// The row holding `uid`, if any. Used to check whether a create whose
    /// response was lost went through before retrying it.
    async fn find_row(&self, fields: &FieldMap, uid: &str) -> SyncResult<Option<RemoteRow>>;

    async fn create_row(&self, payload: &Payload) -> SyncResult<()>;

    async fn update_row(&self, row_id: &str, payload: &Payload) -> SyncResult<()>;
}

/// Walk every page of the store sequentially.
pub async fn list_all_rows<S: RecordStore>(store: &S, fields: &FieldMap) -> SyncResult<Vec<RemoteRow>> {
    let mut rows = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = store.list_rows(fields, cursor.as_deref()).await?;
        rows.extend(page.rows);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    tracing::debug!(rows = rows.len(), "listed remote rows");
    Ok(rows)
}
