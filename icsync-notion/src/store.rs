use icsync_core::{
    FieldKey, FieldMap, Payload, PropertyKind, RecordStore, RemoteRow, RowPage, Schema, SyncError,
    SyncResult,
};
use serde_json::{Value, json};

use crate::client::NotionClient;
use crate::decode::{decode_row, decode_schema};
use crate::encode::encode_payload;

/// One Notion database as a [`RecordStore`].
pub struct NotionStore {
    client: NotionClient,
    database_id: String,
}

impl NotionStore {
    pub fn new(client: NotionClient, database_id: impl Into<String>) -> Self {
        NotionStore {
            client,
            database_id: database_id.into(),
        }
    }
}

impl RecordStore for NotionStore {
    async fn introspect_schema(&self) -> SyncResult<Schema> {
        let database = self
            .client
            .retrieve_database(&self.database_id)
            .await
            .map_err(|e| e.into_read_error())?;
        Ok(decode_schema(&database.properties))
    }

    async fn list_rows(&self, fields: &FieldMap, cursor: Option<&str>) -> SyncResult<RowPage> {
        let resp = self
            .client
            .query_database(&self.database_id, cursor)
            .await
            .map_err(|e| e.into_read_error())?;

        tracing::debug!(rows = resp.results.len(), has_more = resp.has_more, "queried database");

        Ok(RowPage {
            rows: resp.results.iter().map(|page| decode_row(page, fields)).collect(),
            next_cursor: if resp.has_more { resp.next_cursor } else { None },
        })
    }

    async fn find_row(&self, fields: &FieldMap, uid: &str) -> SyncResult<Option<RemoteRow>> {
        let property = fields
            .get(FieldKey::Uid)
            .ok_or_else(|| SyncError::Schema("No UID property mapped".to_string()))?;
        let filter = uid_filter(&property.name, &property.kind, uid)?;

        let resp = self
            .client
            .query_database_filtered(&self.database_id, filter, 1)
            .await
            .map_err(|e| e.into_read_error())?;

        Ok(resp.results.first().map(|page| decode_row(page, fields)))
    }

    async fn create_row(&self, payload: &Payload) -> SyncResult<()> {
        self.client
            .create_page(&self.database_id, encode_payload(payload))
            .await
            .map_err(|e| e.into_write_error())?;
        Ok(())
    }

    async fn update_row(&self, row_id: &str, payload: &Payload) -> SyncResult<()> {
        self.client
            .update_page(row_id, encode_payload(payload))
            .await
            .map_err(|e| e.into_write_error())?;
        Ok(())
    }
}

/// Exact-match filter on the UID property.
fn uid_filter(name: &str, kind: &PropertyKind, uid: &str) -> SyncResult<Value> {
    let type_name = match kind {
        PropertyKind::Title => "title",
        PropertyKind::RichText => "rich_text",
        other => {
            return Err(SyncError::Schema(format!(
                "UID property '{name}' is {other:?}, not text"
            )));
        }
    };
    let mut filter = json!({ "property": name });
    filter[type_name] = json!({ "equals": uid });
    Ok(filter)
}
