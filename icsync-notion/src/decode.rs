//! Notion responses → store-neutral types.

use icsync_core::{FieldKey, FieldMap, PropertyKind, RemoteRow, Schema};
use serde_json::{Map, Value};

use crate::client::Page;

pub(crate) fn decode_schema(properties: &Map<String, Value>) -> Schema {
    properties
        .iter()
        .map(|(name, prop)| {
            let type_name = prop.get("type").and_then(Value::as_str).unwrap_or_default();
            (name.clone(), PropertyKind::from_type_name(type_name))
        })
        .collect()
}

/// Concatenated `plain_text` of a title or rich text property.
pub(crate) fn plain_text(prop: &Value) -> Option<String> {
    let type_name = prop.get("type")?.as_str()?;
    let segments = prop.get(type_name)?.as_array()?;
    Some(
        segments
            .iter()
            .filter_map(|s| s.get("plain_text").and_then(Value::as_str))
            .collect(),
    )
}

pub(crate) fn decode_row(page: &Page, fields: &FieldMap) -> RemoteRow {
    let text = |key: FieldKey| {
        fields
            .property_name(key)
            .and_then(|name| page.properties.get(name))
            .and_then(plain_text)
    };

    RemoteRow {
        id: page.id.clone(),
        uid: text(FieldKey::Uid)
            .map(|uid| uid.trim().to_string())
            .unwrap_or_default(),
        fingerprint: text(FieldKey::Fingerprint).filter(|f| !f.is_empty()),
    }
}
