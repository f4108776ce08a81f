//! Schema-aware projection of a [`MatchRecord`] onto store properties.
//!
//! The store's schema is introspected once per run and turned into a
//! [`FieldMap`]: for every canonical field, the property it lands in (if any)
//! and that property's type. Fields without a usable property are left out of
//! every payload.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::record::MatchRecord;
use crate::store::{PropertyKind, Schema};

/// Canonical record fields that can be written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Title,
    Start,
    End,
    Tournament,
    Round,
    Venue,
    Kind,
    Certainty,
    Home,
    Away,
    Matchup,
    Score,
    Source,
    MatchType,
    Uid,
    Fingerprint,
    SyncedAt,
}

impl FieldKey {
    pub const ALL: [FieldKey; 17] = [
        FieldKey::Title,
        FieldKey::Start,
        FieldKey::End,
        FieldKey::Tournament,
        FieldKey::Round,
        FieldKey::Venue,
        FieldKey::Kind,
        FieldKey::Certainty,
        FieldKey::Home,
        FieldKey::Away,
        FieldKey::Matchup,
        FieldKey::Score,
        FieldKey::Source,
        FieldKey::MatchType,
        FieldKey::Uid,
        FieldKey::Fingerprint,
        FieldKey::SyncedAt,
    ];

    /// Property names tried in order when no override is configured.
    pub fn default_candidates(self) -> &'static [&'static str] {
        match self {
            FieldKey::Title => &["カード"],
            FieldKey::Start => &["開始"],
            FieldKey::End => &["終了"],
            FieldKey::Tournament => &["大会"],
            FieldKey::Round => &["節／ラウンド", "節/ラウンド", "ラウンド"],
            FieldKey::Venue => &["会場"],
            FieldKey::Kind => &["区分"],
            FieldKey::Certainty => &["確度"],
            FieldKey::Home => &["ホーム"],
            FieldKey::Away => &["アウェイ", "アウェー"],
            FieldKey::Matchup => &["対戦"],
            FieldKey::Score => &["スコア"],
            FieldKey::Source => &["出典"],
            FieldKey::MatchType => &["種別"],
            FieldKey::Uid => &["UID"],
            FieldKey::Fingerprint => &["fingerprint"],
            FieldKey::SyncedAt => &["更新日"],
        }
    }

    fn is_date(self) -> bool {
        matches!(self, FieldKey::Start | FieldKey::End | FieldKey::SyncedAt)
    }

    /// Whether a property of `kind` can hold this field.
    fn accepts(self, kind: &PropertyKind) -> bool {
        match (self, kind) {
            (_, PropertyKind::Other(_)) => false,
            // UID and fingerprint are read back when listing rows
            (FieldKey::Uid | FieldKey::Fingerprint, kind) => kind.is_text(),
            (key, PropertyKind::Date) => key.is_date(),
            (key, PropertyKind::Select | PropertyKind::Url) => !key.is_date(),
            (_, PropertyKind::Title | PropertyKind::RichText) => true,
        }
    }
}

/// Where a field lands in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedProperty {
    pub name: String,
    pub kind: PropertyKind,
}

/// Per-run capability set: which fields the store can hold, and how.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: BTreeMap<FieldKey, MappedProperty>,
}

/// Candidate property names configured per field, replacing the defaults.
pub type PropertyOverrides = BTreeMap<FieldKey, Vec<String>>;

impl FieldMap {
    /// Match every field against `schema`.
    ///
    /// Fails when no usable UID property exists, since rows could not be
    /// matched back to calendar events.
    pub fn from_schema(schema: &Schema, overrides: &PropertyOverrides) -> SyncResult<Self> {
        let mut fields = BTreeMap::new();

        for key in FieldKey::ALL {
            let found = match overrides.get(&key) {
                Some(names) => find_property(schema, key, names.iter().map(String::as_str)),
                None => find_property(schema, key, key.default_candidates().iter().copied()),
            };

            let found = match (found, key) {
                (None, FieldKey::Title) => schema.title_property().map(|name| MappedProperty {
                    name: name.to_string(),
                    kind: PropertyKind::Title,
                }),
                (found, _) => found,
            };

            match found {
                Some(mapped) => {
                    fields.insert(key, mapped);
                }
                None => tracing::debug!(field = ?key, "no usable property, field will not be written"),
            }
        }

        if !fields.contains_key(&FieldKey::Uid) {
            let candidates = overrides
                .get(&FieldKey::Uid)
                .map(|names| names.join(", "))
                .unwrap_or_else(|| FieldKey::Uid.default_candidates().join(", "));
            return Err(SyncError::Schema(format!(
                "No text property for event UIDs (tried: {candidates})"
            )));
        }

        if !fields.contains_key(&FieldKey::Fingerprint) {
            tracing::warn!("No fingerprint property in schema, every existing row will be updated");
        }

        Ok(FieldMap { fields })
    }

    pub fn get(&self, key: FieldKey) -> Option<&MappedProperty> {
        self.fields.get(&key)
    }

    pub fn property_name(&self, key: FieldKey) -> Option<&str> {
        self.fields.get(&key).map(|p| p.name.as_str())
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.fields.contains_key(&key)
    }

    /// Payload for `record`; `synced_at` fills the sync-time field.
    pub fn project(&self, record: &MatchRecord, synced_at: DateTime<Tz>) -> Payload {
        let mut payload = Payload::default();

        for (key, prop) in &self.fields {
            if let Some(value) = encode(field_value(*key, record, synced_at), &prop.kind) {
                payload.insert(prop.name.clone(), value);
            }
        }

        payload
    }
}

fn find_property<'a>(
    schema: &Schema,
    key: FieldKey,
    mut candidates: impl Iterator<Item = &'a str>,
) -> Option<MappedProperty> {
    candidates.find_map(|name| {
        let kind = schema.get(name)?;
        if key.accepts(kind) {
            Some(MappedProperty {
                name: name.to_string(),
                kind: kind.clone(),
            })
        } else {
            tracing::debug!(field = ?key, property = name, ?kind, "property type cannot hold field");
            None
        }
    })
}

enum RecordValue {
    Text(String),
    Date(Option<DateTime<Tz>>),
}

fn field_value(key: FieldKey, record: &MatchRecord, synced_at: DateTime<Tz>) -> RecordValue {
    let text = |s: &str| RecordValue::Text(s.to_string());

    match key {
        FieldKey::Title => text(&record.display_title),
        FieldKey::Start => RecordValue::Date(Some(record.start)),
        FieldKey::End => RecordValue::Date(record.end),
        FieldKey::SyncedAt => RecordValue::Date(Some(synced_at)),
        FieldKey::Tournament => text(&record.tournament),
        FieldKey::Round => text(&record.round),
        FieldKey::Venue => text(&record.venue),
        FieldKey::Kind => text(record.status_kind.label()),
        FieldKey::Certainty => text(record.status_certainty.label()),
        FieldKey::Home => text(&record.home),
        FieldKey::Away => text(&record.away),
        FieldKey::Matchup => text(&record.matchup),
        FieldKey::Score => text(&record.score),
        FieldKey::Source => text(&record.source_url),
        FieldKey::MatchType => text(&record.match_type),
        FieldKey::Uid => text(&record.uid),
        FieldKey::Fingerprint => text(&record.fingerprint),
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

fn encode(value: RecordValue, kind: &PropertyKind) -> Option<FieldValue> {
    match (value, kind) {
        (RecordValue::Text(s), PropertyKind::Title) => Some(FieldValue::Title(s)),
        (RecordValue::Text(s), PropertyKind::RichText) => Some(FieldValue::RichText(s)),
        (RecordValue::Text(s), PropertyKind::Select) => Some(FieldValue::Select(non_empty(s))),
        (RecordValue::Text(s), PropertyKind::Url) => Some(FieldValue::Url(non_empty(s))),
        (RecordValue::Date(d), PropertyKind::Date) => Some(FieldValue::Date(d)),
        (RecordValue::Date(d), PropertyKind::Title) => {
            Some(FieldValue::Title(d.map(|d| d.to_rfc3339()).unwrap_or_default()))
        }
        (RecordValue::Date(d), PropertyKind::RichText) => {
            Some(FieldValue::RichText(d.map(|d| d.to_rfc3339()).unwrap_or_default()))
        }
        _ => None,
    }
}

/// A typed property value ready to be encoded by a store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Empty text clears the property.
    Title(String),
    RichText(String),
    Select(Option<String>),
    Date(Option<DateTime<Tz>>),
    Url(Option<String>),
}

impl FieldValue {
    /// Plain text view, for properties read back as identifiers.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Title(s) | FieldValue::RichText(s) => Some(s),
            FieldValue::Select(s) | FieldValue::Url(s) => s.as_deref(),
            FieldValue::Date(_) => None,
        }
    }
}

/// Property name → value, in a stable order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(BTreeMap<String, FieldValue>);

impl Payload {
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.0.values()
    }

    /// Overwrite the properties present in `other`, keep the rest.
    pub fn merge(&mut self, other: Payload) {
        self.0.extend(other.0);
    }
}
