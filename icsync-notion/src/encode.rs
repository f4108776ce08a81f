//! Payload → Notion property JSON.

use icsync_core::{FieldValue, Payload};
use serde_json::{Map, Value, json};

/// Notion caps a single rich text object at this many characters.
pub(crate) const TEXT_SEGMENT_LIMIT: usize = 2000;

pub(crate) fn encode_payload(payload: &Payload) -> Map<String, Value> {
    payload
        .iter()
        .map(|(name, value)| (name.to_string(), encode_value(value)))
        .collect()
}

fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Title(text) => json!({ "title": rich_text(text) }),
        FieldValue::RichText(text) => json!({ "rich_text": rich_text(text) }),
        FieldValue::Select(Some(name)) => json!({ "select": { "name": name } }),
        FieldValue::Select(None) => json!({ "select": null }),
        FieldValue::Date(Some(date)) => json!({ "date": { "start": date.to_rfc3339() } }),
        FieldValue::Date(None) => json!({ "date": null }),
        FieldValue::Url(url) => json!({ "url": url }),
    }
}

/// Empty text becomes an empty array, which clears the property.
fn rich_text(text: &str) -> Value {
    Value::Array(
        split_segments(text, TEXT_SEGMENT_LIMIT)
            .into_iter()
            .map(|segment| json!({ "type": "text", "text": { "content": segment } }))
            .collect(),
    )
}

fn split_segments(text: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Tokyo;

    #[test]
    fn test_encodes_each_property_type() {
        let mut payload = Payload::default();
        payload.insert("カード", FieldValue::Title("清風 vs 興國".to_string()));
        payload.insert("区分", FieldValue::Select(Some("予定".to_string())));
        payload.insert("出典", FieldValue::Url(None));
        payload.insert(
            "開始",
            FieldValue::Date(Some(Tokyo.with_ymd_and_hms(2025, 4, 5, 10, 0, 0).unwrap())),
        );

        let props = encode_payload(&payload);
        assert_eq!(
            props["カード"],
            json!({ "title": [{ "type": "text", "text": { "content": "清風 vs 興國" } }] })
        );
        assert_eq!(props["区分"], json!({ "select": { "name": "予定" } }));
        assert_eq!(props["出典"], json!({ "url": null }));
        assert_eq!(props["開始"], json!({ "date": { "start": "2025-04-05T10:00:00+09:00" } }));
    }

    #[test]
    fn test_empty_text_clears_property() {
        let mut payload = Payload::default();
        payload.insert("会場", FieldValue::RichText(String::new()));
        assert_eq!(encode_payload(&payload)["会場"], json!({ "rich_text": [] }));
    }

    #[test]
    fn test_long_text_is_split_on_char_boundaries() {
        let text = "会".repeat(TEXT_SEGMENT_LIMIT + 5);
        let segments = split_segments(&text, TEXT_SEGMENT_LIMIT);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].chars().count(), TEXT_SEGMENT_LIMIT);
        assert_eq!(segments[1].chars().count(), 5);
    }
}
