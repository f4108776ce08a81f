//! Description label parsing.
//!
//! Calendar descriptions carry one `label：value` pair per line. Several
//! generations of calendars spelled the same label differently, so every
//! spelling is mapped onto one [`LabelKey`] through [`label_key`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::StatusKind;

/// Canonical semantic keys a description can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKey {
    Tournament,
    Round,
    Kind,
    Certainty,
    Source,
    Matchup,
    Home,
    Away,
    Score,
    MatchType,
}

/// Map a label spelling onto its canonical key. Unknown labels yield `None`.
pub fn label_key(label: &str) -> Option<LabelKey> {
    let key = match label {
        "大会" => LabelKey::Tournament,
        "ラウンド" | "節/ラウンド" | "節／ラウンド" => LabelKey::Round,
        "区分" => LabelKey::Kind,
        "確度" => LabelKey::Certainty,
        "出典" => LabelKey::Source,
        "対戦" => LabelKey::Matchup,
        "ホーム" => LabelKey::Home,
        "アウェイ" | "アウェー" => LabelKey::Away,
        "スコア" => LabelKey::Score,
        "種別" => LabelKey::MatchType,
        _ => return None,
    };
    Some(key)
}

/// Semantic fields extracted from one description.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedLabels(BTreeMap<LabelKey, String>);

impl ParsedLabels {
    /// Value for `key`, treating an empty value as absent.
    pub fn get(&self, key: LabelKey) -> Option<&str> {
        self.0
            .get(&key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, key: LabelKey, value: impl Into<String>) {
        self.0.insert(key, value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| v.is_empty())
    }
}

/// Normalize line endings and turn literal `\n` / `\\n` into real newlines.
fn normalize_description(desc: &str) -> String {
    desc.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace("\\\\n", "\n")
        .replace("\\n", "\n")
}

/// Split at the first fullwidth or halfwidth colon, whichever comes first.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let idx = line.find(['：', ':'])?;
    let sep_len = line[idx..].chars().next()?.len_utf8();
    Some((line[..idx].trim(), line[idx + sep_len..].trim()))
}

/// Parse a raw description into labelled fields.
///
/// Later lines overwrite earlier ones for the same key. A `区分` value that is
/// not a status token comes from older calendars that used the label for the
/// round name; it fills [`LabelKey::Round`] unless an explicit round label is
/// present.
pub fn parse_description(desc: &str) -> ParsedLabels {
    let mut labels = ParsedLabels::default();
    let mut legacy_round: Option<String> = None;

    for line in normalize_description(desc).split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((label, value)) = split_label(line) else {
            continue;
        };
        let Some(key) = label_key(label) else {
            continue;
        };

        if key == LabelKey::Kind && !value.is_empty() && value.parse::<StatusKind>().is_err() {
            legacy_round = Some(value.to_string());
            continue;
        }

        labels.insert(key, value);
    }

    if labels.get(LabelKey::Round).is_none() {
        if let Some(round) = legacy_round {
            labels.insert(LabelKey::Round, round);
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_synonyms_resolve_to_same_key() {
        for desc in ["ラウンド：第1節", "節/ラウンド：第1節", "節／ラウンド：第1節"] {
            let labels = parse_description(desc);
            assert_eq!(labels.get(LabelKey::Round), Some("第1節"), "{desc}");
        }
    }

    #[test]
    fn test_bare_setsu_is_not_a_round_label() {
        assert_eq!(label_key("節"), None);
        assert_eq!(parse_description("節：第1節").get(LabelKey::Round), None);
    }

    #[test]
    fn test_full_description() {
        let desc = "種別：公式戦\n大会：高円宮杯 U-18 プリンスリーグ関西\n節／ラウンド：第3節\n\
区分：結果\n確度：確定\n出典：https://example.jp/osaka\n対戦：清風 vs 追手門学院\nスコア：4-0";
        let labels = parse_description(desc);

        assert_eq!(labels.get(LabelKey::MatchType), Some("公式戦"));
        assert_eq!(
            labels.get(LabelKey::Tournament),
            Some("高円宮杯 U-18 プリンスリーグ関西")
        );
        assert_eq!(labels.get(LabelKey::Round), Some("第3節"));
        assert_eq!(labels.get(LabelKey::Kind), Some("結果"));
        assert_eq!(labels.get(LabelKey::Certainty), Some("確定"));
        // Only the first colon splits, so the URL survives intact
        assert_eq!(labels.get(LabelKey::Source), Some("https://example.jp/osaka"));
        assert_eq!(labels.get(LabelKey::Matchup), Some("清風 vs 追手門学院"));
        assert_eq!(labels.get(LabelKey::Score), Some("4-0"));
    }

    #[test]
    fn test_halfwidth_colon_and_whitespace() {
        let labels = parse_description("  大会 : 大阪府総体  \nホーム:清風\nアウェー：履正社");
        assert_eq!(labels.get(LabelKey::Tournament), Some("大阪府総体"));
        assert_eq!(labels.get(LabelKey::Home), Some("清風"));
        assert_eq!(labels.get(LabelKey::Away), Some("履正社"));
    }

    #[test]
    fn test_escaped_newlines() {
        let single = parse_description(r"大会：A\n区分：予定");
        let double = parse_description(r"大会：A\\n区分：予定");
        let crlf = parse_description("大会：A\r\n区分：予定\r確度：暫定");

        for labels in [&single, &double, &crlf] {
            assert_eq!(labels.get(LabelKey::Tournament), Some("A"));
            assert_eq!(labels.get(LabelKey::Kind), Some("予定"));
        }
        assert_eq!(crlf.get(LabelKey::Certainty), Some("暫定"));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let labels = parse_description("ラウンド：第1節\n節/ラウンド：第2節");
        assert_eq!(labels.get(LabelKey::Round), Some("第2節"));
    }

    #[test]
    fn test_unknown_and_colonless_lines_are_ignored() {
        let labels = parse_description("備考：雨天中止\nただのメモ\n大会：新人戦");
        assert_eq!(labels.get(LabelKey::Tournament), Some("新人戦"));
        assert_eq!(labels.0.len(), 1);
    }

    #[test]
    fn test_legacy_status_value_becomes_round() {
        let labels = parse_description("区分：予選リーグ（Aグループ）");
        assert_eq!(labels.get(LabelKey::Round), Some("予選リーグ（Aグループ）"));
        assert_eq!(labels.get(LabelKey::Kind), None);
    }

    #[test]
    fn test_explicit_round_beats_legacy_status_value() {
        let labels = parse_description("ラウンド：決勝\n区分：予選リーグ");
        assert_eq!(labels.get(LabelKey::Round), Some("決勝"));
    }

    #[test]
    fn test_empty_value_reads_as_absent() {
        let labels = parse_description("スコア：\n区分：");
        assert_eq!(labels.get(LabelKey::Score), None);
        assert_eq!(labels.get(LabelKey::Kind), None);
        assert!(labels.is_empty());
    }
}
