//! Team and score extraction from free text such as `清風 4 - 0 追手門学院`.

use std::sync::LazyLock;

use regex::Regex;

static VS_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:vs\.?|ｖｓ\.?|ＶＳ\.?|対)\s*").expect("valid vs regex")
});

// The guards on both ends keep dates and times (2025-04-05, 13:00-14:50) from
// reading as scores
static SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|[^\d\-−–ー－:/.])(\d{1,2})(?:\s*[(（]\s*(\d{1,2})\s*[)）])?\s*[-−–ー－]\s*(\d{1,2})(?:\s*[(（]\s*(\d{1,2})\s*([)）]))?(?:[^\d\-−–ー－:/.]|$)",
    )
    .expect("valid score regex")
});

static PENALTIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)PK\s*[(（]?\s*(\d{1,2})\s*[-−–ー－]\s*(\d{1,2})\s*[)）]?")
        .expect("valid penalty regex")
});

struct ScoreMatch {
    score: String,
    /// Byte range of the score within the searched text
    start: usize,
    end: usize,
}

fn with_sub(main: &str, sub: Option<regex::Match<'_>>) -> String {
    match sub {
        Some(sub) => format!("{}({})", main, sub.as_str()),
        None => main.to_string(),
    }
}

fn find_score(text: &str) -> Option<ScoreMatch> {
    let caps = SCORE.captures(text)?;
    let home = caps.get(1)?;
    let away = caps.get(3)?;
    // Group 5 is the closing parenthesis of the away sub-score
    let last = caps.get(5).unwrap_or(away);

    Some(ScoreMatch {
        score: format!(
            "{}-{}",
            with_sub(home.as_str(), caps.get(2)),
            with_sub(away.as_str(), caps.get(4))
        ),
        start: home.start(),
        end: last.end(),
    })
}

fn penalty_suffix(text: &str) -> Option<(String, std::ops::Range<usize>)> {
    let caps = PENALTIES.captures(text)?;
    let whole = caps.get(0)?;
    Some((
        format!("PK{}-{}", caps.get(1)?.as_str(), caps.get(2)?.as_str()),
        whole.range(),
    ))
}

/// Extract a normalized score (`4-0`, `1(4)-1(3)`, `1-1 PK3-1`) from `text`.
///
/// Known team names are blanked out first so digits inside a name are never
/// read as goals.
pub fn normalize_score(text: &str, home: &str, away: &str) -> Option<String> {
    let mut cleaned = text.to_string();
    for name in [home, away] {
        if !name.is_empty() {
            cleaned = cleaned.replace(name, " ");
        }
    }

    let penalties = penalty_suffix(&cleaned);
    if let Some((_, range)) = &penalties {
        cleaned.replace_range(range.clone(), " ");
    }

    let main = find_score(&cleaned)?;
    Some(match penalties {
        Some((pk, _)) => format!("{} {}", main.score, pk),
        None => main.score,
    })
}

fn strip_score(side: &str) -> String {
    let mut side = side.to_string();
    if let Some((_, range)) = penalty_suffix(&side) {
        side.replace_range(range, " ");
    }
    if let Some(found) = find_score(&side) {
        side.replace_range(found.start..found.end, " ");
    }
    side.trim().to_string()
}

/// Split `A vs B` (any spelling of "vs") into its two sides.
pub fn split_versus(text: &str) -> Option<(String, String)> {
    let mut parts = VS_SEPARATOR.splitn(text.trim(), 2);
    let home = strip_score(parts.next()?);
    let away = strip_score(parts.next()?);

    if home.is_empty() || away.is_empty() {
        return None;
    }
    Some((home, away))
}

/// Split `A 4 - 0 B` around an embedded score.
pub fn split_around_score(text: &str) -> Option<(String, String)> {
    let found = find_score(text)?;
    let home = text[..found.start].trim().to_string();
    let away = strip_score(&text[found.end..]);

    if home.is_empty() || away.is_empty() {
        return None;
    }
    Some((home, away))
}
