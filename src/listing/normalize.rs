//! Normalizers for raw strings pulled off listing and product pages.
//!
//! Everything here is pure and total: malformed input yields 0 or an empty
//! string, never an error.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Ratings are shown on a five-star scale.
const MAX_RATING: f64 = 5.0;

// Commas only count when another digit follows them.
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:,\d+)*").unwrap());

static PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap());

/// First integer in `text`, reading `1,234` as one thousand two hundred and
/// thirty-four. Returns 0 when there are no digits or the value overflows.
pub fn extract_integer(text: &str) -> u64 {
    DIGIT_RUN
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
        .unwrap_or(0)
}

/// Star rating from a filled-bar style such as `width:80%`.
///
/// The percentage maps linearly onto zero to five stars. Empty when the
/// style carries no percentage.
pub fn rating_from_bar_width(style: &str) -> String {
    PERCENT
        .captures(style)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .map(|pct| format_rating(pct / 20.0))
        .unwrap_or_default()
}

/// Normalize a structured rating value (`"4.25"`, `" 3 "`) to one decimal.
pub fn normalize_rating(text: &str) -> String {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(format_rating)
        .unwrap_or_default()
}

/// Clamp to the star scale and round half away from zero to one decimal.
fn format_rating(value: f64) -> String {
    let clamped = value.clamp(0.0, MAX_RATING);
    format!("{:.1}", (clamped * 10.0).round() / 10.0)
}

/// Join breadcrumb entries with `" > "`, skipping blanks.
pub fn join_breadcrumb<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter_map(|p| {
            let t = p.as_ref().trim();
            (!t.is_empty()).then(|| t.to_string())
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Join absolute image URLs with `", "`, first occurrence wins, capped at
/// `max_len` characters.
pub fn join_image_urls<I, S>(urls: I, max_len: usize) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let unique: Vec<String> = urls
        .into_iter()
        .map(|u| u.as_ref().trim().to_string())
        .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
        .filter(|u| seen.insert(u.clone()))
        .collect();

    truncate_chars(&unique.join(", "), max_len)
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
