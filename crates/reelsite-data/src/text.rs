//! Text normalization: slugs, descriptions, escaping, durations and dates.
//!
//! Every function here is total. Odd input is coerced to a safe fallback
//! rather than reported as an error.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::{Captures, Regex};

/// Descriptions longer than this are truncated.
pub const SHORT_DESCRIPTION_MAX: usize = 180;

/// Characters kept before the ellipsis when truncating.
const SHORT_DESCRIPTION_KEEP: usize = 177;

/// Longest title-derived slug stem.
const TITLE_SLUG_MAX: usize = 80;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("Invalid URL regex"));

static TITLE_DROP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s_-]").expect("Invalid title regex"));

static TITLE_SEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("Invalid separator regex"));

/// Make a URL-safe slug.
///
/// Lowercases, replaces anything outside `a-z 0-9 - _ /` with `-`, trims
/// `-` from both ends and collapses repeated `/`. An empty result becomes
/// `"site"`. Applying it twice gives the same result as applying it once.
pub fn sanitize_slug(raw: &str) -> String {
    let replaced: String = raw
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '/') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut slug = String::with_capacity(replaced.len());
    for c in replaced.trim_matches('-').chars() {
        if c == '/' && slug.ends_with('/') {
            continue;
        }
        slug.push(c);
    }

    if slug.is_empty() {
        "site".to_string()
    } else {
        slug
    }
}

/// Turn a title into a readable slug stem, e.g. `"Hello, World!"` -> `"hello-world"`.
///
/// Punctuation and non-ASCII letters are dropped; whitespace and `_` runs
/// become a single `-`. May return an empty string.
pub fn slugify_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let kept = TITLE_DROP_RE.replace_all(&lowered, "");
    let joined = TITLE_SEP_RE.replace_all(&kept, "-");
    let stem: String = joined.trim_matches('-').chars().take(TITLE_SLUG_MAX).collect();
    stem.trim_end_matches('-').to_string()
}

/// Collapse whitespace and cap the length at 180 characters.
///
/// Longer text keeps its first 177 characters followed by `...`.
pub fn short_description(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= SHORT_DESCRIPTION_MAX {
        return collapsed;
    }

    let mut short: String = collapsed.chars().take(SHORT_DESCRIPTION_KEEP).collect();
    short.push_str("...");
    short
}

/// Escape text for element content (`&`, `<`, `>`).
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a plain-text description as HTML.
///
/// Escapes first, then wraps bare `http(s)://` URLs in anchors, then turns
/// newlines into `<br>`. Escaping must come first so the inserted markup is
/// not escaped again.
pub fn linkify_description(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let escaped = escape_text(normalized.trim());

    let linked = URL_RE.replace_all(&escaped, |caps: &Captures| {
        let matched = &caps[0];

        // An escaped `<` or `>` ends the URL.
        let end = [matched.find("&lt;"), matched.find("&gt;")]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(matched.len());
        let url = matched[..end].trim_end_matches(&['.', ',', '!', '?', ')'][..]);
        let rest = &matched[url.len()..];

        if url.ends_with("://") {
            return matched.to_string();
        }

        format!(r#"<a class="link" href="{url}" target="_blank" rel="noopener">{url}</a>{rest}"#)
    });

    linked.replace('\n', "<br>\n")
}

/// Format a duration as `MM:SS`, or `HH:MM:SS` when it reaches an hour.
pub fn duration_text(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// ISO-8601 duration (`PT<n>S`), or `None` for zero-length videos.
pub fn iso_duration(seconds: u64) -> Option<String> {
    (seconds > 0).then(|| format!("PT{seconds}S"))
}

/// Coerce an optional count to a non-negative integer.
pub fn coerce_count(value: Option<f64>) -> u64 {
    value.map(whole_seconds).unwrap_or(0)
}

fn whole_seconds(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}

/// Format an integer with thousands separators, e.g. `1234567` -> `"1,234,567"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Parse the date formats seen in video data.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Human date such as `"May 01, 2024"`.
///
/// Unparseable input is returned as-is; empty input gives `None`.
pub fn pretty_date(raw: Option<&str>) -> Option<String> {
    let s = raw.map(str::trim).filter(|s| !s.is_empty())?;

    match parse_datetime(s) {
        Some(dt) => Some(dt.format("%B %d, %Y").to_string()),
        None => Some(s.to_string()),
    }
}

/// RFC 3339 timestamp in UTC with a `Z` suffix.
///
/// Date-only input becomes midnight UTC, empty input becomes `now`, and
/// anything unparseable falls back to its leading `YYYY-MM-DD`.
pub fn iso_datetime(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return now.to_rfc3339_opts(SecondsFormat::Secs, true);
    };

    if let Some(dt) = parse_datetime(s) {
        return dt.to_rfc3339_opts(SecondsFormat::Secs, true);
    }

    match s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()) {
        Some(date) => format!("{}T00:00:00Z", date.format("%Y-%m-%d")),
        None => now.to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}
