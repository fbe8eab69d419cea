//! Free-text scanning for IPv4 tokens, security keywords, and epoch stamps.
//!
//! These scanners work on the raw text every decoder produces, so evidence
//! embedded in HTML bodies, PDF page text, or JSON string values is caught
//! even when the surrounding structure is opaque.

use crate::evidence::types::TimeWindow;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Security-relevant terms scanned case-insensitively in document text.
///
/// Multi-word phrases match as literal substrings. The list is fixed and
/// documented; callers can pass their own set where needed.
pub const SECURITY_KEYWORDS: &[&str] = &[
    "unauthorized",
    "breach",
    "hacked",
    "compromised",
    "suspicious activity",
    "unrecognized",
    "unknown device",
    "failed login",
    "password changed",
    "password reset",
    "email changed",
    "security alert",
    "login alert",
    "account recovery",
    "two-factor",
    "security code",
    "security checkup",
    "phone number added",
    "phone number removed",
];

/// Subset of [`SECURITY_KEYWORDS`] that indicates a change to account
/// security settings rather than a generic alert.
pub const SECURITY_CHANGE_KEYWORDS: &[&str] = &[
    "password changed",
    "password reset",
    "email changed",
    "account recovery",
    "two-factor",
    "security code",
    "phone number added",
    "phone number removed",
];

/// Maximum context length kept around a keyword hit.
pub const MAX_CONTEXT_LEN: usize = 500;

/// Default context radius (chars either side of the match).
pub const DEFAULT_CONTEXT_RADIUS: usize = 100;

/// One keyword occurrence with its cleaned surrounding text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KeywordHit {
    pub keyword: String,
    pub context: String,
}

fn ip_candidate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("ip regex"))
}

fn markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("markup regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

fn epoch_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Ten-digit epoch seconds, 2017..2033. Shorter runs are too noisy.
    RE.get_or_init(|| Regex::new(r"\b(1[5-9]\d{8})\b").expect("epoch regex"))
}

/// Extract validated IPv4 addresses from raw text.
///
/// The regex only matches dotted-quad shape; each candidate's octets must
/// then parse into 0..=255 or the candidate is dropped as a false positive
/// (version strings and the like).
pub fn extract_ips(text: &str) -> BTreeSet<String> {
    ip_candidate_re()
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|candidate| {
            candidate
                .split('.')
                .all(|octet| octet.parse::<u16>().map(|v| v <= 255).unwrap_or(false))
        })
        .map(str::to_string)
        .collect()
}

/// Find every occurrence of every keyword, case-insensitively, recording the
/// cleaned context around each hit.
///
/// Matching runs over a whitespace-collapsed shadow of the text, so
/// multi-word keywords still hit when the source puts runs of spaces, tabs,
/// or newlines between the words (which is exactly what tag-stripping
/// produces). Multiple occurrences of the same keyword are all kept (each
/// carries its own context); exact-duplicate `(keyword, context)` pairs are
/// collapsed so repeated passes over one source cannot inflate the results.
pub fn extract_keyword_hits(
    text: &str,
    keywords: &[&str],
    context_radius: usize,
) -> Vec<KeywordHit> {
    let (shadow, offsets) = collapse_for_scan(text);
    let mut hits = Vec::new();
    let mut seen = BTreeSet::new();

    for keyword in keywords {
        let needle = keyword.to_ascii_lowercase();
        let mut from = 0;
        while let Some(rel) = shadow[from..].find(&needle) {
            let start = from + rel;
            let end = start + needle.len();
            let context = clean_context(
                text,
                offsets[start],
                offsets[end - 1] + 1,
                context_radius,
            );
            from = end;

            let hit = KeywordHit {
                keyword: (*keyword).to_string(),
                context,
            };
            if seen.insert((hit.keyword.clone(), hit.context.clone())) {
                hits.push(hit);
            }
        }
    }

    hits
}

/// Lowercase the text and collapse every whitespace run to a single space.
///
/// Returns the shadow plus, for each shadow byte, the byte offset of the
/// originating character in `text`, so match positions map back to the
/// original for context extraction.
fn collapse_for_scan(text: &str) -> (String, Vec<usize>) {
    let mut shadow = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len());
    let mut pending_space = false;

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            pending_space = !shadow.is_empty();
            continue;
        }
        if pending_space {
            shadow.push(' ');
            offsets.push(idx);
            pending_space = false;
        }
        let lower = ch.to_ascii_lowercase();
        shadow.push(lower);
        for _ in 0..lower.len_utf8() {
            offsets.push(idx);
        }
    }

    (shadow, offsets)
}

/// Slice `context_radius` chars either side of the match, strip markup,
/// collapse whitespace, and cap the result.
fn clean_context(text: &str, start: usize, end: usize, context_radius: usize) -> String {
    let mut lo = start.saturating_sub(context_radius);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + context_radius).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }

    let stripped = markup_re().replace_all(&text[lo..hi], " ");
    let collapsed = whitespace_re().replace_all(stripped.trim(), " ");
    truncate_chars(&collapsed, MAX_CONTEXT_LEN)
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

/// Scan raw text for ten-digit epoch integers that fall inside the incident
/// window. Returns `(raw_token, parsed_instant)` pairs, deduplicated.
pub fn extract_epoch_hits(text: &str, window: &TimeWindow) -> Vec<(String, DateTime<Utc>)> {
    let mut seen = BTreeSet::new();
    let mut hits = Vec::new();

    for m in epoch_re().find_iter(text) {
        let raw = m.as_str();
        let Ok(secs) = raw.parse::<i64>() else {
            continue;
        };
        let Some(dt) = crate::evidence::timestamp::normalize_epoch(secs) else {
            continue;
        };
        if window.contains(dt) && seen.insert(raw.to_string()) {
            hits.push((raw.to_string(), dt));
        }
    }

    hits
}

/// True when a matched keyword indicates a security-settings change rather
/// than a generic alert.
pub fn is_security_change(keyword: &str) -> bool {
    SECURITY_CHANGE_KEYWORDS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ip_octet_validation() {
        let ips = extract_ips("electron 999.1.1.1 contacted 10.0.0.5");
        assert_eq!(ips.len(), 1);
        assert!(ips.contains("10.0.0.5"));
    }

    #[test]
    fn test_ip_extraction_dedupes() {
        let ips = extract_ips("192.168.0.1 talked to 192.168.0.1 and 8.8.8.8");
        assert_eq!(ips.len(), 2);
        assert!(ips.contains("192.168.0.1"));
        assert!(ips.contains("8.8.8.8"));
    }

    #[test]
    fn test_ip_rejects_version_strings() {
        assert!(extract_ips("firefox 133.0.6943.98 released").is_empty());
        assert!(extract_ips("no addresses here").is_empty());
    }

    #[test]
    fn test_keyword_case_insensitive_with_context() {
        let text = "Alert: UNAUTHORIZED access detected from a new device yesterday";
        let hits = extract_keyword_hits(text, &["unauthorized"], 20);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].keyword, "unauthorized");
        assert!(hits[0].context.contains("UNAUTHORIZED access"));
    }

    #[test]
    fn test_keyword_multiple_occurrences_kept() {
        let text = "breach here ............................ and another breach there";
        let hits = extract_keyword_hits(text, &["breach"], 8);
        assert_eq!(hits.len(), 2);
        assert_ne!(hits[0].context, hits[1].context);
    }

    #[test]
    fn test_keyword_exact_duplicates_collapsed() {
        let text = "breach breach";
        // Radius wide enough that both occurrences see the whole string.
        let hits = extract_keyword_hits(text, &["breach"], 50);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_multiword_keyword_spans_whitespace_runs() {
        // Tag-stripping leaves runs of spaces and newlines between words;
        // phrase keywords must still match across them.
        let text = "notice: Password\n\t  Changed for your account";
        let hits = extract_keyword_hits(text, &["password changed"], 30);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].keyword, "password changed");
        assert!(hits[0].context.contains("Password Changed"));
    }

    #[test]
    fn test_context_strips_markup_and_collapses_whitespace() {
        let text = "<td>Password   changed</td>\n<td>on  your   account</td>";
        let hits = extract_keyword_hits(text, &["password changed"], 60);
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].context.contains('<'));
        assert!(!hits[0].context.contains("  "));
    }

    #[test]
    fn test_context_capped() {
        let long = format!("{} breach {}", "x".repeat(800), "y".repeat(800));
        let hits = extract_keyword_hits(&long, &["breach"], 700);
        assert!(hits[0].context.chars().count() <= MAX_CONTEXT_LEN);
    }

    #[test]
    fn test_epoch_hits_respect_window() {
        let reference = Utc.with_ymd_and_hms(2024, 12, 24, 0, 0, 0).unwrap();
        let window = TimeWindow::symmetric_days(reference, 14).unwrap();

        // 1735034400 = 2024-12-24T10:00:00Z (inside), 1640995200 = 2022-01-01 (outside)
        let text = "ts=1735034400 old=1640995200 junk=1234";
        let hits = extract_epoch_hits(text, &window);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "1735034400");
    }

    #[test]
    fn test_security_change_classification() {
        assert!(is_security_change("password reset"));
        assert!(is_security_change("Password Changed"));
        assert!(!is_security_change("unauthorized"));
    }
}
