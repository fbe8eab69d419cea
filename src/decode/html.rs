//! HTML export decoder.
//!
//! Account exports ship security pages as HTML with a repeating shape:
//! `<section>` blocks titled by an `<h2>`, holding tables of label/value
//! `<td>` pairs. Those blocks are lifted into a JSON array so the structure
//! walker can treat HTML exports exactly like JSON ones; everything else is
//! reduced to tag-stripped plain text for token scanning.

use super::{read_utf8, Decoded, DecodeError, Decoder};
use regex::Regex;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::OnceLock;

pub struct HtmlDecoder;

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<section[^>]*>.*?</section>").expect("section regex"))
}

fn h2_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h2[^>]*>([^<]+)</h2>").expect("h2 regex"))
}

fn td_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<td[^>]*>([^<]*)</td>").expect("td regex"))
}

fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").expect("script regex")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag regex"))
}

impl Decoder for HtmlDecoder {
    fn decode(&self, path: &Path) -> Result<Decoded, DecodeError> {
        let content = read_utf8(path)?;
        let structured = extract_sections(&content);
        Ok(Decoded {
            raw_text: strip_tags(&content),
            structured: (!structured.is_empty()).then(|| Value::Array(structured)),
        })
    }
}

/// Reduce an HTML document to plain text: drop script/style bodies, replace
/// tags with spaces, decode the handful of entities exports actually use.
pub fn strip_tags(html: &str) -> String {
    let without_scripts = script_style_re().replace_all(html, " ");
    let without_tags = tag_re().replace_all(&without_scripts, " ");
    decode_entities(&without_tags)
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#064;", "@")
        .replace("&nbsp;", " ")
}

/// Lift export-style `<section>` blocks into mappings the walker can visit.
///
/// Each section becomes one object: the `<h2>` title under `event_type`,
/// then consecutive `<td>` cells paired as label/value, labels normalized to
/// `snake_case` field names (so `Time` → `time`, `IP Address` →
/// `ip_address`).
fn extract_sections(html: &str) -> Vec<Value> {
    let mut sections = Vec::new();

    for section in section_re().find_iter(html) {
        let body = section.as_str();
        let mut record = Map::new();

        if let Some(caps) = h2_re().captures(body) {
            let title = caps[1].trim();
            if !title.is_empty() {
                record.insert("event_type".to_string(), Value::String(title.to_string()));
            }
        }

        let cells: Vec<String> = td_re()
            .captures_iter(body)
            .map(|c| c[1].trim().to_string())
            .collect();
        for pair in cells.chunks(2) {
            let [label, value] = pair else { continue };
            let field = normalize_label(label);
            if !field.is_empty() && !value.is_empty() {
                record.insert(field, Value::String(decode_entities(value)));
            }
        }

        if !record.is_empty() {
            sections.push(Value::Object(record));
        }
    }

    sections
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .trim_end_matches(':')
        .to_ascii_lowercase()
        .replace(' ', "_")
}
