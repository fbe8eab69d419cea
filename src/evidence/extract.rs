//! Per-document extraction: turns one decoded document into evidence.
//!
//! This is the glue between the format decoders and the aggregation step.
//! Structured documents get a structural walk first; then the raw text plus
//! every string leaf goes through the token scanners. Each document is
//! independent, which is what makes the per-document fan-out safe.

use crate::decode::Decoded;
use crate::evidence::aggregate::DocumentEvidence;
use crate::evidence::timestamp::format_timestamp;
use crate::evidence::tokens::{
    self, DEFAULT_CONTEXT_RADIUS, SECURITY_KEYWORDS,
};
use crate::evidence::types::{Event, EventKind, Finding, TimeWindow};
use crate::evidence::walker::{self, FIELD_KEYWORDS};
use serde_json::Value;

/// Extract every event, finding, and free IP token from one decoded
/// document.
pub fn extract_document(source: &str, decoded: &Decoded, window: &TimeWindow) -> DocumentEvidence {
    let mut doc = DocumentEvidence::new(source);
    let mut corpus = decoded.raw_text.clone();

    if let Some(root) = &decoded.structured {
        let outcome = walker::walk(source, root, FIELD_KEYWORDS);
        doc.events = outcome.events;
        doc.findings = outcome.findings;

        // Structural string leaves also feed the token scanners, so evidence
        // buried in nested values is found even when no key matched.
        for leaf in &outcome.leaf_text {
            corpus.push('\n');
            corpus.push_str(leaf);
        }
    }

    doc.free_ips = tokens::extract_ips(&corpus);

    for hit in tokens::extract_keyword_hits(&corpus, SECURITY_KEYWORDS, DEFAULT_CONTEXT_RADIUS) {
        let kind = if tokens::is_security_change(&hit.keyword) {
            EventKind::SecurityChange
        } else {
            EventKind::KeywordMatch
        };
        let mut event = Event::new(source, kind);
        event.keyword = Some(hit.keyword);
        event.context = Some(hit.context);
        doc.events.push(event);
    }

    // Security keywords sitting inside matched structural field values get
    // their own event: the field name pins down which record fired.
    for finding in &doc.findings {
        let Value::String(value) = &finding.value else {
            continue;
        };
        let lower = value.to_ascii_lowercase();
        for keyword in SECURITY_KEYWORDS {
            if lower.contains(keyword) {
                let mut event = Event::new(source, EventKind::StructuralFieldMatch);
                event.keyword = Some((*keyword).to_string());
                event.context = finding
                    .field_name
                    .as_ref()
                    .map(|f| format!("{}: {}", f, value));
                doc.events.push(event);
            }
        }
    }

    // Bare epoch integers inside the incident window are worth flagging even
    // without a surrounding record.
    for (raw, instant) in tokens::extract_epoch_hits(&corpus, window) {
        doc.findings.push(Finding {
            source: source.to_string(),
            category: "epoch_activity".to_string(),
            field_name: None,
            value: Value::String(format!("{} ({})", raw, format_timestamp(&instant))),
        });
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn window() -> TimeWindow {
        let reference = Utc.with_ymd_and_hms(2024, 12, 24, 0, 0, 0).unwrap();
        TimeWindow::symmetric_days(reference, 14).unwrap()
    }

    fn decoded(raw: &str, structured: Option<Value>) -> Decoded {
        Decoded {
            raw_text: raw.to_string(),
            structured,
        }
    }

    #[test]
    fn test_plain_text_keywords_and_ips() {
        let doc = extract_document(
            "ticket.txt",
            &decoded("unauthorized access from 203.0.113.9", None),
            &window(),
        );

        assert!(doc.free_ips.contains("203.0.113.9"));
        assert!(doc
            .events
            .iter()
            .any(|e| e.keyword.as_deref() == Some("unauthorized")));
    }

    #[test]
    fn test_structured_login_record() {
        let root = serde_json::json!({
            "sessions": [{
                "timestamp": 1735027200,
                "ip_address": "198.51.100.7",
                "city": "Denver"
            }]
        });
        let doc = extract_document("activity.json", &decoded("", Some(root)), &window());

        let login = doc
            .events
            .iter()
            .find(|e| e.kind == EventKind::Login)
            .unwrap();
        assert_eq!(login.ip.as_deref(), Some("198.51.100.7"));
        assert_eq!(login.location.as_deref(), Some("Denver"));
        // Leaf text feeds the IP scanner too.
        assert!(doc.free_ips.contains("198.51.100.7"));
    }

    #[test]
    fn test_security_keyword_in_matched_field_value() {
        let root = serde_json::json!({
            "account_security": "password changed by unknown device"
        });
        let doc = extract_document("settings.json", &decoded("", Some(root)), &window());

        assert!(doc
            .events
            .iter()
            .any(|e| e.kind == EventKind::StructuralFieldMatch
                && e.keyword.as_deref() == Some("password changed")));
    }

    #[test]
    fn test_epoch_token_in_window_becomes_finding() {
        // 2024-12-26 00:00:00 UTC
        let doc = extract_document(
            "notes.txt",
            &decoded("last activity marker 1735171200 end", None),
            &window(),
        );

        assert!(doc
            .findings
            .iter()
            .any(|f| f.category == "epoch_activity" && f.value.as_str().unwrap().contains("1735171200")));
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        let doc = extract_document("blank.txt", &decoded("nothing relevant here", None), &window());
        assert!(doc.is_empty());
    }
}
