//! Recursive-structure walker for decoded export documents.
//!
//! Export JSON is arbitrarily nested and its shape varies between export
//! versions, so the walker visits every key of every mapping and every
//! element of every sequence with an explicit work stack. No recursion, so
//! pathological nesting depth cannot overflow the stack.
//!
//! Three things come out of a walk:
//!
//! - [`Finding`]s for mapping keys whose lowercased text contains a
//!   configured field keyword;
//! - `Login` [`Event`]s for mappings that carry a timestamp under one of the
//!   known field names, with IP/location/device resolved by priority lists;
//! - every string leaf, so the caller can run token extraction over values
//!   as well as keys.

use crate::evidence::timestamp;
use crate::evidence::types::{Event, EventKind, Finding};
use serde_json::Value;

/// Field-name substrings that flag a mapping key as security-relevant.
pub const FIELD_KEYWORDS: &[&str] = &[
    "login",
    "session",
    "ip",
    "device",
    "location",
    "access",
    "unauthorized",
    "breach",
    "security",
    "password",
    "authentication",
    "token",
];

/// Timestamp field names probed in priority order; the first present wins.
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "created_timestamp", "time", "datetime"];
const IP_KEYS: &[&str] = &["ip", "ip_address", "user_ip"];
const LOCATION_KEYS: &[&str] = &["location", "city", "region", "country"];
const DEVICE_KEYS: &[&str] = &["device", "user_agent", "platform"];

/// Everything extracted from one structural walk.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub findings: Vec<Finding>,
    pub events: Vec<Event>,
    /// String leaves in visit order, for token extraction by the caller.
    pub leaf_text: Vec<String>,
}

/// Work items for the explicit traversal stack. `Leave` marks the end of a
/// node's subtree and pops its path segment, so one shared path vector
/// tracks the current position instead of cloning the prefix per child.
enum Task<'a> {
    Visit(&'a Value, Option<String>),
    Leave,
}

/// Walk a decoded document structure, emitting findings, login events, and
/// string leaves in a stable depth-first document order.
pub fn walk(source: &str, root: &Value, field_keywords: &[&str]) -> WalkOutcome {
    let mut outcome = WalkOutcome::default();
    let mut path: Vec<String> = Vec::new();
    // Children pushed in reverse so they pop in document order.
    let mut stack: Vec<Task> = vec![Task::Visit(root, None)];

    while let Some(task) = stack.pop() {
        let (node, segment) = match task {
            Task::Leave => {
                path.pop();
                continue;
            }
            Task::Visit(node, segment) => (node, segment),
        };
        let owns_segment = segment.is_some();
        if let Some(segment) = segment {
            path.push(segment);
        }

        match node {
            Value::Object(map) => {
                if let Some(event) = login_event_from_map(source, &path, map) {
                    outcome.events.push(event);
                }

                for (key, value) in map.iter() {
                    let key_lower = key.to_ascii_lowercase();
                    if field_keywords.iter().any(|kw| key_lower.contains(kw)) {
                        outcome.findings.push(Finding {
                            source: source.to_string(),
                            category: "security_field".to_string(),
                            field_name: Some(key.clone()),
                            value: value.clone(),
                        });
                    }
                }

                if owns_segment {
                    stack.push(Task::Leave);
                }
                for (key, value) in map.iter().rev() {
                    stack.push(Task::Visit(value, Some(key.clone())));
                }
            }
            Value::Array(items) => {
                if owns_segment {
                    stack.push(Task::Leave);
                }
                for (idx, item) in items.iter().enumerate().rev() {
                    stack.push(Task::Visit(item, Some(idx.to_string())));
                }
            }
            leaf => {
                if let Value::String(s) = leaf {
                    outcome.leaf_text.push(s.clone());
                }
                if owns_segment {
                    path.pop();
                }
            }
        }
    }

    outcome
}

/// Resolve the first present key from a priority list to a display string.
fn first_scalar<'a>(
    map: &serde_json::Map<String, Value>,
    keys: &[&'a str],
) -> Option<(&'a str, String)> {
    for key in keys {
        if let Some(value) = map.get(*key) {
            if let Some(text) = scalar_to_string(value) {
                return Some((key, text));
            }
        }
    }
    None
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Build a `Login` event from a mapping that carries a recognizable
/// timestamp field. Mappings without one are not login records.
fn login_event_from_map(
    source: &str,
    path: &[String],
    map: &serde_json::Map<String, Value>,
) -> Option<Event> {
    let ts_key = TIMESTAMP_KEYS.iter().find(|k| map.contains_key(**k))?;
    let ts_value = map.get(*ts_key)?;
    let raw = scalar_to_string(ts_value)?;

    let mut event = Event::new(source, EventKind::Login);
    event.timestamp = timestamp::normalize_value(ts_value);
    event.raw_timestamp = Some(raw);

    if let Some((_, ip)) = first_scalar(map, IP_KEYS) {
        event.ip = Some(ip);
    }
    if let Some((_, location)) = first_scalar(map, LOCATION_KEYS) {
        event.location = Some(location);
    }
    if let Some((_, device)) = first_scalar(map, DEVICE_KEYS) {
        event.device = Some(device);
    }

    let consumed: Vec<&str> = std::iter::once(*ts_key)
        .chain(IP_KEYS.iter().copied())
        .chain(LOCATION_KEYS.iter().copied())
        .chain(DEVICE_KEYS.iter().copied())
        .collect();

    for (key, value) in map.iter() {
        if consumed.contains(&key.as_str()) {
            continue;
        }
        if let Some(text) = scalar_to_string(value) {
            event.extra_fields.insert(key.clone(), text);
        }
    }

    if !path.is_empty() {
        event
            .extra_fields
            .insert("record_path".to_string(), path.join("."));
    }

    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_finding_for_matching_key() {
        let root = json!({"session": {"login_ip": "1.2.3.4", "note": "ok"}});
        let outcome = walk("export.json", &root, &["ip", "login"]);

        let finding = outcome
            .findings
            .iter()
            .find(|f| f.field_name.as_deref() == Some("login_ip"))
            .expect("login_ip finding");
        assert_eq!(finding.value, json!("1.2.3.4"));
        assert_eq!(finding.source, "export.json");
    }

    #[test]
    fn test_leaf_strings_collected() {
        let root = json!({"a": ["x", {"b": "y"}], "c": 3, "d": "z"});
        let outcome = walk("f.json", &root, FIELD_KEYWORDS);
        assert_eq!(outcome.leaf_text, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_login_event_field_priority() {
        let root = json!({
            "account_activity": [{
                "timestamp": 1735034400,
                "time": "ignored, lower priority",
                "ip_address": "203.0.113.9",
                "city": "Denver",
                "country": "US",
                "user_agent": "Firefox",
                "action": "Login"
            }]
        });
        let outcome = walk("login_history.json", &root, FIELD_KEYWORDS);

        assert_eq!(outcome.events.len(), 1);
        let event = &outcome.events[0];
        assert_eq!(event.kind, EventKind::Login);
        // "timestamp" outranks "time"
        assert_eq!(event.raw_timestamp.as_deref(), Some("1735034400"));
        assert!(event.timestamp.is_some());
        assert_eq!(event.ip.as_deref(), Some("203.0.113.9"));
        // "city" outranks "country" after "location" misses
        assert_eq!(event.location.as_deref(), Some("Denver"));
        assert_eq!(event.device.as_deref(), Some("Firefox"));
        assert_eq!(event.extra_fields.get("action").map(String::as_str), Some("Login"));
    }

    #[test]
    fn test_login_event_unparseable_timestamp_still_recorded() {
        let root = json!({"time": "around christmas", "ip": "10.0.0.5"});
        let outcome = walk("notes.json", &root, FIELD_KEYWORDS);

        assert_eq!(outcome.events.len(), 1);
        let event = &outcome.events[0];
        assert!(event.timestamp.is_none());
        assert_eq!(event.raw_timestamp.as_deref(), Some("around christmas"));
        assert_eq!(event.ip.as_deref(), Some("10.0.0.5"));
    }

    #[test]
    fn test_no_timestamp_no_login_event() {
        let root = json!({"ip": "10.0.0.5", "device": "phone"});
        let outcome = walk("f.json", &root, FIELD_KEYWORDS);
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        // Deep enough to overflow any recursive traversal on a test thread.
        // Built with `Map::insert` because the `json!` macro would serialize
        // the accumulated value recursively on every wrap.
        let mut root = json!({"time": "2024-12-24 10:00:00"});
        for _ in 0..50_000 {
            let mut map = serde_json::Map::new();
            map.insert("wrap".to_string(), root);
            root = Value::Object(map);
        }
        let outcome = walk("deep.json", &root, FIELD_KEYWORDS);
        assert_eq!(outcome.events.len(), 1);

        // Dismantle iteratively; dropping the nested value wholesale would
        // itself recurse.
        while let Value::Object(mut map) = root {
            root = map.remove("wrap").unwrap_or(Value::Null);
        }
    }

    #[test]
    fn test_record_paths_do_not_leak_between_siblings() {
        let root = json!({
            "mobile": {"sessions": [{"time": "2024-12-20 08:00:00"}]},
            "web": {"sessions": [{"time": "2024-12-21 09:00:00"}]}
        });
        let outcome = walk("activity.json", &root, FIELD_KEYWORDS);

        let paths: Vec<&str> = outcome
            .events
            .iter()
            .map(|e| e.extra_fields["record_path"].as_str())
            .collect();
        assert_eq!(paths, vec!["mobile.sessions.0", "web.sessions.0"]);
    }

    #[test]
    fn test_walk_order_is_stable() {
        let root = json!({"b": "first", "a": "second", "list": ["third", "fourth"]});
        let a = walk("f.json", &root, FIELD_KEYWORDS);
        let b = walk("f.json", &root, FIELD_KEYWORDS);
        assert_eq!(a.leaf_text, b.leaf_text);
        // Insertion order, not alphabetical.
        assert_eq!(a.leaf_text, vec!["first", "second", "third", "fourth"]);
    }
}
