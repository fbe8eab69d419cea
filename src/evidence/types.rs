//! Data structures for extracted breach evidence.
//!
//! Every extractor in the crate produces [`Event`]s and [`Finding`]s; the
//! aggregator owns them afterwards and folds them into one [`AnalysisResult`]
//! per run.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Classification of a timestamped evidence event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A login/session record recovered from structured export data.
    Login,
    /// A change to account security settings (password reset, 2FA, recovery).
    SecurityChange,
    /// A security keyword matched in free text, with surrounding context.
    KeywordMatch,
    /// A structural field match elevated to an event.
    StructuralFieldMatch,
}

impl EventKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::SecurityChange => "security change",
            Self::KeywordMatch => "keyword match",
            Self::StructuralFieldMatch => "field match",
        }
    }
}

/// A single timestamped (or undatable) piece of evidence.
///
/// Immutable once produced. When `timestamp` is set, `raw_timestamp` always
/// holds the original unparsed representation so the report stays traceable
/// back to the source document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Event {
    /// Originating document identifier (file name relative to the evidence root).
    pub source: String,
    pub kind: EventKind,
    pub timestamp: Option<DateTime<Utc>>,
    pub raw_timestamp: Option<String>,
    pub ip: Option<String>,
    pub location: Option<String>,
    pub device: Option<String>,
    pub keyword: Option<String>,
    pub context: Option<String>,
    /// Leftover scalar fields from the source record, keyed by original name.
    #[serde(default)]
    pub extra_fields: BTreeMap<String, String>,
}

impl Event {
    pub fn new(source: impl Into<String>, kind: EventKind) -> Self {
        Self {
            source: source.into(),
            kind,
            timestamp: None,
            raw_timestamp: None,
            ip: None,
            location: None,
            device: None,
            keyword: None,
            context: None,
            extra_fields: BTreeMap::new(),
        }
    }

    /// Number of populated optional fields. Used to pick the richer record
    /// when two events collapse under the same dedup key.
    pub fn richness(&self) -> usize {
        [
            self.timestamp.is_some(),
            self.raw_timestamp.is_some(),
            self.ip.is_some(),
            self.location.is_some(),
            self.device.is_some(),
            self.keyword.is_some(),
            self.context.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
            + self.extra_fields.len()
    }

    /// Dedup identity: `(source, timestamp-or-raw, ip, keyword)`.
    pub fn dedup_key(&self) -> (String, String, String, String) {
        let when = self
            .timestamp
            .map(|t| t.to_rfc3339())
            .or_else(|| self.raw_timestamp.clone())
            .unwrap_or_default();
        (
            self.source.clone(),
            when,
            self.ip.clone().unwrap_or_default(),
            self.keyword.clone().unwrap_or_default(),
        )
    }
}

/// A lower-confidence structural match that is not a full timestamped event.
///
/// Findings are reported in their own section and never merged into the
/// timeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Finding {
    pub source: String,
    /// Category tag, e.g. `security_field` or `epoch_activity`.
    pub category: String,
    /// Original (non-lowercased) key that matched, when applicable.
    pub field_name: Option<String>,
    /// Matched value, verbatim from the document.
    pub value: serde_json::Value,
}

/// The date range around a reference incident date used to filter the
/// reported timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub reference: DateTime<Utc>,
    before: Duration,
    after: Duration,
}

impl TimeWindow {
    /// Both spans must be non-negative.
    pub fn new(reference: DateTime<Utc>, before: Duration, after: Duration) -> Option<Self> {
        if before < Duration::zero() || after < Duration::zero() {
            return None;
        }
        Some(Self {
            reference,
            before,
            after,
        })
    }

    /// Symmetric window of `days` either side of the reference instant.
    pub fn symmetric_days(reference: DateTime<Utc>, days: i64) -> Option<Self> {
        Self::new(reference, Duration::days(days), Duration::days(days))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.reference - self.before
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.reference + self.after
    }

    /// Inclusive at both bounds.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start() && ts <= self.end()
    }
}

/// A document that failed to decode, with the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SkippedDocument {
    pub source: String,
    pub reason: String,
}

/// Summary counts for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Summary {
    pub documents_scanned: usize,
    pub documents_with_evidence: usize,
    pub documents_without_evidence: usize,
    pub documents_skipped: usize,
    pub documents_unrecognized: usize,
    pub events_total: usize,
    pub events_in_window: usize,
    pub events_undated: usize,
    pub findings_total: usize,
    pub unique_ips: usize,
}

/// Aggregate root for one run: the sorted timeline, the undated bucket, the
/// derived IP set, and structural findings. Built once by the aggregator and
/// handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalysisResult {
    /// Events inside the incident window, strictly ascending by timestamp.
    pub timeline: Vec<Event>,
    /// Events with no parseable timestamp, deterministically ordered.
    pub undated: Vec<Event>,
    /// Derived from event `ip` fields plus free IP tokens; never hand-populated.
    pub unique_ips: BTreeSet<String>,
    pub findings: Vec<Finding>,
    pub skipped: Vec<SkippedDocument>,
    pub summary: Summary,
}
