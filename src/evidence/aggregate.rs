//! Merges per-document extraction results into one [`AnalysisResult`].
//!
//! Documents may be extracted in any order (the pipeline fans out with
//! rayon), so everything here sorts before it merges: the output is a pure
//! function of the input set, never of arrival order.

use crate::evidence::types::{
    AnalysisResult, Event, Finding, SkippedDocument, Summary, TimeWindow,
};
use std::collections::BTreeSet;

/// Everything extracted from a single evidence document.
#[derive(Debug, Default, Clone)]
pub struct DocumentEvidence {
    pub source: String,
    pub events: Vec<Event>,
    pub findings: Vec<Finding>,
    /// Context-free IP tokens found in the document text, independent of any
    /// event record.
    pub free_ips: BTreeSet<String>,
}

impl DocumentEvidence {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// True when the document produced nothing at all.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.findings.is_empty() && self.free_ips.is_empty()
    }
}

/// Fold per-document evidence into the aggregate result.
///
/// Deduplication key is `(source, timestamp-or-raw_timestamp, ip, keyword)`;
/// within a duplicate group the record with the most populated fields wins.
/// Dated events outside the window are excluded from the timeline but still
/// contribute their IPs; undated events are kept in their own bucket, never
/// silently dropped.
pub fn aggregate(
    mut documents: Vec<DocumentEvidence>,
    mut skipped: Vec<SkippedDocument>,
    unrecognized: usize,
    window: &TimeWindow,
) -> AnalysisResult {
    // Deterministic base order regardless of extraction completion order.
    documents.sort_by(|a, b| a.source.cmp(&b.source));
    skipped.sort_by(|a, b| a.source.cmp(&b.source));

    let documents_with_evidence = documents.iter().filter(|d| !d.is_empty()).count();
    let documents_without_evidence = documents.len() - documents_with_evidence;
    let documents_scanned = documents.len() + skipped.len();

    let mut free_ips = BTreeSet::new();
    let mut events = Vec::new();
    let mut findings = Vec::new();
    for doc in documents {
        events.extend(doc.events);
        findings.extend(doc.findings);
        free_ips.extend(doc.free_ips);
    }

    let events = dedupe(events);

    // The IP set is window-independent: an attacker's address is evidence
    // whether or not the record's timestamp lands inside the window.
    let mut unique_ips = free_ips;
    unique_ips.extend(events.iter().filter_map(|e| e.ip.clone()));

    let events_total = events.len();
    let mut timeline = Vec::new();
    let mut undated = Vec::new();
    for event in events {
        match event.timestamp {
            Some(ts) if window.contains(ts) => timeline.push(event),
            Some(_) => {} // dated but outside the window
            None => undated.push(event),
        }
    }

    timeline.sort_by(|a, b| {
        (a.timestamp, &a.source, a.kind, &a.ip, &a.keyword).cmp(&(
            b.timestamp,
            &b.source,
            b.kind,
            &b.ip,
            &b.keyword,
        ))
    });
    undated.sort_by(|a, b| {
        (&a.source, a.kind, &a.keyword, &a.raw_timestamp, &a.context).cmp(&(
            &b.source,
            b.kind,
            &b.keyword,
            &b.raw_timestamp,
            &b.context,
        ))
    });

    let summary = Summary {
        documents_scanned,
        documents_with_evidence,
        documents_without_evidence,
        documents_skipped: skipped.len(),
        documents_unrecognized: unrecognized,
        events_total,
        events_in_window: timeline.len(),
        events_undated: undated.len(),
        findings_total: findings.len(),
        unique_ips: unique_ips.len(),
    };

    AnalysisResult {
        timeline,
        undated,
        unique_ips,
        findings,
        skipped,
        summary,
    }
}

/// Collapse events sharing a dedup key, keeping the richest record of each
/// group. Stable: equal-richness ties resolve to the earliest in sorted
/// order.
fn dedupe(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| a.dedup_key().cmp(&b.dedup_key()));

    let mut out: Vec<Event> = Vec::with_capacity(events.len());
    for event in events {
        match out.last_mut() {
            Some(last) if last.dedup_key() == event.dedup_key() => {
                if event.richness() > last.richness() {
                    *last = event;
                }
            }
            _ => out.push(event),
        }
    }
    out
}
