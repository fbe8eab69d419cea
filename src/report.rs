//! Renders an [`AnalysisResult`] into the investigative report and its
//! companion artifacts.
//!
//! Every renderer here is a pure function of its arguments: given the same
//! result and the same `generated_at` instant, the output is byte-identical.
//! The generated-at header is the only wall-clock content and it is injected
//! by the caller.

use crate::evidence::timestamp::format_timestamp;
use crate::evidence::types::{AnalysisResult, Event, TimeWindow};
use crate::utils::format::{format_number, truncate_value};
use chrono::{DateTime, Utc};

const RULE_WIDTH: usize = 80;

/// Fixed recommendation text closing every report.
const RECOMMENDATIONS: &[&str] = &[
    "Review each timeline entry and mark which activities you recognize.",
    "Cross-reference the listed IP addresses against your known locations and devices.",
    "Check for password, email, or two-factor changes you did not make.",
    "Change your password and enable two-factor authentication if you have not already.",
    "Preserve the original data export unmodified; it is the primary evidence.",
    "Document when you lost access and every support contact attempt.",
    "Consider consulting a cybersecurity professional or attorney for next steps.",
];

fn rule(c: char) -> String {
    std::iter::repeat(c).take(RULE_WIDTH).collect()
}

/// Render the full report. Section order is fixed: summary, timeline,
/// undated events, unique IPs, structural findings, skipped documents,
/// recommendations.
pub fn render(
    result: &AnalysisResult,
    window: &TimeWindow,
    generated_at: DateTime<Utc>,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    let s = &result.summary;

    lines.push(rule('='));
    lines.push("ACCOUNT BREACH EVIDENCE ANALYSIS REPORT".to_string());
    lines.push(rule('='));
    lines.push(format!("Generated: {}", format_timestamp(&generated_at)));
    lines.push(format!(
        "Incident window: {} .. {} (reference {})",
        format_timestamp(&window.start()),
        format_timestamp(&window.end()),
        format_timestamp(&window.reference),
    ));

    lines.push(String::new());
    lines.push("SUMMARY".to_string());
    lines.push(rule('-'));
    lines.push(format!(
        "Documents scanned:            {}",
        format_number(s.documents_scanned)
    ));
    lines.push(format!(
        "  with evidence:              {}",
        format_number(s.documents_with_evidence)
    ));
    lines.push(format!(
        "  without evidence:           {}",
        format_number(s.documents_without_evidence)
    ));
    lines.push(format!(
        "  skipped (decode failures):  {}",
        format_number(s.documents_skipped)
    ));
    lines.push(format!(
        "  unrecognized extensions:    {}",
        format_number(s.documents_unrecognized)
    ));
    lines.push(format!(
        "Events extracted:             {}",
        format_number(s.events_total)
    ));
    lines.push(format!(
        "  inside incident window:     {}",
        format_number(s.events_in_window)
    ));
    lines.push(format!(
        "  undated:                    {}",
        format_number(s.events_undated)
    ));
    lines.push(format!(
        "Structural findings:          {}",
        format_number(s.findings_total)
    ));
    lines.push(format!(
        "Unique IP addresses:          {}",
        format_number(s.unique_ips)
    ));

    lines.push(String::new());
    lines.push("TIMELINE OF EVENTS IN INCIDENT WINDOW".to_string());
    lines.push(rule('-'));
    if result.timeline.is_empty() {
        lines.push("No dated events fall inside the incident window.".to_string());
    } else {
        for event in &result.timeline {
            push_event(&mut lines, event);
        }
    }

    lines.push(String::new());
    lines.push("UNDATED EVENTS".to_string());
    lines.push(rule('-'));
    if result.undated.is_empty() {
        lines.push("None.".to_string());
    } else {
        for event in &result.undated {
            push_event(&mut lines, event);
        }
    }

    lines.push(String::new());
    lines.push("UNIQUE IP ADDRESSES".to_string());
    lines.push(rule('-'));
    if result.unique_ips.is_empty() {
        lines.push("No IP addresses found.".to_string());
    } else {
        for ip in &result.unique_ips {
            lines.push(format!("  - {}", ip));
        }
    }

    lines.push(String::new());
    lines.push("STRUCTURAL FINDINGS".to_string());
    lines.push(rule('-'));
    if result.findings.is_empty() {
        lines.push("No structural findings.".to_string());
    } else {
        for (i, finding) in result.findings.iter().enumerate() {
            let field = finding.field_name.as_deref().unwrap_or("-");
            lines.push(format!(
                "{}. [{}] {} / {}",
                i + 1,
                finding.category,
                finding.source,
                field
            ));
            let value = match &finding.value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("   Value: {}", truncate_value(&value, 200)));
        }
    }

    lines.push(String::new());
    lines.push("SKIPPED DOCUMENTS".to_string());
    lines.push(rule('-'));
    if result.skipped.is_empty() {
        lines.push("None.".to_string());
    } else {
        for skipped in &result.skipped {
            lines.push(format!("  - {}: {}", skipped.source, skipped.reason));
        }
    }

    lines.push(String::new());
    lines.push("RECOMMENDATIONS".to_string());
    lines.push(rule('-'));
    for (i, rec) in RECOMMENDATIONS.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, rec));
    }

    lines.push(String::new());
    lines.push(rule('='));
    lines.push("END OF REPORT".to_string());
    lines.push(rule('='));

    lines.join("\n")
}

fn push_event(lines: &mut Vec<String>, event: &Event) {
    let when = event
        .timestamp
        .map(|t| format_timestamp(&t))
        .or_else(|| event.raw_timestamp.clone())
        .unwrap_or_else(|| "unknown time".to_string());
    lines.push(format!("### {} - {}", when, event.kind.label()));
    lines.push(format!("    Source: {}", event.source));
    if let Some(raw) = &event.raw_timestamp {
        if event.timestamp.is_some() {
            lines.push(format!("    Raw timestamp: {}", truncate_value(raw, 200)));
        }
    }
    if let Some(ip) = &event.ip {
        lines.push(format!("    IP address: {}", ip));
    }
    if let Some(location) = &event.location {
        lines.push(format!("    Location: {}", truncate_value(location, 200)));
    }
    if let Some(device) = &event.device {
        lines.push(format!("    Device: {}", truncate_value(device, 200)));
    }
    if let Some(keyword) = &event.keyword {
        lines.push(format!("    Keyword: {}", keyword));
    }
    if let Some(context) = &event.context {
        lines.push(format!("    Context: {}", truncate_value(context, 200)));
    }
    for (key, value) in &event.extra_fields {
        lines.push(format!("    {}: {}", key, truncate_value(value, 200)));
    }
}

/// Plain-text IP list artifact.
pub fn render_ip_list(result: &AnalysisResult) -> String {
    let mut lines = vec![
        "IP Addresses Found in Account Activity".to_string(),
        rule('='),
        String::new(),
    ];
    for ip in &result.unique_ips {
        lines.push(ip.clone());
    }
    lines.join("\n")
}

/// Plain-text chronological timeline artifact: one line per dated event.
pub fn render_timeline(result: &AnalysisResult) -> String {
    let mut lines = vec!["Account Activity Timeline".to_string(), rule('='), String::new()];
    for event in &result.timeline {
        let when = event
            .timestamp
            .map(|t| format_timestamp(&t))
            .unwrap_or_default();
        let what = event
            .location
            .as_deref()
            .or(event.keyword.as_deref())
            .or(event.ip.as_deref())
            .unwrap_or("unknown");
        lines.push(format!("{} - {} - {}", when, event.kind.label(), what));
    }
    lines.join("\n")
}
