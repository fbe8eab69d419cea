//! Full evidence analysis pipeline.
//!
//! Scans an evidence directory, decodes every supported document, extracts
//! events and IP tokens, correlates them against the incident window, and
//! writes the investigative report plus any requested companion artifacts.
//!
//! # Usage
//!
//! ```bash
//! # Analyze an account export around the incident date
//! evidence-audit analyze ./export --incident-date 2024-12-24
//!
//! # Widen the window and write all artifacts
//! evidence-audit analyze ./export --incident-date 2024-12-24 \
//!     --days-before 30 --days-after 7 \
//!     --output BREACH_REPORT.txt \
//!     --ips-file suspicious_ips.txt \
//!     --timeline-file timeline.txt \
//!     --export-csv events.csv
//!
//! # Force single-threaded decoding (useful when debugging one document)
//! evidence-audit analyze ./export --incident-date 2024-12-24 --sequential
//! ```
//!
//! # Output
//!
//! The report always lands at `--output` (default `BREACH_REPORT.txt`).
//! Documents that fail to decode are listed in the report and the console
//! summary, never silently dropped; the command only fails when the
//! directory is missing, nothing decodes, or an artifact cannot be written.

use crate::commands::AnalysisError;
use crate::decode::{scan_directory, DiscoveredDocument, ScanResult};
use crate::evidence::aggregate::{aggregate, DocumentEvidence};
use crate::evidence::extract::extract_document;
use crate::evidence::timestamp::{format_timestamp, normalize_str};
use crate::evidence::types::{AnalysisResult, SkippedDocument, TimeWindow};
use crate::report;
use crate::utils::format::format_number;
use crate::utils::parallel::map_with_progress;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::fs::File;
use std::path::Path;

#[allow(clippy::too_many_arguments)]
pub fn run(
    evidence_dir: &str,
    incident_date: &str,
    days_before: i64,
    days_after: i64,
    output: &str,
    ips_file: Option<&str>,
    timeline_file: Option<&str>,
    export_csv: Option<&str>,
    sequential: bool,
) -> Result<()> {
    let reference = normalize_str(incident_date)
        .with_context(|| format!("Unrecognized incident date: {}", incident_date))?;
    let window = TimeWindow::new(
        reference,
        Duration::days(days_before),
        Duration::days(days_after),
    )
    .context("Window days must not be negative")?;

    let root = Path::new(evidence_dir);
    if !root.is_dir() {
        return Err(AnalysisError::MissingInput(evidence_dir.to_string()).into());
    }

    eprintln!("Scanning evidence directory: {}", evidence_dir);
    let scan = scan_directory(root)
        .with_context(|| format!("Failed to scan evidence directory: {}", evidence_dir))?;
    if scan.documents.is_empty() {
        return Err(AnalysisError::NoDocuments(evidence_dir.to_string()).into());
    }
    eprintln!(
        "Found {} documents ({} unrecognized files catalogued)",
        format_number(scan.documents.len()),
        format_number(scan.unrecognized.len())
    );

    let result = run_pipeline(&scan, &window, sequential);

    let rendered = report::render(&result, &window, Utc::now());
    std::fs::write(output, &rendered)
        .with_context(|| format!("Failed to write report: {}", output))?;

    if let Some(path) = ips_file {
        std::fs::write(path, report::render_ip_list(&result))
            .with_context(|| format!("Failed to write IP list: {}", path))?;
    }
    if let Some(path) = timeline_file {
        std::fs::write(path, report::render_timeline(&result))
            .with_context(|| format!("Failed to write timeline: {}", path))?;
    }
    if let Some(path) = export_csv {
        write_event_csv(&result, path)
            .with_context(|| format!("Failed to write CSV export: {}", path))?;
    }

    print_summary(&result, &window, output);
    Ok(())
}

/// Decode and extract every document, then fold into the aggregate result.
/// Parallel and sequential paths produce identical output.
fn run_pipeline(scan: &ScanResult, window: &TimeWindow, sequential: bool) -> AnalysisResult {
    let outcomes = map_with_progress(&scan.documents, "Decoding", sequential, |doc| {
        decode_and_extract(doc, window)
    });

    let mut documents = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(doc) => documents.push(doc),
            Err(skip) => skipped.push(skip),
        }
    }

    for skip in &skipped {
        eprintln!("Warning: skipped {}: {}", skip.source, skip.reason);
    }

    aggregate(documents, skipped, scan.unrecognized.len(), window)
}

fn decode_and_extract(
    doc: &DiscoveredDocument,
    window: &TimeWindow,
) -> std::result::Result<DocumentEvidence, SkippedDocument> {
    match doc.format.decoder().decode(&doc.path) {
        Ok(decoded) => Ok(extract_document(&doc.source, &decoded, window)),
        Err(err) => Err(SkippedDocument {
            source: doc.source.clone(),
            reason: err.to_string(),
        }),
    }
}

/// CSV export of every retained event: timeline rows first, then undated.
fn write_event_csv(result: &AnalysisResult, path: &str) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "source",
        "kind",
        "timestamp",
        "raw_timestamp",
        "ip",
        "location",
        "device",
        "keyword",
        "context",
    ])?;

    for event in result.timeline.iter().chain(result.undated.iter()) {
        writer.write_record([
            event.source.as_str(),
            event.kind.label(),
            &event
                .timestamp
                .map(|t| format_timestamp(&t))
                .unwrap_or_default(),
            event.raw_timestamp.as_deref().unwrap_or(""),
            event.ip.as_deref().unwrap_or(""),
            event.location.as_deref().unwrap_or(""),
            event.device.as_deref().unwrap_or(""),
            event.keyword.as_deref().unwrap_or(""),
            event.context.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn print_summary(result: &AnalysisResult, window: &TimeWindow, output: &str) {
    let s = &result.summary;
    println!();
    println!("{}", "=".repeat(60));
    println!("Analysis complete");
    println!("{}", "=".repeat(60));
    println!(
        "Incident window:     {} .. {}",
        format_timestamp(&window.start()),
        format_timestamp(&window.end())
    );
    println!(
        "Documents scanned:   {} ({} skipped, {} unrecognized)",
        format_number(s.documents_scanned),
        format_number(s.documents_skipped),
        format_number(s.documents_unrecognized)
    );
    println!(
        "Events:              {} total, {} in window, {} undated",
        format_number(s.events_total),
        format_number(s.events_in_window),
        format_number(s.events_undated)
    );
    println!(
        "Unique IP addresses: {}",
        format_number(s.unique_ips)
    );
    println!("Report written to:   {}", output);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("logins.json"),
            r#"{"sessions":[{"timestamp":"2024-12-23 10:00:00","ip_address":"203.0.113.9","city":"Denver"}]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("note.txt"),
            "support said there was unauthorized access from 198.51.100.7",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_full_pipeline_writes_report() {
        let evidence = write_fixture_dir();
        let out_dir = TempDir::new().unwrap();
        let report_path = out_dir.path().join("report.txt");

        run(
            evidence.path().to_str().unwrap(),
            "2024-12-24",
            14,
            14,
            report_path.to_str().unwrap(),
            None,
            None,
            None,
            true,
        )
        .unwrap();

        let report = fs::read_to_string(&report_path).unwrap();
        assert!(report.contains("2024-12-23 10:00:00"));
        assert!(report.contains("203.0.113.9"));
        assert!(report.contains("198.51.100.7"));
        assert!(report.contains("unauthorized"));
    }

    #[test]
    fn test_missing_directory_fails() {
        let out_dir = TempDir::new().unwrap();
        let report_path = out_dir.path().join("report.txt");

        let err = run(
            "/nonexistent/evidence",
            "2024-12-24",
            14,
            14,
            report_path.to_str().unwrap(),
            None,
            None,
            None,
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_directory_with_no_documents_fails() {
        let evidence = TempDir::new().unwrap();
        fs::write(evidence.path().join("photo.jpg"), [0xff, 0xd8]).unwrap();
        let out_dir = TempDir::new().unwrap();
        let report_path = out_dir.path().join("report.txt");

        let err = run(
            evidence.path().to_str().unwrap(),
            "2024-12-24",
            14,
            14,
            report_path.to_str().unwrap(),
            None,
            None,
            None,
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no parseable evidence documents"));
    }

    #[test]
    fn test_artifacts_written() {
        let evidence = write_fixture_dir();
        let out_dir = TempDir::new().unwrap();
        let report_path = out_dir.path().join("report.txt");
        let ips_path = out_dir.path().join("ips.txt");
        let timeline_path = out_dir.path().join("timeline.txt");
        let csv_path = out_dir.path().join("events.csv");

        run(
            evidence.path().to_str().unwrap(),
            "2024-12-24",
            14,
            14,
            report_path.to_str().unwrap(),
            Some(ips_path.to_str().unwrap()),
            Some(timeline_path.to_str().unwrap()),
            Some(csv_path.to_str().unwrap()),
            true,
        )
        .unwrap();

        let ips = fs::read_to_string(&ips_path).unwrap();
        assert!(ips.contains("203.0.113.9"));
        assert!(ips.contains("198.51.100.7"));

        let timeline = fs::read_to_string(&timeline_path).unwrap();
        assert!(timeline.contains("2024-12-23 10:00:00"));

        let csv = fs::read_to_string(&csv_path).unwrap();
        assert!(csv.starts_with("source,kind,timestamp"));
        assert!(csv.contains("logins.json"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let evidence = write_fixture_dir();
        let out_dir = TempDir::new().unwrap();
        let seq_path = out_dir.path().join("seq.txt");
        let par_path = out_dir.path().join("par.txt");

        for (path, sequential) in [(&seq_path, true), (&par_path, false)] {
            run(
                evidence.path().to_str().unwrap(),
                "2024-12-24",
                14,
                14,
                path.to_str().unwrap(),
                None,
                None,
                None,
                sequential,
            )
            .unwrap();
        }

        let seq = fs::read_to_string(&seq_path).unwrap();
        let par = fs::read_to_string(&par_path).unwrap();
        // Reports differ only in the generated-at line.
        let strip = |s: &str| {
            s.lines()
                .filter(|l| !l.starts_with("Generated:"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(strip(&seq), strip(&par));
    }
}
