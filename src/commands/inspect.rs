//! Single-document inspection.
//!
//! Decodes one file and prints what the extractor sees: format, structure,
//! events by kind, keyword hits, and IP tokens. Useful for checking why a
//! document did (or did not) contribute evidence to a full analysis run.
//!
//! # Usage
//!
//! ```bash
//! evidence-audit inspect export/security/login_history.html
//!
//! # Pin the incident date so epoch-token findings use the real window
//! evidence-audit inspect export/activity.json --incident-date 2024-12-24
//! ```

use crate::evidence::extract::extract_document;
use crate::evidence::timestamp::{format_timestamp, normalize_str};
use crate::evidence::types::{EventKind, TimeWindow};
use crate::utils::format::{format_number, truncate_value};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::path::Path;

pub fn run(file: &str, incident_date: Option<&str>) -> Result<()> {
    let path = Path::new(file);
    if !path.is_file() {
        bail!("file not found: {}", file);
    }

    let window = match incident_date {
        Some(raw) => {
            let reference = normalize_str(raw)
                .with_context(|| format!("Unrecognized incident date: {}", raw))?;
            TimeWindow::symmetric_days(reference, 14)
        }
        // No incident date given: scan the whole supported year range so
        // every plausible epoch token is surfaced.
        None => TimeWindow::symmetric_days(Utc::now(), 36_500),
    }
    .context("Window days must not be negative")?;

    let Some(decode_result) = crate::decode::decode_path(path) else {
        bail!(
            "unrecognized file extension: {} (supported: .json, .html, .htm, .pdf, .docx, .doc, .txt)",
            file
        );
    };
    let decoded =
        decode_result.with_context(|| format!("Failed to decode document: {}", file))?;

    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file)
        .to_string();
    let doc = extract_document(&source, &decoded, &window);

    println!("{}", "=".repeat(60));
    println!("Document: {}", file);
    println!("{}", "=".repeat(60));
    println!(
        "Text extracted:   {} chars",
        format_number(decoded.raw_text.chars().count())
    );
    println!(
        "Structured data:  {}",
        if decoded.structured.is_some() {
            "yes"
        } else {
            "no"
        }
    );

    let count_kind =
        |kind: EventKind| doc.events.iter().filter(|e| e.kind == kind).count();
    println!();
    println!("Events:           {}", format_number(doc.events.len()));
    println!("  logins:         {}", format_number(count_kind(EventKind::Login)));
    println!(
        "  security:       {}",
        format_number(count_kind(EventKind::SecurityChange))
    );
    println!(
        "  keyword hits:   {}",
        format_number(count_kind(EventKind::KeywordMatch))
    );
    println!(
        "  field matches:  {}",
        format_number(count_kind(EventKind::StructuralFieldMatch))
    );
    println!("Findings:         {}", format_number(doc.findings.len()));
    println!("IP addresses:     {}", format_number(doc.free_ips.len()));

    if !doc.free_ips.is_empty() {
        println!();
        println!("IPs:");
        for ip in &doc.free_ips {
            println!("  - {}", ip);
        }
    }

    if !doc.events.is_empty() {
        println!();
        println!("Events:");
        for event in &doc.events {
            let when = event
                .timestamp
                .map(|t| format_timestamp(&t))
                .or_else(|| event.raw_timestamp.clone())
                .unwrap_or_else(|| "undated".to_string());
            let detail = event
                .keyword
                .as_deref()
                .or(event.location.as_deref())
                .or(event.ip.as_deref())
                .unwrap_or("-");
            println!(
                "  {} [{}] {}",
                when,
                event.kind.label(),
                truncate_value(detail, 80)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_inspect_json_document() {
        let mut temp = NamedTempFile::with_suffix(".json").unwrap();
        write!(
            temp,
            r#"{{"login":{{"timestamp":"2024-12-24 10:00:00","ip":"203.0.113.9"}}}}"#
        )
        .unwrap();
        temp.flush().unwrap();

        run(temp.path().to_str().unwrap(), Some("2024-12-24")).unwrap();
    }

    #[test]
    fn test_inspect_missing_file() {
        let err = run("/nonexistent/file.json", None).unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_inspect_unrecognized_extension() {
        let mut temp = NamedTempFile::with_suffix(".jpg").unwrap();
        temp.write_all(&[0xff, 0xd8]).unwrap();
        temp.flush().unwrap();

        let err = run(temp.path().to_str().unwrap(), None).unwrap_err();
        assert!(err.to_string().contains("unrecognized file extension"));
    }
}
