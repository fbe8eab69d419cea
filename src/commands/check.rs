//! Evidence directory verification.
//!
//! Dry-run check before a full analysis: counts files per format, probes
//! every document for decodability, and prints remediation hints for
//! anything that would be skipped. Nothing is written.
//!
//! # Usage
//!
//! ```bash
//! evidence-audit check ./export
//! ```

use crate::commands::AnalysisError;
use crate::decode::{scan_directory, DocumentFormat};
use crate::utils::format::format_number;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

pub fn run(evidence_dir: &str) -> Result<()> {
    let root = Path::new(evidence_dir);
    if !root.is_dir() {
        return Err(AnalysisError::MissingInput(evidence_dir.to_string()).into());
    }

    let scan = scan_directory(root)
        .with_context(|| format!("Failed to scan evidence directory: {}", evidence_dir))?;

    println!("{}", "=".repeat(60));
    println!("Evidence directory check: {}", evidence_dir);
    println!("{}", "=".repeat(60));

    let mut by_format: BTreeMap<&'static str, usize> = BTreeMap::new();
    for doc in &scan.documents {
        *by_format.entry(doc.format.label()).or_default() += 1;
    }

    println!();
    println!("Supported documents: {}", format_number(scan.documents.len()));
    for (label, count) in &by_format {
        println!("  {:<6} {}", label, format_number(*count));
    }
    println!(
        "Unrecognized files:  {}",
        format_number(scan.unrecognized.len())
    );
    for path in scan.unrecognized.iter().take(10) {
        println!("  - {}", path.display());
    }
    if scan.unrecognized.len() > 10 {
        println!("  ... and {} more", format_number(scan.unrecognized.len() - 10));
    }

    println!();
    println!("Decode probe:");
    let mut failures = 0usize;
    for doc in &scan.documents {
        match doc.format.decoder().decode(&doc.path) {
            Ok(_) => {}
            Err(err) => {
                failures += 1;
                println!("  FAIL {} ({})", doc.source, err);
            }
        }
    }
    if failures == 0 {
        println!("  all {} documents decode cleanly", format_number(scan.documents.len()));
    }

    println!();
    if scan.documents.is_empty() {
        println!("No supported documents found.");
        println!("Place the account export (JSON/HTML) and any correspondence");
        println!("(PDF/DOCX/TXT) under this directory, then re-run the check.");
        return Err(AnalysisError::NoDocuments(evidence_dir.to_string()).into());
    }
    if failures > 0 {
        println!(
            "{} of {} documents would be skipped during analysis.",
            format_number(failures),
            format_number(scan.documents.len())
        );
        println!("Skipped documents are listed in the report; re-export them if possible.");
    } else {
        println!("Directory looks ready for analysis.");
    }

    // JSON probe hint: exports sometimes arrive truncated.
    let json_count = by_format
        .get(DocumentFormat::Json.label())
        .copied()
        .unwrap_or(0);
    if json_count == 0 {
        println!("Note: no JSON files found; structured login history usually ships as JSON.");
    }

    Ok(())
}
