//! Command implementations for analyzing account breach evidence.
//!
//! Each module in this package implements a specific CLI subcommand:
//!
//! - [`analyze`] - Full pipeline: scan, decode, extract, correlate, report
//! - [`inspect`] - Decode a single document and print its extraction summary
//! - [`check`] - Verify an evidence directory before running an analysis

use thiserror::Error;

pub mod analyze;
pub mod check;
pub mod inspect;

/// Errors that stop a command before its pipeline starts.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("evidence directory not found: {0}")]
    MissingInput(String),

    #[error("no parseable evidence documents found under {0} (expected .json, .html, .pdf, .docx, .doc, or .txt files)")]
    NoDocuments(String),
}
