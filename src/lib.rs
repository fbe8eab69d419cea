//! # Breach Evidence Tools
//!
//! Command-line tools for extracting and correlating security evidence from
//! exported account-activity documents after a suspected account takeover.
//!
//! ## Overview
//!
//! When an account is compromised, the evidence is scattered across whatever
//! the provider's data export contains: JSON activity logs, HTML security
//! pages, PDF correspondence, DOCX notes, plain-text tickets. This crate
//! decodes each format, normalizes timestamps, extracts IP addresses and
//! security-relevant keywords, filters events against an incident window,
//! and renders a single deterministic investigative report.
//!
//! ## Features
//!
//! - **Five input formats** - JSON, HTML, PDF, DOCX/DOC, and plain text
//! - **Incident window correlation** - keep events within a configurable
//!   number of days around the incident date (default ±14)
//! - **Best-effort decoding** - unreadable documents are catalogued and
//!   reported, never silently dropped
//! - **Deterministic output** - identical input produces byte-identical
//!   reports, sequential or parallel
//! - **Parallel processing** - per-document fan-out across CPU cores
//! - **Shell completion** for bash, zsh, fish, powershell, and elvish
//!
//! ## Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`decode`] - Per-format document decoders behind one trait
//! - [`evidence`] - Format-independent extraction and correlation engine
//! - [`report`] - Deterministic report rendering
//! - [`commands`] - Individual CLI command implementations
//! - [`utils`] - Shared utilities (formatting, progress, parallel fan-out)
//!
//! ## Example Usage
//!
//! ```bash
//! # Verify the export directory, then run the analysis
//! evidence-audit check ./export
//! evidence-audit analyze ./export --incident-date 2024-12-24
//!
//! # Wider window plus companion artifacts
//! evidence-audit analyze ./export --incident-date 2024-12-24 \
//!     --days-before 30 --ips-file suspicious_ips.txt --export-csv events.csv
//! ```

pub mod commands;
pub mod decode;
pub mod evidence;
pub mod report;
pub mod utils;
