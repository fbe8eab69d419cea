//! Core evidence extraction and correlation engine.
//!
//! This module holds the format-independent logic: once a decoder has turned
//! a document into raw text and/or a nested JSON-like structure, everything
//! here works the same way regardless of the source format.
//!
//! ## Key Components
//!
//! - [`types`] - Event, Finding, TimeWindow, and the aggregate result
//! - [`timestamp`] - Best-effort multi-format timestamp normalization
//! - [`tokens`] - IP, keyword, and epoch scanning over raw text
//! - [`walker`] - Iterative traversal of nested export structures
//! - [`extract`] - Per-document extraction over decoded content
//! - [`aggregate`] - Deterministic merge of per-document results
//!
//! ## Example
//!
//! ```
//! use breach_evidence_tools::evidence::{timestamp, tokens};
//!
//! let instant = timestamp::normalize_str("2024-12-24 10:00:00").unwrap();
//! let ips = tokens::extract_ips("login from 203.0.113.9");
//! assert!(ips.contains("203.0.113.9"));
//! ```

pub mod aggregate;
pub mod extract;
pub mod timestamp;
pub mod tokens;
pub mod types;
pub mod walker;
