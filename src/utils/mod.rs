//! Utility functions and helpers.
//!
//! This module provides common functionality used across multiple commands:
//!
//! - [`format`] - Number and text formatting for report output
//! - [`parallel`] - Rayon-backed document fan-out with deterministic ordering
//! - [`progress`] - Progress tracking and display utilities
//!
//! # Examples
//!
//! ## Formatting counts
//!
//! ```
//! use breach_evidence_tools::utils::format::format_number;
//!
//! assert_eq!(format_number(12345), "12,345");
//! ```

pub mod format;
pub mod parallel;
pub mod progress;
