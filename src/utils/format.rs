//! Number and text formatting utilities.
//!
//! This module provides common formatting functions used across commands
//! for consistent output presentation.

/// Formats a number with comma separators for thousands.
///
/// # Examples
///
/// ```
/// use breach_evidence_tools::utils::format::format_number;
///
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Truncates a value for report display, appending `...` when shortened.
///
/// Operates on characters, not bytes, so multi-byte values never get split
/// mid-codepoint.
pub fn truncate_value(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let head: String = value.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
