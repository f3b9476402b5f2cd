//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_date, format_date_short, sanitize_text, truncate_string};
