//! Screen-specific rendering for the TUI.
//!
//! Each screen fills the main content area between the title and status bars.

pub mod compose;
pub mod detail;
pub mod feed;
