//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_db, load_catalog, argument helpers) and init
//! - `import` - CSV import
//! - `records` - Record commands (list, add, edit, delete)
//! - `reports` - Monthly report, alerts, years, categories

pub mod core;
pub mod import;
pub mod records;
pub mod reports;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use records::*;
pub use reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Text bar for a 0-100 percentage
pub fn bar(percentage: f64) -> String {
    let width = (percentage.clamp(0.0, 100.0) / 5.0).round() as usize;
    "█".repeat(width)
}
