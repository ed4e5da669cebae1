//! Output formatting utilities

use analyzer_lib::Commodity;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

/// KB per GiB; memory commodities are exported in KB
pub const KB_PER_GIB: f64 = 1_048_576.0;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Text report (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any report as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Signed change in display units: mc for CPU, GiB for memory
pub fn format_change(commodity: Commodity, value: f64) -> String {
    if commodity.is_memory() {
        format!("{:+.2} GiB", value / KB_PER_GIB)
    } else {
        format!("{:+.0} mc", value)
    }
}

/// Signed change without the unit suffix, for table cells
pub fn format_change_cell(commodity: Commodity, value: f64) -> String {
    if commodity.is_memory() {
        format!("{:+.2}", value / KB_PER_GIB)
    } else {
        format!("{:+.0}", value)
    }
}

/// Absolute value in display units
pub fn format_value(commodity: Commodity, value: f64) -> String {
    if commodity.is_memory() {
        format!("{:.2} GiB", value / KB_PER_GIB)
    } else {
        format!("{:.0} mc", value)
    }
}

/// Format a duration in days, hours or minutes
pub fn format_span(span: chrono::Duration) -> String {
    let minutes = span.num_minutes();
    if minutes >= 24 * 60 {
        format!("{:.1} days", minutes as f64 / (24.0 * 60.0))
    } else if minutes >= 60 {
        format!("{:.1} hours", minutes as f64 / 60.0)
    } else {
        format!("{} min", minutes)
    }
}
