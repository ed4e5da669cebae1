//! Subcommand implementations

pub mod buckets;
pub mod summary;

use analyzer_lib::{
    config::parse_filter_datetime, ActionLoader, ActionRecord, FilterConfig, RunLogger, TimeWindow,
    Verbosity,
};
use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::output::{print_info, OutputFormat};
use crate::FilterArgs;

/// Settings shared by every subcommand
#[derive(Debug, Clone)]
pub struct RunContext {
    pub format: OutputFormat,
    pub verbosity: Verbosity,
    pub defaults: Config,
}

impl RunContext {
    pub fn logger(&self, path: &Path) -> RunLogger {
        RunLogger::new(path.display().to_string(), self.verbosity)
    }
}

impl FilterArgs {
    /// Validate the filter flags into an engine filter config
    pub fn to_filter_config(&self) -> Result<FilterConfig> {
        let from = self.from.as_deref().map(parse_filter_datetime).transpose()?;
        let to = self.to.as_deref().map(parse_filter_datetime).transpose()?;
        Ok(FilterConfig {
            clusters: self.clusters.clone(),
            namespaces: self.namespaces.clone(),
            window: TimeWindow::new(from, to)?,
        })
    }
}

/// Load an export, reporting skipped rows on the console
pub fn load_records(path: &Path, ctx: &RunContext) -> Result<Vec<ActionRecord>> {
    let outcome = ActionLoader::new(ctx.logger(path))
        .load_path(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    if ctx.verbosity > Verbosity::Quiet && ctx.format == OutputFormat::Table {
        print_info(&format!(
            "Loaded {} of {} rows from {} ({} skipped)",
            outcome.records.len(),
            outcome.total_rows,
            path.display(),
            outcome.skipped.len()
        ));
    }
    Ok(outcome.records)
}

/// Describe active filters, one line each
pub fn filter_lines(filter: &FilterConfig) -> Vec<String> {
    let mut lines = Vec::new();
    if !filter.clusters.is_empty() {
        lines.push(format!("Filtered Clusters: {}", filter.clusters.join(", ")));
    }
    if !filter.namespaces.is_empty() {
        lines.push(format!("Filtered Namespaces: {}", filter.namespaces.join(", ")));
    }
    let fmt = |ts: chrono::NaiveDateTime| ts.format("%d %b %Y %H:%M").to_string();
    match (filter.window.from, filter.window.to) {
        (Some(from), Some(to)) => lines.push(format!("Time Window: from {} to {}", fmt(from), fmt(to))),
        (Some(from), None) => lines.push(format!("Time Window: from {}", fmt(from))),
        (None, Some(to)) => lines.push(format!("Time Window: up to {}", fmt(to))),
        (None, None) => {}
    }
    lines
}

/// Write a rendered report to a file
pub fn write_report(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("Failed to write report {}", path.display()))
}
