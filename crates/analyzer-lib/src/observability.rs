//! Structured logging for analysis runs
//!
//! Every pipeline stage reports through [`RunLogger`] so that log lines
//! carry an `event` field and the input source, whichever subscriber
//! (human-readable or JSON) the binary installs.

use crate::config::{FilterConfig, Verbosity};
use crate::error::RowError;
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};

/// Structured logger bound to one input source
#[derive(Debug, Clone)]
pub struct RunLogger {
    pub source: String,
    pub verbosity: Verbosity,
}

impl RunLogger {
    pub fn new(source: impl Into<String>, verbosity: Verbosity) -> Self {
        Self {
            source: source.into(),
            verbosity,
        }
    }

    /// Log a row that was skipped during ingest
    pub fn log_row_skipped(&self, error: &RowError) {
        if self.verbosity >= Verbosity::Verbose {
            warn!(
                event = "row_skipped",
                source = %self.source,
                row = error.row,
                reason = %error.kind,
                "Skipping malformed row"
            );
        } else {
            debug!(
                event = "row_skipped",
                source = %self.source,
                row = error.row,
                reason = %error.kind,
                "Skipping malformed row"
            );
        }
    }

    /// Log the outcome of reading the input file
    pub fn log_load_complete(&self, total_rows: usize, loaded: usize, skipped: usize) {
        info!(
            event = "load_complete",
            source = %self.source,
            total_rows = total_rows,
            loaded = loaded,
            skipped = skipped,
            "Loaded action records"
        );

        if skipped > 0 && self.verbosity == Verbosity::Normal {
            warn!(
                event = "rows_skipped",
                source = %self.source,
                skipped = skipped,
                "Some rows could not be parsed and were skipped (use -v for details)"
            );
        }
    }

    /// Log the record filter outcome
    pub fn log_filters_applied(&self, filter: &FilterConfig, input: usize, kept: usize) {
        info!(
            event = "filters_applied",
            source = %self.source,
            clusters = ?filter.clusters,
            namespaces = ?filter.namespaces,
            from = ?filter.window.from,
            to = ?filter.window.to,
            input = input,
            kept = kept,
            "Applied record filters"
        );
    }

    /// Log the conservative workload gate
    pub fn log_conservative_gate(
        &self,
        reference: NaiveDateTime,
        cutoff: NaiveDateTime,
        workloads_before: usize,
        workloads_after: usize,
    ) {
        info!(
            event = "conservative_gate",
            source = %self.source,
            reference = %reference,
            cutoff = %cutoff,
            workloads_before = workloads_before,
            workloads_after = workloads_after,
            dropped = workloads_before - workloads_after,
            "Applied conservative workload filter"
        );
    }

    /// Log the finished summary
    pub fn log_summary_built(&self, workloads: usize, with_changes: usize) {
        if workloads == 0 {
            warn!(
                event = "summary_built",
                source = %self.source,
                workloads = 0,
                "No workloads left after filtering"
            );
            return;
        }

        info!(
            event = "summary_built",
            source = %self.source,
            workloads = workloads,
            with_changes = with_changes,
            "Built commodity change summary"
        );
    }

    /// Log the finished time-bucket series
    pub fn log_buckets_built(&self, buckets: usize, bucket_size: Duration, records: usize) {
        info!(
            event = "buckets_built",
            source = %self.source,
            buckets = buckets,
            bucket_size_secs = bucket_size.num_seconds(),
            records = records,
            "Built time bucket series"
        );
    }
}

impl Default for RunLogger {
    fn default() -> Self {
        Self::new("<memory>", Verbosity::default())
    }
}
