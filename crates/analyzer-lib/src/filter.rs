//! Record filters
//!
//! Each predicate is pure and they combine with logical AND. The execution
//! status check is always active; the others are no-ops when unconfigured.

use crate::config::{FilterConfig, TimeWindow};
use crate::error::{AnalyzerError, Result};
use crate::grouping::{WorkloadCohort, WorkloadGroups};
use crate::models::{normalize_cluster, ActionRecord};
use chrono::{Duration, NaiveDateTime};
use glob::Pattern;
use serde::Serialize;
use std::collections::HashSet;

/// Compiled form of a [`FilterConfig`]
#[derive(Debug, Clone)]
pub struct RecordFilter {
    clusters: HashSet<String>,
    namespaces: Vec<Pattern>,
    window: TimeWindow,
}

impl RecordFilter {
    /// Compile a filter config, rejecting invalid namespace patterns
    pub fn new(config: &FilterConfig) -> Result<Self> {
        let clusters = config.clusters.iter().map(|c| c.trim().to_string()).collect();

        let namespaces = config
            .namespaces
            .iter()
            .map(|ns| {
                Pattern::new(&namespace_pattern(ns.trim())).map_err(|e| {
                    AnalyzerError::InvalidFilterArgument(format!(
                        "invalid namespace pattern '{}': {}",
                        ns, e
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            clusters,
            namespaces,
            window: config.window,
        })
    }

    /// The record's raw or `Kubernetes-`-stripped cluster must be one of
    /// the supplied names, compared verbatim
    pub fn matches_cluster(&self, record: &ActionRecord) -> bool {
        self.clusters.is_empty()
            || self.clusters.contains(record.cluster.as_str())
            || self.clusters.contains(normalize_cluster(&record.cluster))
    }

    /// Exact or wildcard namespace match against any pattern
    pub fn matches_namespace(&self, record: &ActionRecord) -> bool {
        self.namespaces.is_empty() || self.namespaces.iter().any(|p| p.matches(&record.namespace))
    }

    pub fn matches_window(&self, record: &ActionRecord) -> bool {
        self.window.contains(record.created_at)
    }

    /// Only successfully executed actions are eligible
    pub fn matches_status(&self, record: &ActionRecord) -> bool {
        record.succeeded()
    }

    pub fn matches(&self, record: &ActionRecord) -> bool {
        self.matches_status(record)
            && self.matches_cluster(record)
            && self.matches_namespace(record)
            && self.matches_window(record)
    }

    /// Keep matching records, preserving input order
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a ActionRecord>
    where
        I: IntoIterator<Item = &'a ActionRecord>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Glob source for a namespace filter where only `*` is special
fn namespace_pattern(raw: &str) -> String {
    let mut pattern = String::with_capacity(raw.len());
    for (i, literal) in raw.split('*').enumerate() {
        if i > 0 && !pattern.ends_with('*') {
            pattern.push('*');
        }
        pattern.push_str(&Pattern::escape(literal));
    }
    pattern
}

/// Workload-level recency gate
///
/// Keeps a workload only if at least one of its records falls within the
/// lookback window ending at `reference`. The reference is the latest
/// eligible timestamp of the whole dataset, computed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConservativeGate {
    pub reference: NaiveDateTime,
    pub lookback_days: u32,
}

impl ConservativeGate {
    pub fn new(reference: NaiveDateTime, lookback_days: u32) -> Self {
        Self {
            reference,
            lookback_days,
        }
    }

    /// Use the latest successful action in `records` as the reference
    pub fn from_dataset(records: &[ActionRecord], lookback_days: u32) -> Option<Self> {
        records
            .iter()
            .filter(|r| r.succeeded())
            .map(|r| r.created_at)
            .max()
            .map(|reference| Self::new(reference, lookback_days))
    }

    /// Start of the lookback window, clamped to the earliest representable time
    pub fn cutoff(&self) -> NaiveDateTime {
        self.reference
            .checked_sub_signed(Duration::days(i64::from(self.lookback_days)))
            .unwrap_or(NaiveDateTime::MIN)
    }

    pub fn is_active(&self, cohort: &WorkloadCohort<'_>) -> bool {
        cohort.latest().at >= self.cutoff()
    }

    /// Drop inactive workloads, returning how many were removed
    pub fn apply(&self, groups: &mut WorkloadGroups<'_>) -> usize {
        let before = groups.len();
        groups.retain(|cohort| self.is_active(cohort));
        before - groups.len()
    }
}
