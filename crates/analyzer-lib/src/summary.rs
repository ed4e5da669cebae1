//! Per-workload summary table and aggregate statistics

use crate::config::DisplayLimit;
use crate::filter::ConservativeGate;
use crate::grouping::WorkloadGroups;
use crate::models::{Commodity, PerCommodity, WorkloadKey};
use crate::resolver::{resolve_cohort, CommodityChange, ReplicaTransition};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;

/// One output row: a workload with up to four commodity changes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadSummary {
    pub key: WorkloadKey,
    pub replicas: ReplicaTransition,
    pub first_seen: NaiveDateTime,
    pub last_seen: NaiveDateTime,
    pub changes: PerCommodity<Option<CommodityChange>>,
}

impl WorkloadSummary {
    /// Total impact for a commodity, zero when the workload has no such actions
    pub fn total_impact(&self, commodity: Commodity) -> f64 {
        self.changes[commodity]
            .as_ref()
            .map_or(0.0, |c| c.total_impact)
    }

    /// Sum of absolute total impacts over every commodity
    pub fn absolute_impact(&self) -> f64 {
        Commodity::ALL
            .iter()
            .map(|c| self.total_impact(*c).abs())
            .sum()
    }

    pub fn has_changes(&self) -> bool {
        self.absolute_impact() > 0.0
    }
}

/// Canonical table order: largest |VCPURequest| impact first, then by name
pub fn canonical_order(a: &WorkloadSummary, b: &WorkloadSummary) -> Ordering {
    let impact = |s: &WorkloadSummary| s.total_impact(Commodity::VcpuRequest).abs();
    impact(b)
        .partial_cmp(&impact(a))
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.key.cmp(&b.key))
}

/// Per-commodity statistics over all summary rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CommodityStats {
    /// Workloads with a non-zero total impact
    pub changed: usize,
    pub increases: usize,
    pub decreases: usize,
    pub total_impact: f64,
}

/// Statistics over the full (untruncated) summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_workloads: usize,
    pub workloads_with_changes: usize,
    pub commodities: PerCommodity<CommodityStats>,
}

impl SummaryStats {
    pub fn from_rows(rows: &[WorkloadSummary]) -> Self {
        let mut stats = SummaryStats {
            total_workloads: rows.len(),
            workloads_with_changes: rows.iter().filter(|r| r.has_changes()).count(),
            commodities: PerCommodity::default(),
        };

        for row in rows {
            for commodity in Commodity::ALL {
                let impact = row.total_impact(commodity);
                let entry = &mut stats.commodities[commodity];
                entry.total_impact += impact;
                if impact != 0.0 {
                    entry.changed += 1;
                }
                if impact > 0.0 {
                    entry.increases += 1;
                } else if impact < 0.0 {
                    entry.decreases += 1;
                }
            }
        }
        stats
    }
}

/// Result of the summary path
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    /// Every workload in canonical order
    pub rows: Vec<WorkloadSummary>,
    pub stats: SummaryStats,
    /// Recency gate applied before resolving, if conservative mode was on
    pub gate: Option<ConservativeGate>,
    #[serde(skip)]
    pub display: DisplayLimit,
}

impl SummaryReport {
    /// Rows for the ranked table; statistics are unaffected
    pub fn displayed(&self) -> &[WorkloadSummary] {
        match self.display {
            DisplayLimit::All => &self.rows,
            DisplayLimit::Top(n) => &self.rows[..n.min(self.rows.len())],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Resolve every cohort into a summary row
pub fn summarize_groups(groups: &WorkloadGroups<'_>) -> Vec<WorkloadSummary> {
    groups
        .cohorts()
        .map(|cohort| {
            let (replicas, changes) = resolve_cohort(cohort);
            let mut columns: PerCommodity<Option<CommodityChange>> = PerCommodity::default();
            for change in changes {
                let commodity = change.commodity;
                columns[commodity] = Some(change);
            }
            WorkloadSummary {
                key: cohort.key.clone(),
                replicas,
                first_seen: cohort.earliest().at,
                last_seen: cohort.latest().at,
                changes: columns,
            }
        })
        .collect()
}

/// Build the sorted summary and its statistics
pub fn build_report(groups: &WorkloadGroups<'_>, display: DisplayLimit) -> SummaryReport {
    let mut rows = summarize_groups(groups);
    rows.sort_by(canonical_order);
    let stats = SummaryStats::from_rows(&rows);
    SummaryReport {
        rows,
        stats,
        gate: None,
        display,
    }
}
