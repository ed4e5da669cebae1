//! Oldest-vs-newest change resolution
//!
//! A group's change is the cumulative move from the oldest action's starting
//! value to the newest action's ending value; intermediate actions are not
//! summed.

use crate::grouping::{CommodityGroup, WorkloadCohort};
use crate::models::Commodity;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Replica count at the workload's earliest and latest action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaTransition {
    pub from: u32,
    pub to: u32,
}

impl ReplicaTransition {
    pub fn is_unchanged(&self) -> bool {
        self.from == self.to
    }

    /// Workload-level transition across all commodities
    pub fn for_cohort(cohort: &WorkloadCohort<'_>) -> Self {
        Self {
            from: cohort.earliest().replicas,
            to: cohort.latest().replicas,
        }
    }
}

impl fmt::Display for ReplicaTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unchanged() {
            f.write_str("no change")
        } else {
            write!(f, "{}→{}", self.from, self.to)
        }
    }
}

/// Resolved change for one (workload, commodity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityChange {
    pub commodity: Commodity,
    /// Current value on the oldest action
    pub old_value: f64,
    /// New value on the newest action
    pub new_value: f64,
    pub delta: f64,
    pub percent_delta: f64,
    pub oldest_at: NaiveDateTime,
    pub newest_at: NaiveDateTime,
    pub action_count: usize,
    pub units: String,
    /// Delta scaled by the workload's current replica count
    pub total_impact: f64,
}

impl CommodityChange {
    pub fn time_span(&self) -> Duration {
        self.newest_at - self.oldest_at
    }

    /// Time span in fractional days
    pub fn span_days(&self) -> f64 {
        self.time_span().num_seconds() as f64 / 86_400.0
    }
}

/// Percentage change, defined as zero when there is no baseline
pub fn percent_change(delta: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        delta / baseline * 100.0
    }
}

/// Resolve one group, scaling the delta by `current_replicas`
pub fn resolve_group(
    commodity: Commodity,
    group: &CommodityGroup<'_>,
    current_replicas: u32,
) -> CommodityChange {
    let oldest = group.oldest();
    let newest = group.newest();
    let delta = newest.new_value - oldest.current_value;

    CommodityChange {
        commodity,
        old_value: oldest.current_value,
        new_value: newest.new_value,
        delta,
        percent_delta: percent_change(delta, oldest.current_value),
        oldest_at: oldest.created_at,
        newest_at: newest.created_at,
        action_count: group.len(),
        units: oldest.units.clone(),
        total_impact: delta * f64::from(current_replicas),
    }
}

/// Resolve every commodity of a workload plus its replica transition
pub fn resolve_cohort(cohort: &WorkloadCohort<'_>) -> (ReplicaTransition, Vec<CommodityChange>) {
    let transition = ReplicaTransition::for_cohort(cohort);
    let changes = cohort
        .groups()
        .map(|(commodity, group)| resolve_group(commodity, group, transition.to))
        .collect();
    (transition, changes)
}
