//! Per-workload listing of the actions behind each summary row

use crate::grouping::{CommodityGroup, WorkloadGroups};
use crate::models::{ActionRecord, Commodity, PerCommodity, WorkloadKey};
use crate::resolver::{resolve_group, ReplicaTransition};
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeSet;

/// A single action as listed in the breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionStep {
    pub at: NaiveDateTime,
    pub current_value: f64,
    pub new_value: f64,
    pub replicas: u32,
}

impl From<&ActionRecord> for ActionStep {
    fn from(record: &ActionRecord) -> Self {
        Self {
            at: record.created_at,
            current_value: record.current_value,
            new_value: record.new_value,
            replicas: record.replicas,
        }
    }
}

/// How one commodity of one workload moved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommodityTrail {
    pub commodity: Commodity,
    /// Container spec of the oldest action
    pub container: String,
    pub action_count: usize,
    pub first_at: NaiveDateTime,
    pub last_at: NaiveDateTime,
    /// Current value of the oldest action
    pub from_value: f64,
    /// New value of the newest action
    pub to_value: f64,
    pub replicas_from: u32,
    pub replicas_to: u32,
    /// Same value as the summary row's total impact for this commodity
    pub total_impact: f64,
    /// Individual actions, only listed when there are more than two
    pub steps: Vec<ActionStep>,
}

impl CommodityTrail {
    fn from_group(
        commodity: Commodity,
        group: &CommodityGroup<'_>,
        replicas: ReplicaTransition,
    ) -> Self {
        let oldest = group.oldest();
        let newest = group.newest();
        let change = resolve_group(commodity, group, replicas.to);
        let steps = if group.len() > 2 {
            group.records().iter().map(|r| ActionStep::from(*r)).collect()
        } else {
            Vec::new()
        };

        Self {
            commodity,
            container: oldest.container_spec.clone(),
            action_count: group.len(),
            first_at: oldest.created_at,
            last_at: newest.created_at,
            from_value: oldest.current_value,
            to_value: newest.new_value,
            replicas_from: oldest.replicas,
            replicas_to: newest.replicas,
            total_impact: change.total_impact,
            steps,
        }
    }

    pub fn time_span(&self) -> Duration {
        self.last_at - self.first_at
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadTrail {
    pub key: WorkloadKey,
    pub commodities: Vec<CommodityTrail>,
}

/// Totals for one commodity across every listed workload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommodityOverview {
    pub commodity: Commodity,
    pub action_count: usize,
    pub first_at: NaiveDateTime,
    pub last_at: NaiveDateTime,
    pub workloads: usize,
    pub min_current: f64,
    pub max_current: f64,
    pub min_new: f64,
    pub max_new: f64,
    /// Sum of the listed workloads' total impacts
    pub total_impact: f64,
}

/// Accumulates a [`CommodityOverview`]
#[derive(Debug, Default)]
struct OverviewBuilder {
    action_count: usize,
    range: Option<(NaiveDateTime, NaiveDateTime)>,
    workloads: BTreeSet<WorkloadKey>,
    current: Option<(f64, f64)>,
    new: Option<(f64, f64)>,
    total_impact: f64,
}

fn widen(range: Option<(f64, f64)>, value: f64) -> Option<(f64, f64)> {
    Some(match range {
        None => (value, value),
        Some((lo, hi)) => (lo.min(value), hi.max(value)),
    })
}

impl OverviewBuilder {
    fn add(&mut self, record: &ActionRecord) {
        self.action_count += 1;
        let ts = record.created_at;
        self.range = Some(match self.range {
            None => (ts, ts),
            Some((lo, hi)) => (lo.min(ts), hi.max(ts)),
        });
        self.workloads.insert(record.workload_key());
        self.current = widen(self.current, record.current_value);
        self.new = widen(self.new, record.new_value);
    }

    fn finish(self, commodity: Commodity) -> Option<CommodityOverview> {
        let (first_at, last_at) = self.range?;
        let (min_current, max_current) = self.current?;
        let (min_new, max_new) = self.new?;
        Some(CommodityOverview {
            commodity,
            action_count: self.action_count,
            first_at,
            last_at,
            workloads: self.workloads.len(),
            min_current,
            max_current,
            min_new,
            max_new,
            total_impact: self.total_impact,
        })
    }
}

/// Actions behind a summary, workload by workload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionsBreakdown {
    pub workloads: Vec<WorkloadTrail>,
    pub overview: Vec<CommodityOverview>,
}

impl ActionsBreakdown {
    pub fn from_groups(groups: &WorkloadGroups<'_>) -> Self {
        let mut builders: PerCommodity<OverviewBuilder> = PerCommodity::default();
        let mut workloads = Vec::with_capacity(groups.len());

        for cohort in groups.cohorts() {
            let replicas = ReplicaTransition::for_cohort(cohort);
            let mut commodities = Vec::new();
            for (commodity, group) in cohort.groups() {
                let builder = &mut builders[commodity];
                for record in group.records() {
                    builder.add(record);
                }
                let trail = CommodityTrail::from_group(commodity, group, replicas);
                builder.total_impact += trail.total_impact;
                commodities.push(trail);
            }
            workloads.push(WorkloadTrail {
                key: cohort.key.clone(),
                commodities,
            });
        }

        let overview = Commodity::ALL
            .into_iter()
            .filter_map(|c| std::mem::take(&mut builders[c]).finish(c))
            .collect();

        Self {
            workloads,
            overview,
        }
    }

    pub fn action_count(&self) -> usize {
        self.overview.iter().map(|o| o.action_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }
}
