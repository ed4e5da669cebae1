//! Workload and commodity cohorts
//!
//! Filtered records are partitioned by workload and then by commodity. Each
//! workload also keeps a replica timeline built from all of its records,
//! whatever the commodity, because replica changes belong to the workload.

use crate::models::{ActionRecord, Commodity, WorkloadKey};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// Records for one (workload, commodity), oldest first
///
/// Never empty: groups are only created from at least one record.
#[derive(Debug, Clone)]
pub struct CommodityGroup<'a> {
    records: Vec<&'a ActionRecord>,
}

impl<'a> CommodityGroup<'a> {
    pub fn oldest(&self) -> &'a ActionRecord {
        self.records[0]
    }

    pub fn newest(&self) -> &'a ActionRecord {
        self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[&'a ActionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Replica count seen on one action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplicaObservation {
    pub at: NaiveDateTime,
    pub replicas: u32,
}

/// All eligible records of one workload
#[derive(Debug, Clone)]
pub struct WorkloadCohort<'a> {
    pub key: WorkloadKey,
    commodities: BTreeMap<Commodity, CommodityGroup<'a>>,
    timeline: Vec<ReplicaObservation>,
}

impl<'a> WorkloadCohort<'a> {
    pub fn group(&self, commodity: Commodity) -> Option<&CommodityGroup<'a>> {
        self.commodities.get(&commodity)
    }

    /// Commodity groups in column order
    pub fn groups(&self) -> impl Iterator<Item = (Commodity, &CommodityGroup<'a>)> {
        self.commodities.iter().map(|(c, g)| (*c, g))
    }

    /// Replica observations across every commodity, oldest first
    pub fn timeline(&self) -> &[ReplicaObservation] {
        &self.timeline
    }

    pub fn earliest(&self) -> ReplicaObservation {
        self.timeline[0]
    }

    pub fn latest(&self) -> ReplicaObservation {
        self.timeline[self.timeline.len() - 1]
    }

    /// Replica count at the workload's most recent action
    pub fn current_replicas(&self) -> u32 {
        self.latest().replicas
    }

    pub fn record_count(&self) -> usize {
        self.timeline.len()
    }
}

/// Two-level map: workload → commodity → group
#[derive(Debug, Clone, Default)]
pub struct WorkloadGroups<'a> {
    cohorts: BTreeMap<WorkloadKey, WorkloadCohort<'a>>,
}

impl<'a> WorkloadGroups<'a> {
    /// Partition records; ordering is by creation time, ties keep input order
    pub fn build(records: &[&'a ActionRecord]) -> Self {
        let mut by_workload: BTreeMap<WorkloadKey, Vec<&'a ActionRecord>> = BTreeMap::new();
        for &record in records {
            by_workload
                .entry(record.workload_key())
                .or_default()
                .push(record);
        }

        let cohorts = by_workload
            .into_iter()
            .map(|(key, mut records)| {
                records.sort_by_key(|r| r.created_at);

                let timeline = records
                    .iter()
                    .map(|r| ReplicaObservation {
                        at: r.created_at,
                        replicas: r.replicas,
                    })
                    .collect();

                let mut commodities: BTreeMap<Commodity, CommodityGroup<'a>> = BTreeMap::new();
                for record in records {
                    commodities
                        .entry(record.commodity)
                        .or_insert_with(|| CommodityGroup { records: Vec::new() })
                        .records
                        .push(record);
                }

                let cohort = WorkloadCohort {
                    key: key.clone(),
                    commodities,
                    timeline,
                };
                (key, cohort)
            })
            .collect();

        Self { cohorts }
    }

    pub fn len(&self) -> usize {
        self.cohorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }

    pub fn get(&self, key: &WorkloadKey) -> Option<&WorkloadCohort<'a>> {
        self.cohorts.get(key)
    }

    /// Cohorts ordered by workload name, namespace, cluster
    pub fn cohorts(&self) -> impl Iterator<Item = &WorkloadCohort<'a>> {
        self.cohorts.values()
    }

    /// Drop whole workloads that fail the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(&WorkloadCohort<'a>) -> bool) {
        self.cohorts.retain(|_, cohort| keep(&*cohort));
    }
}
