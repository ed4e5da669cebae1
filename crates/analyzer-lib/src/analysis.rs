//! Analysis pipeline
//!
//! Ties the stages together for both output paths:
//!
//! ```text
//! records ─► RecordFilter ─► WorkloadGroups ─► ConservativeGate ─► WorkloadSelection
//!                  │                                                    ├─► SummaryReport
//!                  │                                                    └─► ActionsBreakdown
//!                  └────────► bucketize ─► BucketReport
//! ```

use crate::breakdown::ActionsBreakdown;
use crate::buckets::{bucketize, BucketReport};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::filter::{ConservativeGate, RecordFilter};
use crate::grouping::WorkloadGroups;
use crate::models::ActionRecord;
use crate::observability::RunLogger;
use crate::summary::{build_report, SummaryReport};

/// Workloads chosen for the summary path, plus the gate that narrowed them
#[derive(Debug, Clone)]
pub struct WorkloadSelection<'a> {
    pub groups: WorkloadGroups<'a>,
    pub gate: Option<ConservativeGate>,
}

/// Runs the aggregation paths over loaded records
pub struct Analyzer {
    config: AnalysisConfig,
    filter: RecordFilter,
    logger: RunLogger,
}

impl Analyzer {
    /// Validate the configuration and compile its filters
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let filter = RecordFilter::new(&config.filter)?;
        let logger = RunLogger::new("<memory>", config.verbosity);
        Ok(Self {
            config,
            filter,
            logger,
        })
    }

    pub fn with_logger(mut self, logger: RunLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Records passing status and user filters, in input order
    pub fn eligible<'a>(&self, records: &'a [ActionRecord]) -> Vec<&'a ActionRecord> {
        let kept = self.filter.apply(records);
        self.logger
            .log_filters_applied(&self.config.filter, records.len(), kept.len());
        kept
    }

    /// Conservative gate for this dataset, if conservative mode is on
    ///
    /// The reference time comes from the whole dataset, not from the
    /// filtered subset.
    pub fn gate(&self, records: &[ActionRecord]) -> Option<ConservativeGate> {
        self.config
            .conservative_days
            .and_then(|days| ConservativeGate::from_dataset(records, days))
    }

    /// Group eligible records and apply the conservative gate once
    pub fn select<'a>(&self, records: &'a [ActionRecord]) -> WorkloadSelection<'a> {
        let eligible = self.eligible(records);
        let mut groups = WorkloadGroups::build(&eligible);

        let gate = self.gate(records);
        if let Some(gate) = gate {
            let before = groups.len();
            gate.apply(&mut groups);
            self.logger
                .log_conservative_gate(gate.reference, gate.cutoff(), before, groups.len());
        }

        WorkloadSelection { groups, gate }
    }

    /// Per-workload summary in canonical order
    pub fn summarize(&self, records: &[ActionRecord]) -> SummaryReport {
        self.report(&self.select(records))
    }

    /// Summary of an existing selection
    pub fn report(&self, selection: &WorkloadSelection<'_>) -> SummaryReport {
        let report = SummaryReport {
            gate: selection.gate,
            ..build_report(&selection.groups, self.config.display)
        };
        self.logger
            .log_summary_built(report.stats.total_workloads, report.stats.workloads_with_changes);
        report
    }

    /// Actions behind [`Analyzer::report`] for the same selection
    pub fn breakdown(&self, selection: &WorkloadSelection<'_>) -> ActionsBreakdown {
        ActionsBreakdown::from_groups(&selection.groups)
    }

    /// Fixed-width buckets of per-action deltas
    pub fn time_buckets(&self, records: &[ActionRecord]) -> Result<BucketReport> {
        let eligible = self.eligible(records);
        let report = bucketize(&eligible, self.config.bucket_size)?;
        self.logger
            .log_buckets_built(report.buckets.len(), self.config.bucket_size, eligible.len());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisplayLimit, FilterConfig};
    use crate::error::AnalyzerError;
    use crate::models::{Commodity, Direction};
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn action(workload: &str, cluster: &str, d: u32, status: &str) -> ActionRecord {
        ActionRecord {
            row: 2,
            created_at: day(d),
            workload: workload.into(),
            cluster: cluster.into(),
            namespace: "shop".into(),
            container_spec: String::new(),
            commodity: Commodity::VcpuRequest,
            direction: Direction::Upsize,
            current_value: 100.0,
            new_value: 150.0,
            units: "mCores".into(),
            description: String::new(),
            replicas: 2,
            executed_at: None,
            execution_status: status.into(),
        }
    }

    #[test]
    fn test_invalid_bucket_size_fails_construction() {
        let config = AnalysisConfig {
            bucket_size: chrono::Duration::nanoseconds(1),
            ..Default::default()
        };
        assert!(matches!(
            Analyzer::new(config),
            Err(AnalyzerError::InvalidFilterArgument(_))
        ));
    }

    #[test]
    fn test_failed_actions_never_aggregate() {
        let records = vec![
            action("api", "prod", 1, "SUCCEEDED"),
            action("web", "prod", 1, "FAILED"),
        ];
        let analyzer = Analyzer::new(AnalysisConfig::default()).unwrap();

        let summary = analyzer.summarize(&records);
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].key.workload, "api");

        let buckets = analyzer.time_buckets(&records).unwrap();
        assert_eq!(buckets.total(Commodity::VcpuRequest), 50.0);
    }

    #[test]
    fn test_conservative_reference_ignores_user_filters() {
        // The newest action is on staging; filtering to prod must not move
        // the reference time back to day 10.
        let records = vec![
            action("old-prod", "Kubernetes-prod", 1, "SUCCEEDED"),
            action("recent-prod", "Kubernetes-prod", 10, "SUCCEEDED"),
            action("stage", "Kubernetes-staging", 30, "SUCCEEDED"),
        ];
        let config = AnalysisConfig {
            filter: FilterConfig {
                clusters: vec!["prod".into()],
                ..Default::default()
            },
            conservative_days: Some(21),
            display: DisplayLimit::All,
            ..Default::default()
        };
        let summary = Analyzer::new(config).unwrap().summarize(&records);
        let names: Vec<_> = summary.rows.iter().map(|r| r.key.workload.as_str()).collect();
        assert_eq!(names, vec!["recent-prod"]);
    }

    #[test]
    fn test_breakdown_matches_summary_population() {
        let records = vec![
            action("api", "prod", 1, "SUCCEEDED"),
            action("api", "prod", 2, "SUCCEEDED"),
            action("web", "prod", 20, "SUCCEEDED"),
        ];
        let config = AnalysisConfig {
            conservative_days: Some(7),
            ..Default::default()
        };
        let analyzer = Analyzer::new(config).unwrap();

        let selection = analyzer.select(&records);
        let breakdown = analyzer.breakdown(&selection);
        let report = analyzer.report(&selection);
        assert_eq!(breakdown.workloads.len(), 1);
        assert_eq!(breakdown.workloads[0].key.workload, "web");
        assert_eq!(report.rows.len(), 1);
    }

    #[test]
    fn test_report_carries_applied_gate() {
        let records = vec![
            action("api", "prod", 1, "SUCCEEDED"),
            action("web", "prod", 20, "SUCCEEDED"),
            action("late", "prod", 25, "FAILED"),
        ];
        let config = AnalysisConfig {
            conservative_days: Some(7),
            ..Default::default()
        };
        let analyzer = Analyzer::new(config).unwrap();

        let report = analyzer.summarize(&records);
        let gate = report.gate.unwrap();
        assert_eq!(gate.reference, day(20));
        assert_eq!(gate.lookback_days, 7);
        assert_eq!(Some(gate), analyzer.gate(&records));

        let ungated = Analyzer::new(AnalysisConfig::default()).unwrap();
        assert_eq!(ungated.summarize(&records).gate, None);
    }
}
