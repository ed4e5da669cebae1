//! Commodity change analysis for Kubernetes resize actions
//!
//! This crate provides the core functionality for:
//! - Loading action exports with per-row error recovery
//! - Record filters and the conservative workload gate
//! - Oldest-vs-newest change resolution per workload and commodity
//! - Ranked summaries with aggregate statistics
//! - Fixed-width time buckets of per-action deltas
//! - CSV export of both reports

pub mod analysis;
pub mod breakdown;
pub mod buckets;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod grouping;
pub mod ingest;
pub mod models;
pub mod observability;
pub mod resolver;
pub mod summary;

pub use analysis::{Analyzer, WorkloadSelection};
pub use breakdown::ActionsBreakdown;
pub use buckets::{BucketReport, TimeBucket};
pub use config::{AnalysisConfig, DisplayLimit, FilterConfig, TimeWindow, Verbosity};
pub use error::{AnalyzerError, MalformedRow, Result, RowError};
pub use export::{BucketCsvExporter, Exporter, SummaryCsvExporter};
pub use filter::{ConservativeGate, RecordFilter};
pub use ingest::{ActionLoader, LoadOutcome};
pub use models::*;
pub use observability::RunLogger;
pub use summary::{SummaryReport, SummaryStats, WorkloadSummary};
