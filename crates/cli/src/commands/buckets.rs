//! Time-bucketed trend series

use analyzer_lib::{
    config::{parse_bucket_size, DEFAULT_BUCKET_DAYS},
    AnalysisConfig, Analyzer, BucketCsvExporter, BucketReport, Commodity, Exporter, FilterConfig,
    TimeBucket,
};
use anyhow::{Context, Result};
use chrono::Duration;
use tabled::{settings::Style, Table, Tabled};

use super::{filter_lines, load_records, write_report, RunContext};
use crate::output::{format_change, format_change_cell, print_json, print_success, print_warning, OutputFormat};
use crate::BucketsArgs;

/// Row for the bucket-by-bucket table
#[derive(Tabled)]
struct BucketRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Actions")]
    actions: usize,
    #[tabled(rename = "VCPU (mc)")]
    vcpu: String,
    #[tabled(rename = "VCPURequest (mc)")]
    vcpu_request: String,
    #[tabled(rename = "VMem (GiB)")]
    vmem: String,
    #[tabled(rename = "VMemRequest (GiB)")]
    vmem_request: String,
}

impl BucketRow {
    fn new(index: usize, bucket: &TimeBucket) -> Self {
        let cell = |c: Commodity| format_change_cell(c, bucket.sums[c]);
        Self {
            index,
            from: bucket.start.format("%Y-%m-%d %H:%M").to_string(),
            to: bucket.end.format("%Y-%m-%d %H:%M").to_string(),
            actions: bucket.records,
            vcpu: cell(Commodity::Vcpu),
            vcpu_request: cell(Commodity::VcpuRequest),
            vmem: cell(Commodity::Vmem),
            vmem_request: cell(Commodity::VmemRequest),
        }
    }
}

/// Run the buckets subcommand
pub fn run(args: &BucketsArgs, ctx: &RunContext) -> Result<()> {
    let filter = args.filters.to_filter_config()?;
    let bucket_size = match args.bucket_size.as_deref().or(ctx.defaults.bucket_size.as_deref()) {
        Some(raw) => parse_bucket_size(raw)?,
        None => Duration::days(DEFAULT_BUCKET_DAYS),
    };

    let config = AnalysisConfig {
        filter: filter.clone(),
        bucket_size,
        verbosity: ctx.verbosity,
        ..Default::default()
    };
    let analyzer = Analyzer::new(config)?.with_logger(ctx.logger(&args.csv_file));

    let records = load_records(&args.csv_file, ctx)?;
    let report = analyzer.time_buckets(&records)?;

    BucketCsvExporter::new()
        .export_to_path(&report, &args.output)
        .with_context(|| format!("Failed to export CSV {}", args.output.display()))?;

    if let Some(path) = &args.report {
        write_report(path, &render_report(&report, &filter))?;
    }

    match ctx.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            if report.is_empty() {
                print_warning("No eligible actions; bucket file contains only the header");
            }
            print_success(&format!(
                "Time bucket analysis exported to {} ({} buckets)",
                args.output.display(),
                report.buckets.len()
            ));
            if let Some(path) = &args.report {
                print_success(&format!("Summary report saved to {}", path.display()));
            }
        }
    }

    Ok(())
}

/// Human-readable bucket width, e.g. `7days` or `2h 30m`
fn describe_size(size: Duration) -> String {
    size.to_std()
        .map(|d| humantime::format_duration(d).to_string())
        .unwrap_or_else(|_| format!("{}s", size.num_seconds()))
}

/// Render the plain-text bucket summary
fn render_report(report: &BucketReport, filter: &FilterConfig) -> String {
    let Some((start, end)) = report.period() else {
        return "No results to report.".to_string();
    };

    let mut lines = vec![
        "TIME BUCKET ANALYSIS SUMMARY".to_string(),
        "=".repeat(50),
        format!(
            "Analysis Period: {} to {}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ),
        format!("Bucket Size: {}", describe_size(report.bucket_size)),
        format!("Total Buckets: {}", report.buckets.len()),
    ];
    lines.extend(filter_lines(filter));
    lines.push(String::new());

    lines.push("BUCKET-BY-BUCKET TRENDS".to_string());
    let rows: Vec<BucketRow> = report
        .buckets
        .iter()
        .enumerate()
        .map(|(i, b)| BucketRow::new(i + 1, b))
        .collect();
    lines.push(Table::new(rows).with(Style::rounded()).to_string());
    lines.push(String::new());

    lines.push("TOTAL IMPACT ACROSS ALL BUCKETS".to_string());
    lines.push("-".repeat(35));
    for commodity in Commodity::ALL {
        lines.push(format!(
            "{:>12}: {}",
            commodity.as_str(),
            format_change(commodity, report.total(commodity))
        ));
    }

    lines.join("\n")
}
