//! Per-workload commodity change summary

use analyzer_lib::{
    breakdown::CommodityTrail,
    config::{DEFAULT_CONSERVATIVE_DAYS, DEFAULT_TOP_N},
    ActionsBreakdown, AnalysisConfig, Analyzer, Commodity, DisplayLimit, Exporter, FilterConfig,
    SummaryCsvExporter, SummaryReport, WorkloadSummary,
};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::{filter_lines, load_records, write_report, RunContext};
use crate::output::{
    format_change, format_change_cell, format_span, format_value, print_json, print_success,
    print_warning, OutputFormat,
};
use crate::SummaryArgs;

/// Row for the total-impact-by-commodity table
#[derive(Tabled)]
struct CommodityImpactRow {
    #[tabled(rename = "Commodity")]
    commodity: String,
    #[tabled(rename = "Workloads with Changes")]
    workloads: usize,
    #[tabled(rename = "Total Impact Change")]
    total: String,
}

/// Row for the ranked detail table
#[derive(Tabled)]
struct WorkloadRow {
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Workload")]
    workload: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Replicas")]
    replicas: String,
    #[tabled(rename = "VCPU (mc)")]
    vcpu: String,
    #[tabled(rename = "VCPURequest (mc)")]
    vcpu_request: String,
    #[tabled(rename = "VMem (GiB)")]
    vmem: String,
    #[tabled(rename = "VMemRequest (GiB)")]
    vmem_request: String,
}

impl From<&WorkloadSummary> for WorkloadRow {
    fn from(row: &WorkloadSummary) -> Self {
        let cell = |c: Commodity| {
            row.changes[c]
                .as_ref()
                .map(|change| format_change_cell(c, change.total_impact))
                .unwrap_or_default()
        };
        Self {
            cluster: row.key.cluster_short().to_string(),
            workload: row.key.workload.clone(),
            namespace: row.key.namespace.clone(),
            replicas: row.replicas.to_string(),
            vcpu: cell(Commodity::Vcpu),
            vcpu_request: cell(Commodity::VcpuRequest),
            vmem: cell(Commodity::Vmem),
            vmem_request: cell(Commodity::VmemRequest),
        }
    }
}

/// Row for the per-commodity overview of the actions breakdown
#[derive(Tabled)]
struct ActionOverviewRow {
    #[tabled(rename = "Commodity")]
    commodity: String,
    #[tabled(rename = "Actions")]
    actions: usize,
    #[tabled(rename = "Workloads")]
    workloads: usize,
    #[tabled(rename = "First")]
    first: String,
    #[tabled(rename = "Last")]
    last: String,
    #[tabled(rename = "Current Range")]
    current: String,
    #[tabled(rename = "New Range")]
    new: String,
    #[tabled(rename = "Total Impact")]
    total: String,
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    report: &'a SummaryReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    actions: Option<&'a ActionsBreakdown>,
}

/// Header information that is not part of the engine result
struct ReportContext<'a> {
    source: String,
    filter: &'a FilterConfig,
}

/// Run the summary subcommand
pub fn run(args: &SummaryArgs, ctx: &RunContext) -> Result<()> {
    let defaults = &ctx.defaults;
    let filter = args.filters.to_filter_config()?;

    let show_all = args.show_all || (args.top.is_none() && defaults.show_all.unwrap_or(false));
    let display = if show_all {
        DisplayLimit::All
    } else {
        DisplayLimit::Top(args.top.or(defaults.top).unwrap_or(DEFAULT_TOP_N))
    };
    let conservative_days = args.conservative.then(|| {
        args.conservative_days
            .or(defaults.conservative_days)
            .unwrap_or(DEFAULT_CONSERVATIVE_DAYS)
    });

    let config = AnalysisConfig {
        filter: filter.clone(),
        conservative_days,
        display,
        verbosity: ctx.verbosity,
        ..Default::default()
    };
    let analyzer = Analyzer::new(config)?.with_logger(ctx.logger(&args.csv_file));

    let records = load_records(&args.csv_file, ctx)?;
    let selection = analyzer.select(&records);
    let report = analyzer.report(&selection);
    let breakdown = args.show_actions.then(|| analyzer.breakdown(&selection));

    if let Some(path) = &args.output_csv {
        SummaryCsvExporter::new()
            .export_to_path(&report, path)
            .with_context(|| format!("Failed to export CSV {}", path.display()))?;
    }

    let report_ctx = ReportContext {
        source: args.csv_file.display().to_string(),
        filter: &filter,
    };

    match ctx.format {
        OutputFormat::Json => {
            print_json(&SummaryOutput {
                report: &report,
                actions: breakdown.as_ref(),
            })?;
        }
        OutputFormat::Table => {
            if let Some(breakdown) = &breakdown {
                println!("{}", render_breakdown(breakdown));
            }

            let text = render_report(&report, &report_ctx);
            match &args.output_report {
                Some(path) => {
                    write_report(path, &text)?;
                    print_success(&format!("Report saved to {}", path.display()));
                }
                None => println!("{}", text),
            }

            if report.is_empty() {
                print_warning("No workloads matched the filters");
            }
            if let Some(path) = &args.output_csv {
                print_success(&format!("Results exported to {}", path.display()));
            }
            print_success(&format!(
                "Analysis complete: {} workloads",
                report.stats.total_workloads.to_string().bold()
            ));
        }
    }

    Ok(())
}

/// Render the plain-text summary report
fn render_report(report: &SummaryReport, ctx: &ReportContext<'_>) -> String {
    let stats = &report.stats;
    let mut lines = vec![
        "COMMODITY CHANGE ANALYSIS REPORT".to_string(),
        "=".repeat(60),
        format!("Source: {}", ctx.source),
        format!("Total Workloads Analyzed: {}", stats.total_workloads),
        format!(
            "Analysis Date: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
    ];
    lines.extend(filter_lines(ctx.filter));
    if let Some(gate) = &report.gate {
        lines.push(format!(
            "Conservative Mode: only workloads with actions since {} ({} days before {})",
            gate.cutoff().format("%d %b %Y %H:%M"),
            gate.lookback_days,
            gate.reference.format("%d %b %Y %H:%M"),
        ));
    }
    lines.push(String::new());

    lines.push("SUMMARY STATISTICS (Total Impact Considering Replicas)".to_string());
    lines.push("-".repeat(55));
    lines.push(format!("Total Workloads: {}", stats.total_workloads));
    lines.push(format!("Workloads with Changes: {}", stats.workloads_with_changes));
    lines.push(String::new());

    lines.push("COMMODITY-SPECIFIC STATISTICS".to_string());
    lines.push("-".repeat(35));
    for (commodity, s) in stats.commodities.iter() {
        if s.changed > 0 {
            lines.push(format!(
                "{}: {} changes ({} increases, {} decreases)",
                commodity, s.changed, s.increases, s.decreases
            ));
        }
    }
    lines.push(String::new());

    lines.push("TOTAL IMPACT CHANGES BY COMMODITY TYPE".to_string());
    let impact_rows: Vec<CommodityImpactRow> = stats
        .commodities
        .iter()
        .map(|(commodity, s)| CommodityImpactRow {
            commodity: commodity.to_string(),
            workloads: s.changed,
            total: format_change(commodity, s.total_impact),
        })
        .collect();
    lines.push(Table::new(impact_rows).with(Style::rounded()).to_string());
    lines.push(String::new());

    lines.push(match report.display {
        DisplayLimit::All => {
            "DETAILED RESULTS TABLE (All results sorted by VCPURequest impact)".to_string()
        }
        DisplayLimit::Top(n) => format!("DETAILED RESULTS TABLE (Top {} by VCPURequest impact)", n),
    });
    let rows: Vec<WorkloadRow> = report.displayed().iter().map(WorkloadRow::from).collect();
    if rows.is_empty() {
        lines.push("No workloads to display".to_string());
    } else {
        lines.push(Table::new(rows).with(Style::rounded()).to_string());
    }

    lines.join("\n")
}

fn render_trail(trail: &CommodityTrail, lines: &mut Vec<String>) {
    let c = trail.commodity;
    lines.push(format!(
        "    {}: {} actions over {}",
        c.to_string().cyan(),
        trail.action_count,
        format_span(trail.time_span())
    ));
    lines.push(format!(
        "      Value: {} -> {} ({})",
        format_value(c, trail.from_value),
        format_value(c, trail.to_value),
        format_change(c, trail.to_value - trail.from_value)
    ));
    if !trail.container.is_empty() {
        lines.push(format!("      Container: {}", trail.container));
    }
    lines.push(format!(
        "      Replicas: {} -> {}",
        trail.replicas_from, trail.replicas_to
    ));
    lines.push(format!(
        "      Total Impact Change: {}",
        format_change(c, trail.total_impact)
    ));
    for (i, step) in trail.steps.iter().enumerate() {
        lines.push(format!(
            "      {}. {}  {} -> {}  (Replicas: {})",
            i + 1,
            step.at.format("%d %b %Y %H:%M"),
            format_value(c, step.current_value),
            format_value(c, step.new_value),
            step.replicas
        ));
    }
}

/// Render the per-workload actions breakdown for the console
fn render_breakdown(breakdown: &ActionsBreakdown) -> String {
    let mut lines = vec![
        "ACTIONS USED FOR RESOURCE CHANGE CALCULATION".bold().to_string(),
        "=".repeat(60),
    ];
    if breakdown.is_empty() {
        lines.push("No actions available to display.".to_string());
        return lines.join("\n");
    }

    for workload in &breakdown.workloads {
        lines.push(String::new());
        lines.push(format!("  {}", workload.key.to_string().bold()));
        for trail in &workload.commodities {
            render_trail(trail, &mut lines);
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{} ({} actions)",
        "Actions by Commodity".bold(),
        breakdown.action_count()
    ));
    let rows: Vec<ActionOverviewRow> = breakdown
        .overview
        .iter()
        .map(|o| ActionOverviewRow {
            commodity: o.commodity.to_string(),
            actions: o.action_count,
            workloads: o.workloads,
            first: o.first_at.format("%Y-%m-%d %H:%M").to_string(),
            last: o.last_at.format("%Y-%m-%d %H:%M").to_string(),
            current: format!(
                "{} .. {}",
                format_value(o.commodity, o.min_current),
                format_value(o.commodity, o.max_current)
            ),
            new: format!(
                "{} .. {}",
                format_value(o.commodity, o.min_new),
                format_value(o.commodity, o.max_new)
            ),
            total: format_change(o.commodity, o.total_impact),
        })
        .collect();
    lines.push(Table::new(rows).with(Style::rounded()).to_string());
    lines.join("\n")
}
