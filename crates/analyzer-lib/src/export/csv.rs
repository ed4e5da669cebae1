use super::Exporter;
use crate::buckets::BucketReport;
use crate::error::Result;
use crate::models::Commodity;
use crate::summary::SummaryReport;
use csv::Writer;
use std::io::Write;

/// Timestamp layout used in exported files
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

const SUMMARY_FIELDS: [&str; 6] = ["old", "new", "delta", "pct", "span_days", "total_impact"];

/// Full summary population, one row per workload, raw commodity units
#[derive(Debug, Default)]
pub struct SummaryCsvExporter;

impl SummaryCsvExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn headers() -> Vec<String> {
        let mut headers: Vec<String> = ["cluster", "namespace", "workload", "replicas"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        for commodity in Commodity::ALL {
            for field in SUMMARY_FIELDS {
                headers.push(format!("{}_{}", commodity, field));
            }
        }
        headers
    }
}

impl Exporter for SummaryCsvExporter {
    type Report = SummaryReport;

    fn write<W: Write>(&self, report: &SummaryReport, writer: W) -> Result<()> {
        let mut wtr = Writer::from_writer(writer);
        wtr.write_record(Self::headers())?;

        for row in &report.rows {
            let mut record = vec![
                row.key.cluster.clone(),
                row.key.namespace.clone(),
                row.key.workload.clone(),
                row.replicas.to_string(),
            ];
            for commodity in Commodity::ALL {
                match &row.changes[commodity] {
                    Some(change) => record.extend([
                        change.old_value.to_string(),
                        change.new_value.to_string(),
                        change.delta.to_string(),
                        format!("{:.2}", change.percent_delta),
                        format!("{:.2}", change.span_days()),
                        change.total_impact.to_string(),
                    ]),
                    None => record.extend(std::iter::repeat(String::new()).take(SUMMARY_FIELDS.len())),
                }
            }
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

/// Bucket series with exactly six columns
#[derive(Debug, Default)]
pub struct BucketCsvExporter;

impl BucketCsvExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for BucketCsvExporter {
    type Report = BucketReport;

    fn write<W: Write>(&self, report: &BucketReport, writer: W) -> Result<()> {
        let mut wtr = Writer::from_writer(writer);
        wtr.write_record(["from", "to", "VCPU", "VCPURequest", "VMem", "VMemRequest"])?;

        for bucket in &report.buckets {
            let mut record = vec![
                bucket.start.format(CSV_TIMESTAMP_FORMAT).to_string(),
                bucket.end.format(CSV_TIMESTAMP_FORMAT).to_string(),
            ];
            record.extend(Commodity::ALL.iter().map(|c| bucket.sums[*c].to_string()));
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
