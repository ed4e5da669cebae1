//! Machine-readable report output

pub mod csv;

pub use self::csv::{BucketCsvExporter, SummaryCsvExporter, CSV_TIMESTAMP_FORMAT};

use crate::error::{AnalyzerError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one kind of report to any byte sink
pub trait Exporter {
    type Report: ?Sized;

    fn write<W: Write>(&self, report: &Self::Report, writer: W) -> Result<()>;

    /// Render into an in-memory string
    fn export(&self, report: &Self::Report) -> Result<String> {
        let mut buf = Vec::new();
        self.write(report, &mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| AnalyzerError::Export(format!("UTF-8 conversion error: {}", e)))
    }

    /// Write to a file, creating or truncating it
    fn export_to_path(&self, report: &Self::Report, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| {
            AnalyzerError::Export(format!("cannot create {}: {}", path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        self.write(report, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
