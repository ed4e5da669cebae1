//! Loading action records from CSV exports
//!
//! Rows that cannot be parsed are skipped and reported; only a missing or
//! unreadable file, or a header that cannot be mapped, aborts the load.

mod columns;


pub use columns::{Column, ColumnMap, Layout, LEGACY_WIDTH};

use crate::config::parse_timestamp;
use crate::error::{AnalyzerError, MalformedRow, Result, RowError};
use crate::models::{ActionRecord, Commodity, Direction};
use crate::observability::RunLogger;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Records read from one export plus the rows that were skipped
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub records: Vec<ActionRecord>,
    pub skipped: Vec<RowError>,
    pub total_rows: usize,
}

/// Reads action exports into [`ActionRecord`]s
pub struct ActionLoader {
    logger: RunLogger,
}

impl ActionLoader {
    pub fn new(logger: RunLogger) -> Self {
        Self { logger }
    }

    /// Load an export from disk
    pub fn load_path(&self, path: &Path) -> Result<LoadOutcome> {
        let file = File::open(path).map_err(|source| AnalyzerError::InputFile {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_reader(file)
    }

    /// Load an export from any reader
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadOutcome> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers().map_err(structure_error)?.clone();
        let columns = ColumnMap::from_headers(&headers)?;

        let mut outcome = LoadOutcome::default();
        let mut record = StringRecord::new();
        loop {
            let row = rdr.position().line() as usize;
            match rdr.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    outcome.total_rows += 1;
                    match parse_row(&columns, &record, row) {
                        Ok(action) => outcome.records.push(action),
                        Err(err) => self.skip(&mut outcome, err),
                    }
                }
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    outcome.total_rows += 1;
                    let kind = MalformedRow::Unreadable(err.to_string());
                    self.skip(&mut outcome, RowError { row, kind });
                }
            }
        }

        self.logger.log_load_complete(
            outcome.total_rows,
            outcome.records.len(),
            outcome.skipped.len(),
        );
        Ok(outcome)
    }

    fn skip(&self, outcome: &mut LoadOutcome, err: RowError) {
        self.logger.log_row_skipped(&err);
        outcome.skipped.push(err);
    }
}

fn structure_error(err: csv::Error) -> AnalyzerError {
    if err.is_io_error() {
        err.into()
    } else {
        AnalyzerError::MalformedStructure(err.to_string())
    }
}

/// Parse one data row into an action record
pub fn parse_row(
    columns: &ColumnMap,
    record: &StringRecord,
    row: usize,
) -> std::result::Result<ActionRecord, RowError> {
    let cells = Cells {
        columns,
        record,
        row,
    };

    let created_raw = cells.required(Column::CreatedAt)?;
    let created_at = parse_timestamp(created_raw).ok_or_else(|| {
        cells.fail(MalformedRow::BadTimestamp {
            column: Column::CreatedAt.name(),
            value: created_raw.to_string(),
        })
    })?;

    let replicas_raw = cells.required(Column::Replicas)?;
    let replicas = replicas_raw.parse::<u32>().map_err(|_| {
        cells.fail(MalformedRow::BadNumber {
            column: Column::Replicas.name(),
            value: replicas_raw.to_string(),
        })
    })?;

    let commodity = cells
        .required(Column::Commodity)?
        .parse::<Commodity>()
        .map_err(|e| cells.fail(MalformedRow::UnsupportedCommodity(e)))?;

    Ok(ActionRecord {
        row,
        created_at,
        workload: cells.required(Column::Workload)?.to_string(),
        cluster: cells.required(Column::Cluster)?.to_string(),
        namespace: cells.required(Column::Namespace)?.to_string(),
        container_spec: cells.optional(Column::ContainerSpec),
        commodity,
        direction: Direction::parse(&cells.optional(Column::Direction)),
        current_value: cells.number(Column::CurrentValue)?,
        new_value: cells.number(Column::NewValue)?,
        units: cells.optional(Column::Units),
        description: cells.optional(Column::Description),
        replicas,
        executed_at: columns
            .get(record, Column::ExecutedAt)
            .and_then(parse_timestamp),
        execution_status: cells.required(Column::ExecutionStatus)?.to_string(),
    })
}

/// Cell accessors for a single row
struct Cells<'a> {
    columns: &'a ColumnMap,
    record: &'a StringRecord,
    row: usize,
}

impl<'a> Cells<'a> {
    fn fail(&self, kind: MalformedRow) -> RowError {
        RowError { row: self.row, kind }
    }

    fn required(&self, column: Column) -> std::result::Result<&'a str, RowError> {
        self.columns
            .get(self.record, column)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| self.fail(MalformedRow::MissingField(column.name())))
    }

    fn optional(&self, column: Column) -> String {
        self.columns
            .get(self.record, column)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn number(&self, column: Column) -> std::result::Result<f64, RowError> {
        let raw = self.required(column)?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                self.fail(MalformedRow::BadNumber {
                    column: column.name(),
                    value: raw.to_string(),
                })
            })
    }
}
