//! Header resolution for action exports

use crate::error::{AnalyzerError, Result};
use csv::StringRecord;

/// Minimum header width of the legacy positional export
pub const LEGACY_WIDTH: usize = 21;

/// Logical columns consumed from an action export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    CreatedAt,
    Workload,
    Cluster,
    Replicas,
    Namespace,
    ContainerSpec,
    Commodity,
    Direction,
    CurrentValue,
    NewValue,
    Units,
    Description,
    ExecutedAt,
    ExecutionStatus,
}

impl Column {
    pub const ALL: [Column; 14] = [
        Column::CreatedAt,
        Column::Workload,
        Column::Cluster,
        Column::Replicas,
        Column::Namespace,
        Column::ContainerSpec,
        Column::Commodity,
        Column::Direction,
        Column::CurrentValue,
        Column::NewValue,
        Column::Units,
        Column::Description,
        Column::ExecutedAt,
        Column::ExecutionStatus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::CreatedAt => "date_created",
            Column::Workload => "name",
            Column::Cluster => "cluster",
            Column::Replicas => "replicas",
            Column::Namespace => "namespace",
            Column::ContainerSpec => "container_spec",
            Column::Commodity => "commodity",
            Column::Direction => "resize_direction",
            Column::CurrentValue => "current_value",
            Column::NewValue => "new_value",
            Column::Units => "units",
            Column::Description => "action_description",
            Column::ExecutedAt => "execution_datetime",
            Column::ExecutionStatus => "execution_status",
        }
    }

    /// Whether the header must carry this column
    pub fn is_required(&self) -> bool {
        !matches!(self, Column::ContainerSpec)
    }

    /// Accepted header spellings, already normalized
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::CreatedAt => &["datecreated", "createdat", "creationtime", "creationdate", "created"],
            Column::Workload => &["name", "workload", "workloadname", "entityname"],
            Column::Cluster => &["cluster", "clustername"],
            Column::Replicas => &["replicas", "replicacount"],
            Column::Namespace => &["namespace"],
            Column::ContainerSpec => &["containerspec", "container"],
            Column::Commodity => &["commodity", "commoditytype"],
            Column::Direction => &["resizedirection", "direction"],
            Column::CurrentValue => &["currentvalue", "current"],
            Column::NewValue => &["newvalue", "new"],
            Column::Units => &["units", "unit"],
            Column::Description => &["actiondescription", "description", "details"],
            Column::ExecutedAt => &["executiondatetime", "executiontime", "executiondate", "executedat"],
            Column::ExecutionStatus => &["executionstatus", "status"],
        }
    }

    fn legacy_position(&self) -> usize {
        match self {
            Column::CreatedAt => 0,
            Column::Workload => 1,
            Column::Cluster => 2,
            Column::Replicas => 3,
            Column::Namespace => 4,
            Column::ContainerSpec => 5,
            Column::Commodity => 6,
            Column::Direction => 7,
            Column::CurrentValue => 8,
            Column::NewValue => 9,
            Column::Units => 11,
            Column::Description => 12,
            Column::ExecutedAt => 17,
            Column::ExecutionStatus => 18,
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// How column positions were determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Named,
    Legacy,
}

/// Position of every logical column within a data row
#[derive(Debug, Clone)]
pub struct ColumnMap {
    positions: [Option<usize>; 14],
    layout: Layout,
}

impl ColumnMap {
    /// Resolve columns from the header row
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(AnalyzerError::MalformedStructure(
                "missing header row".to_string(),
            ));
        }

        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let mut positions = [None; 14];
        for column in Column::ALL {
            positions[column.slot()] = column
                .aliases()
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias));
        }

        let missing: Vec<&'static str> = Column::ALL
            .iter()
            .filter(|c| c.is_required() && positions[c.slot()].is_none())
            .map(|c| c.name())
            .collect();

        if missing.is_empty() {
            return Ok(Self {
                positions,
                layout: Layout::Named,
            });
        }

        if headers.len() >= LEGACY_WIDTH {
            tracing::debug!(
                missing = ?missing,
                "Header names not recognized, using legacy positional layout"
            );
            let mut positions = [None; 14];
            for column in Column::ALL {
                positions[column.slot()] = Some(column.legacy_position());
            }
            return Ok(Self {
                positions,
                layout: Layout::Legacy,
            });
        }

        Err(AnalyzerError::MalformedStructure(format!(
            "header is missing required columns: {}",
            missing.join(", ")
        )))
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Raw cell for a column, `None` when the row is too short or the column is absent
    pub fn get<'r>(&self, record: &'r StringRecord, column: Column) -> Option<&'r str> {
        self.positions[column.slot()].and_then(|idx| record.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_headers_resolve_with_aliases() {
        let headers = StringRecord::from(vec![
            "Date Created",
            "Name",
            "Cluster",
            "Replicas",
            "Namespace",
            "Commodity",
            "Resize Direction",
            "Current Value",
            "New Value",
            "Units",
            "Action Description",
            "Execution Date/Time",
            "Execution Status",
        ]);
        let map = ColumnMap::from_headers(&headers).unwrap();
        assert_eq!(map.layout(), Layout::Named);

        let row = StringRecord::from(vec![
            "16 Sep 2025 09:40",
            "api",
            "Kubernetes-prod",
            "2",
            "shop",
            "VCPU",
            "Upsize",
            "500",
            "600",
            "mCores",
            "Resize up",
            "16 Sep 2025 09:45",
            "SUCCEEDED",
        ]);
        assert_eq!(map.get(&row, Column::Workload), Some("api"));
        assert_eq!(map.get(&row, Column::ExecutionStatus), Some("SUCCEEDED"));
        assert_eq!(map.get(&row, Column::ContainerSpec), None);
    }

    #[test]
    fn test_unrecognized_wide_header_falls_back_to_legacy() {
        let headers = StringRecord::from((0..21).map(|i| format!("c{}", i)).collect::<Vec<_>>());
        let map = ColumnMap::from_headers(&headers).unwrap();
        assert_eq!(map.layout(), Layout::Legacy);

        let row = StringRecord::from((0..21).map(|i| i.to_string()).collect::<Vec<_>>());
        assert_eq!(map.get(&row, Column::ExecutionStatus), Some("18"));
        assert_eq!(map.get(&row, Column::Units), Some("11"));
    }

    #[test]
    fn test_narrow_header_missing_columns_is_fatal() {
        let headers = StringRecord::from(vec!["name", "cluster"]);
        let err = ColumnMap::from_headers(&headers).unwrap_err();
        assert!(err.to_string().contains("date_created"));
    }

    #[test]
    fn test_empty_header_is_fatal() {
        let err = ColumnMap::from_headers(&StringRecord::new()).unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedStructure(_)));
    }
}
