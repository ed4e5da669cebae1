//! Core data models for the commodity analyzer

use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// Literal prefix Turbonomic puts in front of Kubernetes cluster names
pub const CLUSTER_PREFIX: &str = "Kubernetes-";

/// Execution status of an action that was applied successfully
pub const SUCCESS_STATUS: &str = "SUCCEEDED";

/// Strip the `Kubernetes-` prefix from a cluster name, if present
pub fn normalize_cluster(cluster: &str) -> &str {
    cluster.strip_prefix(CLUSTER_PREFIX).unwrap_or(cluster)
}

/// Resource dimension being resized
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Commodity {
    #[serde(rename = "VCPU")]
    Vcpu,
    #[serde(rename = "VCPURequest")]
    VcpuRequest,
    #[serde(rename = "VMem")]
    Vmem,
    #[serde(rename = "VMemRequest")]
    VmemRequest,
}

impl Commodity {
    /// All commodities in column order
    pub const ALL: [Commodity; 4] = [
        Commodity::Vcpu,
        Commodity::VcpuRequest,
        Commodity::Vmem,
        Commodity::VmemRequest,
    ];

    /// Name as it appears in the action export
    pub fn as_str(&self) -> &'static str {
        match self {
            Commodity::Vcpu => "VCPU",
            Commodity::VcpuRequest => "VCPURequest",
            Commodity::Vmem => "VMem",
            Commodity::VmemRequest => "VMemRequest",
        }
    }

    /// Memory commodities are exported in KB
    pub fn is_memory(&self) -> bool {
        matches!(self, Commodity::Vmem | Commodity::VmemRequest)
    }

    fn index(&self) -> usize {
        match self {
            Commodity::Vcpu => 0,
            Commodity::VcpuRequest => 1,
            Commodity::Vmem => 2,
            Commodity::VmemRequest => 3,
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commodity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Commodity::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported commodity '{}'", s.trim()))
    }
}

/// One value per commodity, indexable by [`Commodity`]
///
/// Serializes as a map keyed by commodity name.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerCommodity<T> {
    values: [T; 4],
}

impl<T> PerCommodity<T> {
    pub fn from_fn(mut f: impl FnMut(Commodity) -> T) -> Self {
        Self {
            values: Commodity::ALL.map(&mut f),
        }
    }

    /// Iterate `(commodity, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (Commodity, &T)> {
        Commodity::ALL.into_iter().zip(self.values.iter())
    }
}

impl<T: Serialize> Serialize for PerCommodity<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (commodity, value) in self.iter() {
            map.serialize_entry(commodity.as_str(), value)?;
        }
        map.end()
    }
}

impl<T> Index<Commodity> for PerCommodity<T> {
    type Output = T;

    fn index(&self, commodity: Commodity) -> &T {
        &self.values[commodity.index()]
    }
}

impl<T> IndexMut<Commodity> for PerCommodity<T> {
    fn index_mut(&mut self, commodity: Commodity) -> &mut T {
        &mut self.values[commodity.index()]
    }
}

/// Resize direction recorded on the action (informational only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Upsize,
    Downsize,
    Unspecified,
}

impl Direction {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        if lowered.contains("up") {
            Direction::Upsize
        } else if lowered.contains("down") {
            Direction::Downsize
        } else {
            Direction::Unspecified
        }
    }
}

/// A single resize action from the export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// 1-based line number in the source file (header is line 1)
    pub row: usize,
    pub created_at: NaiveDateTime,
    pub workload: String,
    pub cluster: String,
    pub namespace: String,
    pub container_spec: String,
    pub commodity: Commodity,
    pub direction: Direction,
    pub current_value: f64,
    pub new_value: f64,
    pub units: String,
    pub description: String,
    pub replicas: u32,
    pub executed_at: Option<NaiveDateTime>,
    pub execution_status: String,
}

impl ActionRecord {
    /// Cluster name without the `Kubernetes-` prefix
    pub fn cluster_short(&self) -> &str {
        normalize_cluster(&self.cluster)
    }

    /// Change proposed by this single action
    pub fn delta(&self) -> f64 {
        self.new_value - self.current_value
    }

    pub fn succeeded(&self) -> bool {
        self.execution_status.trim().eq_ignore_ascii_case(SUCCESS_STATUS)
    }

    pub fn workload_key(&self) -> WorkloadKey {
        WorkloadKey {
            cluster: self.cluster.clone(),
            namespace: self.namespace.clone(),
            workload: self.workload.clone(),
        }
    }
}

/// Identity of a workload across the export
///
/// Ordered by workload name first so that map iteration matches the
/// tie-break order of the summary table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkloadKey {
    pub workload: String,
    pub namespace: String,
    pub cluster: String,
}

impl WorkloadKey {
    pub fn cluster_short(&self) -> &str {
        normalize_cluster(&self.cluster)
    }
}

impl fmt::Display for WorkloadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.cluster_short(), self.namespace, self.workload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_cluster() {
        assert_eq!(normalize_cluster("Kubernetes-prod"), "prod");
        assert_eq!(normalize_cluster("prod"), "prod");
        assert_eq!(normalize_cluster("Kubernetes-"), "");
        assert_eq!(normalize_cluster("kubernetes-prod"), "kubernetes-prod");
    }

    #[test]
    fn test_commodity_parse() {
        assert_eq!("VCPU".parse::<Commodity>().unwrap(), Commodity::Vcpu);
        assert_eq!(" vmemrequest ".parse::<Commodity>().unwrap(), Commodity::VmemRequest);
        assert!("VStorage".parse::<Commodity>().is_err());
    }

    #[test]
    fn test_per_commodity_indexing() {
        let mut sums: PerCommodity<f64> = PerCommodity::default();
        sums[Commodity::Vmem] += 2.5;
        sums[Commodity::Vmem] += 1.0;
        assert_eq!(sums[Commodity::Vmem], 3.5);
        assert_eq!(sums[Commodity::Vcpu], 0.0);

        let order: Vec<_> = sums.iter().map(|(c, _)| c).collect();
        assert_eq!(order, Commodity::ALL.to_vec());
    }

    #[test]
    fn test_per_commodity_serializes_as_named_map() {
        let mut sums: PerCommodity<f64> = PerCommodity::default();
        sums[Commodity::VcpuRequest] = 300.0;

        let json = serde_json::to_value(sums).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"VCPU": 0.0, "VCPURequest": 300.0, "VMem": 0.0, "VMemRequest": 0.0})
        );
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("Upsize"), Direction::Upsize);
        assert_eq!(Direction::parse("DOWNSIZE"), Direction::Downsize);
        assert_eq!(Direction::parse(""), Direction::Unspecified);
    }

    #[test]
    fn test_workload_key_order_by_name_first() {
        let a = WorkloadKey {
            workload: "api".into(),
            namespace: "zz".into(),
            cluster: "z".into(),
        };
        let b = WorkloadKey {
            workload: "web".into(),
            namespace: "aa".into(),
            cluster: "a".into(),
        };
        assert!(a < b);
    }
}
