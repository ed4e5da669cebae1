//! Analysis configuration passed explicitly into the engine

use crate::error::{AnalyzerError, Result};
use chrono::{Duration, NaiveDateTime};

/// Default number of rows shown in the ranked table
pub const DEFAULT_TOP_N: usize = 10;

/// Default lookback for conservative mode
pub const DEFAULT_CONSERVATIVE_DAYS: u32 = 14;

/// Default time bucket width
pub const DEFAULT_BUCKET_DAYS: i64 = 7;

/// Narrowest accepted bucket width
pub const MIN_BUCKET_MILLIS: i64 = 1;

/// Widest accepted bucket width, about a century
pub const MAX_BUCKET_DAYS: i64 = 36_500;

/// Timestamp layouts found in action exports, tried in order
const TIMESTAMP_FORMATS: &[&str] = &["%d %b %Y %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse an export timestamp such as `16 Sep 2025 09:40`
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parse a user-supplied `--from`/`--to` bound
pub fn parse_filter_datetime(raw: &str) -> Result<NaiveDateTime> {
    parse_timestamp(raw).ok_or_else(|| {
        AnalyzerError::InvalidFilterArgument(format!(
            "unable to parse date '{}', expected 'DD MMM YYYY HH:MM' (e.g. '01 Sep 2025 00:00')",
            raw.trim()
        ))
    })
}

/// Parse a bucket width: plain days (`7`) or a duration (`7d`, `24h`, `2h 30m`)
pub fn parse_bucket_size(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let invalid = |reason: String| {
        AnalyzerError::InvalidFilterArgument(format!("invalid bucket size '{}': {}", raw, reason))
    };

    let size = match raw.parse::<u32>() {
        Ok(days) => Duration::days(i64::from(days)),
        Err(_) => {
            let std = humantime::parse_duration(raw).map_err(|e| invalid(e.to_string()))?;
            Duration::from_std(std).map_err(|e| invalid(e.to_string()))?
        }
    };

    validate_bucket_size(size).map_err(|_| invalid(bucket_size_bounds()))?;
    Ok(size)
}

fn bucket_size_bounds() -> String {
    format!(
        "bucket size must be between {}ms and {} days",
        MIN_BUCKET_MILLIS, MAX_BUCKET_DAYS
    )
}

/// Reject bucket widths outside `[1ms, MAX_BUCKET_DAYS]`
pub fn validate_bucket_size(size: Duration) -> Result<()> {
    if size < Duration::milliseconds(MIN_BUCKET_MILLIS) || size > Duration::days(MAX_BUCKET_DAYS) {
        return Err(AnalyzerError::InvalidFilterArgument(format!(
            "invalid bucket size {}: {}",
            size,
            bucket_size_bounds()
        )));
    }
    Ok(())
}

/// Inclusive creation-time window; either side may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl TimeWindow {
    pub fn new(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Result<Self> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(AnalyzerError::InvalidFilterArgument(format!(
                    "time window start {} is after end {}",
                    f, t
                )));
            }
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.from.map_or(true, |f| ts >= f) && self.to.map_or(true, |t| ts <= t)
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Record-level filters shared by both aggregation paths
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Cluster names, with or without the `Kubernetes-` prefix
    pub clusters: Vec<String>,
    /// Exact names or `*` wildcard patterns
    pub namespaces: Vec<String>,
    pub window: TimeWindow,
}

/// How many summary rows the ranked table shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayLimit {
    All,
    Top(usize),
}

impl Default for DisplayLimit {
    fn default() -> Self {
        DisplayLimit::Top(DEFAULT_TOP_N)
    }
}

/// How loudly skipped rows are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// Everything the engine needs for one run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub filter: FilterConfig,
    /// Lookback days for conservative mode; `None` disables the gate
    pub conservative_days: Option<u32>,
    pub bucket_size: Duration,
    pub display: DisplayLimit,
    pub verbosity: Verbosity,
}

impl AnalysisConfig {
    /// Check values that did not come through the parsers above
    pub fn validate(&self) -> Result<()> {
        validate_bucket_size(self.bucket_size)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            conservative_days: None,
            bucket_size: Duration::days(DEFAULT_BUCKET_DAYS),
            display: DisplayLimit::default(),
            verbosity: Verbosity::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("16 Sep 2025 09:40"), Some(at(16, 9, 40)));
        assert_eq!(parse_timestamp(" 2025-09-16 09:40:00 "), Some(at(16, 9, 40)));
        assert_eq!(parse_timestamp("2025-09-16 09:40"), Some(at(16, 9, 40)));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_parse_filter_datetime_rejects_garbage() {
        let err = parse_filter_datetime("31/09/2025").unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidFilterArgument(_)));
    }

    #[test]
    fn test_parse_bucket_size() {
        assert_eq!(parse_bucket_size("7").unwrap(), Duration::days(7));
        assert_eq!(parse_bucket_size("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_bucket_size("24h").unwrap(), Duration::hours(24));
        assert_eq!(
            parse_bucket_size("2h 30m").unwrap(),
            Duration::minutes(150)
        );
    }

    #[test]
    fn test_parse_bucket_size_invalid() {
        assert!(parse_bucket_size("0").is_err());
        assert!(parse_bucket_size("0s").is_err());
        assert!(parse_bucket_size("weekly").is_err());
        assert!(parse_bucket_size("").is_err());
    }

    #[test]
    fn test_parse_bucket_size_out_of_range() {
        assert!(parse_bucket_size("100000000").is_err());
        assert!(parse_bucket_size("36501").is_err());
        assert!(parse_bucket_size("500us").is_err());
        assert!(parse_bucket_size("1ns").is_err());
        assert_eq!(parse_bucket_size("36500").unwrap(), Duration::days(36_500));
        assert_eq!(parse_bucket_size("1ms").unwrap(), Duration::milliseconds(1));
    }

    #[test]
    fn test_config_validate_bucket_size() {
        assert!(AnalysisConfig::default().validate().is_ok());
        let config = AnalysisConfig {
            bucket_size: Duration::microseconds(500),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalyzerError::InvalidFilterArgument(_))
        ));
    }

    #[test]
    fn test_time_window_inclusive_bounds() {
        let window = TimeWindow::new(Some(at(1, 0, 0)), Some(at(10, 0, 0))).unwrap();
        assert!(window.contains(at(1, 0, 0)));
        assert!(window.contains(at(10, 0, 0)));
        assert!(!window.contains(at(10, 0, 1)));
        assert!(!window.contains(at(11, 0, 0)));

        let open_start = TimeWindow::new(None, Some(at(5, 0, 0))).unwrap();
        assert!(open_start.contains(at(1, 0, 0)));
        assert!(!open_start.contains(at(6, 0, 0)));

        assert!(TimeWindow::default().is_open());
    }

    #[test]
    fn test_time_window_rejects_inverted_bounds() {
        assert!(TimeWindow::new(Some(at(10, 0, 0)), Some(at(1, 0, 0))).is_err());
    }
}
