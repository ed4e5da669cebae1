//! Fixed-width time buckets of per-action deltas
//!
//! Unlike the summary path there is no oldest/newest resolution here: every
//! eligible action adds its own `new - current` to the bucket covering its
//! creation time.

use crate::error::{AnalyzerError, Result};
use crate::models::{ActionRecord, Commodity, PerCommodity};
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Upper bound on buckets in one report
pub const MAX_BUCKETS: usize = 100_000;

/// Half-open interval `[start, end)` with per-commodity delta sums
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucket {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub sums: PerCommodity<f64>,
    pub records: usize,
}

impl TimeBucket {
    fn empty(start: NaiveDateTime, size: Duration) -> Result<Self> {
        let end = start.checked_add_signed(size).ok_or_else(|| {
            AnalyzerError::InvalidFilterArgument(format!(
                "bucket size {} overflows the timeline after {}",
                size, start
            ))
        })?;
        Ok(Self {
            start,
            end,
            sums: PerCommodity::default(),
            records: 0,
        })
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts < self.end
    }
}

/// Result of the time-bucket path
#[derive(Debug, Clone, Serialize)]
pub struct BucketReport {
    pub buckets: Vec<TimeBucket>,
    #[serde(skip)]
    pub bucket_size: Duration,
}

impl BucketReport {
    /// Sum of every bucket for one commodity
    pub fn total(&self, commodity: Commodity) -> f64 {
        self.buckets.iter().map(|b| b.sums[commodity]).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn period(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.buckets.first()?.start, self.buckets.last()?.end))
    }
}

/// Index of the bucket covering `ts`, counted from `origin`
///
/// Nanosecond precision while both spans fit in an `i64`, milliseconds
/// beyond that.
fn bucket_index(origin: NaiveDateTime, ts: NaiveDateTime, size: Duration) -> usize {
    let offset = ts - origin;
    match (offset.num_nanoseconds(), size.num_nanoseconds()) {
        (Some(offset), Some(width)) if width > 0 => (offset / width) as usize,
        _ => (offset.num_milliseconds() / size.num_milliseconds().max(1)) as usize,
    }
}

/// Bucket records from the earliest timestamp until one bucket holds the latest
///
/// Fails on a non-positive `size`, on more than [`MAX_BUCKETS`] buckets, or
/// when a bucket end would fall outside the representable timeline.
pub fn bucketize(records: &[&ActionRecord], size: Duration) -> Result<BucketReport> {
    if size <= Duration::zero() {
        return Err(AnalyzerError::InvalidFilterArgument(format!(
            "bucket size must be positive, got {}",
            size
        )));
    }

    let bounds = records.iter().fold(None, |acc: Option<(NaiveDateTime, NaiveDateTime)>, r| {
        let ts = r.created_at;
        Some(match acc {
            None => (ts, ts),
            Some((lo, hi)) => (lo.min(ts), hi.max(ts)),
        })
    });

    let Some((min, max)) = bounds else {
        return Ok(BucketReport {
            buckets: Vec::new(),
            bucket_size: size,
        });
    };

    let count = bucket_index(min, max, size) + 1;
    if count > MAX_BUCKETS {
        return Err(AnalyzerError::InvalidFilterArgument(format!(
            "bucket size {} splits {} to {} into {} buckets (limit {})",
            size, min, max, count, MAX_BUCKETS
        )));
    }

    let mut buckets: Vec<TimeBucket> = Vec::with_capacity(count);
    let mut start = min;
    for _ in 0..count {
        let bucket = TimeBucket::empty(start, size)?;
        start = bucket.end;
        buckets.push(bucket);
    }

    for record in records {
        let bucket = &mut buckets[bucket_index(min, record.created_at, size)];
        bucket.sums[record.commodity] += record.delta();
        bucket.records += 1;
    }

    Ok(BucketReport {
        buckets,
        bucket_size: size,
    })
}
