//! Time-bucketed traffic volume
//!
//! Works in two phases. While the capture is scanned, timestamps are only
//! buffered. `finalize()` then sorts them, buckets them into fixed intervals
//! measured from the earliest timestamp and freezes the result. An anomaly
//! threshold of `mean + sigma * stddev` over the bucket counts is available
//! once finalized.

use super::{Collector, CollectorError};
use pcaplens_shared::utils::{stats, time};
use pcaplens_shared::{DecodedPacket, HistogramBucket, Timestamp};
use thiserror::Error;
use tracing::{debug, info};

/// Default bucket width in seconds
pub const DEFAULT_INTERVAL_SECS: f64 = 20.0;

/// Default number of standard deviations above the mean for the threshold
pub const DEFAULT_THRESHOLD_SIGMA: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistogramError {
    #[error("histogram already finalized")]
    AlreadyFinalized,
}

#[derive(Debug)]
enum State {
    Accumulating(Vec<Timestamp>),
    Finalized(Vec<HistogramBucket>),
}

/// Packet counts per fixed time interval
#[derive(Debug)]
pub struct TimeHistogram {
    interval_secs: f64,
    sigma: f64,
    state: State,
    ingested: u64,
}

impl Default for TimeHistogram {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_SECS, DEFAULT_THRESHOLD_SIGMA)
    }
}

impl TimeHistogram {
    /// `interval_secs` must be positive; the config layer validates it
    pub fn new(interval_secs: f64, sigma: f64) -> Self {
        Self {
            interval_secs,
            sigma,
            state: State::Accumulating(Vec::new()),
            ingested: 0,
        }
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }

    /// Timestamps accepted so far
    pub fn ingested(&self) -> u64 {
        self.ingested
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, State::Finalized(_))
    }

    /// Buffer one timestamp in arrival order
    pub fn add_timestamp(&mut self, ts: Timestamp) -> Result<(), HistogramError> {
        match &mut self.state {
            State::Accumulating(timestamps) => {
                timestamps.push(ts);
                self.ingested += 1;
                Ok(())
            }
            State::Finalized(_) => Err(HistogramError::AlreadyFinalized),
        }
    }

    /// Sort and bucket the buffered timestamps. Allowed exactly once.
    pub fn finalize(&mut self) -> Result<&[HistogramBucket], HistogramError> {
        let timestamps = match &mut self.state {
            State::Accumulating(timestamps) => std::mem::take(timestamps),
            State::Finalized(_) => return Err(HistogramError::AlreadyFinalized),
        };

        let buckets = bucketize(timestamps, self.interval_secs);
        info!(
            "Histogram finalized: {} timestamps in {} buckets of {}s",
            self.ingested,
            buckets.len(),
            self.interval_secs
        );
        self.state = State::Finalized(buckets);
        Ok(self.buckets().unwrap_or_default())
    }

    /// Bucket series, or `None` before `finalize()`
    pub fn buckets(&self) -> Option<&[HistogramBucket]> {
        match &self.state {
            State::Finalized(buckets) => Some(buckets),
            State::Accumulating(_) => None,
        }
    }

    /// `mean + sigma * population stddev` of the bucket counts.
    ///
    /// `None` before `finalize()` or when fewer than two buckets exist.
    pub fn threshold(&self) -> Option<f64> {
        let counts: Vec<f64> = self.buckets()?.iter().map(|b| b.count as f64).collect();
        let mean = stats::mean(&counts).ok()?;
        match stats::population_stddev(&counts) {
            Ok(stddev) => Some(mean + self.sigma * stddev),
            Err(e) => {
                debug!("No histogram threshold: {}", e);
                None
            }
        }
    }
}

/// Bucket timestamps into `interval`-wide bins starting at the earliest one.
///
/// Only intervals that received at least one timestamp produce a bucket.
fn bucketize(mut timestamps: Vec<Timestamp>, interval: f64) -> Vec<HistogramBucket> {
    timestamps.sort_by(f64::total_cmp);

    let Some(&earliest) = timestamps.first() else {
        return Vec::new();
    };

    let mut buckets: Vec<HistogramBucket> = Vec::new();
    let mut index: u64 = 0;
    let mut upper = interval;

    for ts in timestamps {
        let offset = ts - earliest;
        if offset >= upper {
            index = (offset / interval).floor() as u64;
            upper = (index + 1) as f64 * interval;
        }

        match buckets.last_mut() {
            Some(bucket) if bucket.index == index => bucket.count += 1,
            _ => buckets.push(HistogramBucket {
                index,
                label: time::format_clock(earliest + index as f64 * interval),
                count: 1,
            }),
        }
    }

    buckets
}

impl Collector for TimeHistogram {
    fn name(&self) -> &'static str {
        "time_histogram"
    }

    fn update(
        &mut self,
        _packet: &DecodedPacket<'_>,
        _raw_len: usize,
        ts: Timestamp,
    ) -> Result<(), CollectorError> {
        self.add_timestamp(ts).map_err(|_| CollectorError::Finalized)
    }
}
