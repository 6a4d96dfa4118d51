//! Immutable, validated time base.
//!
//! A [`TimeSeries`] is the ordered sequence of timestamps (in seconds) that a
//! signal's samples are recorded at. Construction through [`TimeSeries::new`]
//! is the only way to build one from raw values and rejects empty, decreasing,
//! or non-finite input. Every other constructor derives a subsequence of an
//! already valid series, which keeps the ordering guarantee.

use std::ops::Range;
use std::sync::Arc;

use crate::{Error, Result};

/// Endpoint inclusion for time range selection.
///
/// The default is [`Closed::Both`], i.e. `t_min <= t <= t_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Closed {
    /// `t_min <= t <= t_max`
    #[default]
    Both,
    /// `t_min <= t < t_max`
    Left,
    /// `t_min < t <= t_max`
    Right,
    /// `t_min < t < t_max`
    Neither,
}

impl Closed {
    fn includes_lower(self) -> bool {
        matches!(self, Closed::Both | Closed::Left)
    }

    fn includes_upper(self) -> bool {
        matches!(self, Closed::Both | Closed::Right)
    }
}

/// Monotonic (non-decreasing) sequence of finite timestamps.
///
/// The storage is shared, so cloning a `TimeSeries` is cheap.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    time: Arc<[f64]>,
}

impl TimeSeries {
    /// Validate `time` and build a new time base.
    ///
    /// # Errors
    /// [`Error::TimeSeriesConsistency`] if `time` is empty, contains NaN or
    /// infinite values, or is not non-decreasing.
    pub fn new(time: impl Into<Vec<f64>>) -> Result<Self> {
        let time: Vec<f64> = time.into();
        if time.is_empty() {
            return Err(Error::TimeSeriesConsistency(
                "time base must contain at least one sample".into(),
            ));
        }
        if let Some(i) = time.iter().position(|t| !t.is_finite()) {
            return Err(Error::TimeSeriesConsistency(format!(
                "timestamp at index {i} is not finite ({})",
                time[i]
            )));
        }
        if let Some(i) = time.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::TimeSeriesConsistency(format!(
                "timestamps decrease at index {}: {} after {}",
                i + 1,
                time[i + 1],
                time[i]
            )));
        }
        Ok(TimeSeries { time: time.into() })
    }

    /// Wrap a subsequence of an already validated series.
    fn derived(time: Vec<f64>) -> Self {
        debug_assert!(time.windows(2).all(|w| w[0] <= w[1]));
        TimeSeries { time: time.into() }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True for a series derived by slicing or masking that kept no sample.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Timestamps as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.time
    }

    /// Iterate over the timestamps.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.time.iter().copied()
    }

    /// First timestamp, `None` when empty.
    pub fn t_start(&self) -> Option<f64> {
        self.time.first().copied()
    }

    /// Last timestamp, `None` when empty.
    pub fn t_end(&self) -> Option<f64> {
        self.time.last().copied()
    }

    /// Time covered between the first and the last sample.
    pub fn duration(&self) -> f64 {
        match (self.t_start(), self.t_end()) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }

    /// Index range of the samples lying within `[t_min, t_max]` according to
    /// `closed`.
    ///
    /// Both boundaries are located with a binary search. An inverted or NaN
    /// range yields an empty range.
    pub fn slice_range(&self, t_min: f64, t_max: f64, closed: Closed) -> Range<usize> {
        if t_min.is_nan() || t_max.is_nan() || t_min > t_max {
            return 0..0;
        }
        let start = if closed.includes_lower() {
            self.time.partition_point(|&t| t < t_min)
        } else {
            self.time.partition_point(|&t| t <= t_min)
        };
        let end = if closed.includes_upper() {
            self.time.partition_point(|&t| t <= t_max)
        } else {
            self.time.partition_point(|&t| t < t_max)
        };
        start..end.max(start)
    }

    /// Samples with `t_min <= t <= t_max`, in recorded order.
    ///
    /// An empty result is a valid, zero-length series.
    pub fn time_slice(&self, t_min: f64, t_max: f64) -> TimeSeries {
        self.time_slice_closed(t_min, t_max, Closed::Both)
    }

    /// Like [`TimeSeries::time_slice`] with explicit endpoint inclusion.
    pub fn time_slice_closed(&self, t_min: f64, t_max: f64, closed: Closed) -> TimeSeries {
        let range = self.slice_range(t_min, t_max, closed);
        if range == (0..self.len()) {
            return self.clone();
        }
        TimeSeries::derived(self.time[range].to_vec())
    }

    /// Keep only the samples for which `keep(index, t)` holds.
    pub fn mask<F>(&self, mut keep: F) -> TimeSeries
    where
        F: FnMut(usize, f64) -> bool,
    {
        let kept = self
            .time
            .iter()
            .enumerate()
            .filter(|&(i, &t)| keep(i, t))
            .map(|(_, &t)| t)
            .collect();
        TimeSeries::derived(kept)
    }

    /// Same length and every pair of timestamps within `tolerance`.
    pub fn is_consistent_with(&self, other: &TimeSeries, tolerance: f64) -> bool {
        self.len() == other.len()
            && self
                .time
                .iter()
                .zip(other.time.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// True if the sampling step is constant within `rtol`/`atol`.
    ///
    /// Series with two samples or fewer are uniform.
    pub fn is_uniform(&self, rtol: f64, atol: f64) -> bool {
        if self.len() <= 2 {
            return true;
        }
        let step = self.time[1] - self.time[0];
        self.time
            .windows(2)
            .all(|w| ((w[1] - w[0]) - step).abs() <= atol + rtol * step.abs())
    }

    pub(crate) fn concat(parts: &[&TimeSeries]) -> Result<TimeSeries> {
        let time: Vec<f64> = parts.iter().flat_map(|p| p.iter()).collect();
        TimeSeries::new(time)
    }
}

impl PartialEq for TimeSeries {
    fn eq(&self, other: &Self) -> bool {
        self.time[..] == other.time[..]
    }
}

impl AsRef<[f64]> for TimeSeries {
    fn as_ref(&self) -> &[f64] {
        &self.time
    }
}

impl TryFrom<Vec<f64>> for TimeSeries {
    type Error = Error;

    fn try_from(time: Vec<f64>) -> Result<Self> {
        TimeSeries::new(time)
    }
}

impl TryFrom<&[f64]> for TimeSeries {
    type Error = Error;

    fn try_from(time: &[f64]) -> Result<Self> {
        TimeSeries::new(time.to_vec())
    }
}
