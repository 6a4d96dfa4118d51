use std::sync::Arc;

use crate::{
    Error, Result,
    metadata::{Metadata, MetadataValue},
    timeseries::{Closed, TimeSeries},
};

/// Logical signal: a validated time base, an aligned data vector, a unit and
/// metadata.
///
/// A `Channel` can only be obtained through a validating constructor, so its
/// data is always aligned with its time base. Every transformation returns a
/// new `Channel`; the underlying sample storage is shared and clones are
/// cheap.
///
/// Equality compares name, unit, metadata and samples exactly, with NaN data
/// values equal to each other.
#[derive(Debug, Clone)]
pub struct Channel {
    name: String,
    time: TimeSeries,
    data: Arc<[f64]>,
    unit: String,
    metadata: Metadata,
}

impl Channel {
    /// Build a channel without metadata.
    ///
    /// # Arguments
    /// * `name` - Signal name, must not be blank
    /// * `time` - Raw timestamps in seconds, validated as a [`TimeSeries`]
    /// * `data` - One value per timestamp
    /// * `unit` - Physical unit, must not be blank
    ///
    /// # Returns
    /// The new [`Channel`], [`Error::ChannelValidation`] for a blank name or
    /// unit or a length mismatch, or [`Error::TimeSeriesConsistency`] when the
    /// timestamps are invalid.
    pub fn new(
        name: impl Into<String>,
        time: impl Into<Vec<f64>>,
        data: impl Into<Vec<f64>>,
        unit: impl Into<String>,
    ) -> Result<Self> {
        Self::with_metadata(name, time, data, unit, Metadata::new())
    }

    /// Build a channel carrying `metadata`.
    pub fn with_metadata(
        name: impl Into<String>,
        time: impl Into<Vec<f64>>,
        data: impl Into<Vec<f64>>,
        unit: impl Into<String>,
        metadata: Metadata,
    ) -> Result<Self> {
        let name = name.into();
        let unit = unit.into();
        let time: Vec<f64> = time.into();
        let data: Vec<f64> = data.into();
        validate_labels(&name, &unit)?;
        if data.len() != time.len() {
            return Err(Error::ChannelValidation(format!(
                "channel {name:?}: data has {} samples but time has {}",
                data.len(),
                time.len()
            )));
        }
        let time = TimeSeries::new(time)?;
        Ok(Channel {
            name,
            time,
            data: data.into(),
            unit,
            metadata,
        })
    }

    /// Build a channel around an existing time base.
    pub fn from_series(
        name: impl Into<String>,
        time: TimeSeries,
        data: impl Into<Vec<f64>>,
        unit: impl Into<String>,
        metadata: Metadata,
    ) -> Result<Self> {
        let name = name.into();
        let unit = unit.into();
        let data: Vec<f64> = data.into();
        validate_labels(&name, &unit)?;
        if data.len() != time.len() {
            return Err(Error::ChannelValidation(format!(
                "channel {name:?}: data has {} samples but time has {}",
                data.len(),
                time.len()
            )));
        }
        if time.is_empty() {
            return Err(Error::TimeSeriesConsistency(
                "time base must contain at least one sample".into(),
            ));
        }
        Ok(Channel {
            name,
            time,
            data: data.into(),
            unit,
            metadata,
        })
    }

    /// Signal name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time base shared by all samples.
    pub fn time(&self) -> &TimeSeries {
        &self.time
    }

    /// Sample values, aligned with [`Channel::time`]. May contain NaN.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Physical unit.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Metadata attached at construction or by the engine.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True for a slice or mask that kept no sample.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// First timestamp, `None` when empty.
    pub fn t_start(&self) -> Option<f64> {
        self.time.t_start()
    }

    /// Last timestamp, `None` when empty.
    pub fn t_end(&self) -> Option<f64> {
        self.time.t_end()
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().zip(self.data.iter().copied())
    }

    /// Samples with `t_min <= t <= t_max`.
    pub fn time_slice(&self, t_min: f64, t_max: f64) -> Channel {
        self.time_slice_closed(t_min, t_max, Closed::Both)
    }

    /// Like [`Channel::time_slice`] with explicit endpoint inclusion.
    pub fn time_slice_closed(&self, t_min: f64, t_max: f64, closed: Closed) -> Channel {
        let range = self.time.slice_range(t_min, t_max, closed);
        if range == (0..self.len()) {
            return self.clone();
        }
        let time = self.time.time_slice_closed(t_min, t_max, closed);
        let data = self.data[range].to_vec();
        self.derive(time, data)
    }

    /// Keep the samples for which `keep(index, t, value)` holds.
    pub fn mask<F>(&self, mut keep: F) -> Channel
    where
        F: FnMut(usize, f64, f64) -> bool,
    {
        let selected: Vec<bool> = self
            .iter()
            .enumerate()
            .map(|(i, (t, v))| keep(i, t, v))
            .collect();
        let time = self.time.mask(|i, _| selected[i]);
        let data = self
            .data
            .iter()
            .zip(&selected)
            .filter(|&(_, &k)| k)
            .map(|(&v, _)| v)
            .collect();
        self.derive(time, data)
    }

    /// Same samples under another name.
    pub fn renamed(&self, name: impl Into<String>) -> Result<Channel> {
        let name = name.into();
        validate_labels(&name, &self.unit)?;
        Ok(Channel {
            name,
            ..self.clone()
        })
    }

    /// Same samples with another unit.
    pub fn with_unit(&self, unit: impl Into<String>) -> Result<Channel> {
        let unit = unit.into();
        validate_labels(&self.name, &unit)?;
        Ok(Channel {
            unit,
            ..self.clone()
        })
    }

    /// Same samples with one metadata entry added or replaced.
    pub fn with_metadata_entry(
        &self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Channel {
        let mut metadata = self.metadata.clone();
        metadata.insert(key.into(), value.into());
        Channel {
            metadata,
            ..self.clone()
        }
    }

    /// Mean over the non-NaN values, `None` if there are none.
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .data
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Standard deviation over the non-NaN values with `ddof` delta degrees of
    /// freedom.
    pub fn std_dev(&self, ddof: usize) -> Option<f64> {
        let mean = self.mean()?;
        let (sq, count) = self
            .data
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, n), v| (s + (v - mean).powi(2), n + 1));
        (count > ddof).then(|| (sq / (count - ddof) as f64).sqrt())
    }

    // Slices and masks keep the alignment of their source, so no re-validation.
    fn derive(&self, time: TimeSeries, data: Vec<f64>) -> Channel {
        debug_assert_eq!(time.len(), data.len());
        Channel {
            name: self.name.clone(),
            time,
            data: data.into(),
            unit: self.unit.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.unit == other.unit
            && self.time == other.time
            && self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
            && self.metadata == other.metadata
    }
}

fn validate_labels(name: &str, unit: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::ChannelValidation(
            "channel name must be a non-empty string".into(),
        ));
    }
    if unit.trim().is_empty() {
        return Err(Error::ChannelValidation(format!(
            "channel {name:?}: unit must be a non-empty string"
        )));
    }
    Ok(())
}
