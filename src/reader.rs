//! Interface to the external measurement file decoder.
//!
//! enginemdf never interprets raw file bytes. Everything it knows about a file
//! comes from a [`MeasurementReader`]: the enumeration of (group, channel)
//! pairs with their metadata, and the decoding of one pair into samples.
//!
//! Opening is the implementor's constructor and closing is `Drop`. Readers are
//! not required to be thread-safe; the engine calls them from a single thread.

use crate::error::ReaderError;

/// Metadata of one pair that was read successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct PairInfo {
    /// Number of samples recorded for the pair
    pub sample_count: u64,
    /// Physical unit, if the file declares one
    pub unit: Option<String>,
}

/// One (group, channel) pair as enumerated by a reader.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPair {
    pub group_index: usize,
    pub channel_index: usize,
    /// Name of the measurement (group) the channel belongs to
    pub measurement_name: String,
    pub channel_name: String,
    /// Metadata, or the reason it could not be read
    pub info: core::result::Result<PairInfo, String>,
}

/// Decoded samples of one pair: timestamps and values, index aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSamples {
    pub time: Vec<f64>,
    pub data: Vec<f64>,
}

impl RawSamples {
    /// Pair a master time vector with its data samples.
    pub fn new(time: Vec<f64>, data: Vec<f64>) -> Self {
        RawSamples { time, data }
    }
}

/// Access to an open measurement file.
pub trait MeasurementReader {
    /// Enumerate every (group, channel) pair in the file's native order.
    ///
    /// Must be metadata-only and deterministic for a given file. A pair whose
    /// metadata cannot be read is still listed, with `info` set to `Err`.
    fn enumerate(&self) -> Vec<RawPair>;

    /// Decode the samples of one pair.
    fn decode(
        &mut self,
        group_index: usize,
        channel_index: usize,
    ) -> core::result::Result<RawSamples, ReaderError>;
}
