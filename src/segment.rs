//! Segment descriptors and their lazy loaders.
//!
//! A segment is one (group, channel) pair of an open file, addressed by its
//! logical path. Descriptors carry only metadata; the samples are decoded by
//! the descriptor's [`SegmentLoader`] when first requested.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{
    Error, Result,
    reader::{MeasurementReader, RawSamples},
};

pub(crate) type SharedReader = Rc<RefCell<dyn MeasurementReader>>;
type WeakReader = Weak<RefCell<dyn MeasurementReader>>;

/// Outcome of reading a segment's metadata during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentStatus {
    Ok,
    Error { reason: String },
}

impl SegmentStatus {
    /// True for [`SegmentStatus::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, SegmentStatus::Ok)
    }

    /// Failure reason for [`SegmentStatus::Error`].
    pub fn reason(&self) -> Option<&str> {
        match self {
            SegmentStatus::Ok => None,
            SegmentStatus::Error { reason } => Some(reason),
        }
    }
}

/// Deferred decode of one segment.
///
/// Holds the reader indices and a weak reference to the file handle owned by
/// the engine, never decoded samples. Once the engine is closed or dropped the
/// handle is gone and [`SegmentLoader::load`] fails with
/// [`Error::ClosedFile`].
#[derive(Clone)]
pub struct SegmentLoader {
    handle: WeakReader,
    group_index: usize,
    channel_index: usize,
    logical_path: String,
    failure: Option<String>,
}

impl SegmentLoader {
    pub(crate) fn new(
        handle: &SharedReader,
        group_index: usize,
        channel_index: usize,
        logical_path: String,
        failure: Option<String>,
    ) -> Self {
        SegmentLoader {
            handle: Rc::downgrade(handle),
            group_index,
            channel_index,
            logical_path,
            failure,
        }
    }

    /// Decode the segment's samples through the reader.
    ///
    /// # Errors
    /// * [`Error::ClosedFile`] once the owning file has been closed
    /// * [`Error::SegmentDecode`] if the segment failed discovery (the reader
    ///   is not called) or the reader cannot decode it
    pub fn load(&self) -> Result<RawSamples> {
        let handle = self.handle.upgrade().ok_or(Error::ClosedFile)?;
        if let Some(reason) = &self.failure {
            return Err(Error::decode(&self.logical_path, reason.as_str()));
        }
        let mut reader = handle.try_borrow_mut().map_err(|_| {
            Error::decode(&self.logical_path, "reader is already decoding another segment")
        })?;
        reader
            .decode(self.group_index, self.channel_index)
            .map_err(|e| Error::decode_with(&self.logical_path, e))
    }

    /// True while the owning file is open.
    pub fn is_live(&self) -> bool {
        self.handle.strong_count() > 0
    }

    /// Reader group index this loader decodes.
    pub fn group_index(&self) -> usize {
        self.group_index
    }

    /// Reader channel index within the group.
    pub fn channel_index(&self) -> usize {
        self.channel_index
    }
}

impl fmt::Debug for SegmentLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentLoader")
            .field("logical_path", &self.logical_path)
            .field("group_index", &self.group_index)
            .field("channel_index", &self.channel_index)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Metadata record for one discovered (group, channel) pair.
#[derive(Debug, Clone)]
pub struct SegmentDescriptor {
    pub(crate) measurement_name: String,
    pub(crate) measurement_key: String,
    pub(crate) measurement_index: Option<u32>,
    pub(crate) channel_name: String,
    pub(crate) logical_path: String,
    pub(crate) sample_count: Option<u64>,
    pub(crate) unit: Option<String>,
    pub(crate) group_index: usize,
    pub(crate) channel_index: usize,
    pub(crate) status: SegmentStatus,
    pub(crate) loader: SegmentLoader,
}

impl SegmentDescriptor {
    /// Measurement (group) name as stored in the file.
    pub fn measurement_name(&self) -> &str {
        &self.measurement_name
    }

    /// Alphabetic key of the measurement name, e.g. `RecResult` for
    /// `RecResult[2]`.
    pub fn measurement_key(&self) -> &str {
        &self.measurement_key
    }

    /// Bracketed index of the measurement name, e.g. `2` for `RecResult[2]`.
    pub fn measurement_index(&self) -> Option<u32> {
        self.measurement_index
    }

    /// Channel name as stored in the file.
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Unique path of this segment within the file.
    pub fn logical_path(&self) -> &str {
        &self.logical_path
    }

    /// Sample count declared by the file, `None` if metadata could not be read.
    pub fn sample_count(&self) -> Option<u64> {
        self.sample_count
    }

    /// Declared unit, `None` if missing or blank.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Position of the group in the file.
    pub fn group_index(&self) -> usize {
        self.group_index
    }

    /// Position of the channel within its group.
    pub fn channel_index(&self) -> usize {
        self.channel_index
    }

    /// Outcome of the metadata read.
    pub fn status(&self) -> &SegmentStatus {
        &self.status
    }

    /// True if the segment can be materialized.
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Deferred decoder for this segment.
    pub fn loader(&self) -> &SegmentLoader {
        &self.loader
    }

    /// Shorthand for `self.loader().load()`.
    pub fn load(&self) -> Result<RawSamples> {
        self.loader.load()
    }

    /// Serializable view of this descriptor.
    pub fn summary(&self) -> SegmentSummary {
        SegmentSummary {
            logical_path: self.logical_path.clone(),
            measurement_name: self.measurement_name.clone(),
            measurement_key: self.measurement_key.clone(),
            measurement_index: self.measurement_index,
            channel_name: self.channel_name.clone(),
            group_index: self.group_index,
            channel_index: self.channel_index,
            sample_count: self.sample_count,
            unit: self.unit.clone(),
            ok: self.status.is_ok(),
            error: self.status.reason().map(str::to_owned),
        }
    }
}

/// Catalog entry describing a segment without its loader.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SegmentSummary {
    pub logical_path: String,
    pub measurement_name: String,
    pub measurement_key: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub measurement_index: Option<u32>,
    pub channel_name: String,
    pub group_index: usize,
    pub channel_index: usize,
    pub sample_count: Option<u64>,
    pub unit: Option<String>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Split a measurement name into its alphabetic key and optional index.
///
/// `"RecResult[1]"` gives `("RecResult", Some(1))` and `"D"` gives
/// `("D", None)`. Names of any other shape are returned whole, without index.
pub fn parse_measurement_name(name: &str) -> (&str, Option<u32>) {
    let is_key = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic());

    if let Some((key, digits)) = name.strip_suffix(']').and_then(|s| s.split_once('[')) {
        if is_key(key) && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = digits.parse() {
                return (key, Some(index));
            }
        }
        return (name, None);
    }
    (name, None)
}
