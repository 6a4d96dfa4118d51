use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    channel::Channel,
    config::EngineConfig,
    discovery::discover,
    measurement::Measurement,
    metadata::{Metadata, MetadataValue},
    reader::{MeasurementReader, RawSamples},
    segment::{SegmentDescriptor, SegmentSummary, SharedReader},
    timeseries::TimeSeries,
};

/// Facade over one open measurement file.
///
/// Opening runs segment discovery once; no samples are decoded until a
/// channel is requested by logical path.
///
/// The engine owns the reader handle. It is not `Send`: a caller sharing one
/// engine between threads must serialize access itself, so that at most one
/// decode is in flight.
pub struct EngineMdf {
    handle: Option<SharedReader>,
    segments: Vec<SegmentDescriptor>,
    by_path: HashMap<String, usize>,
    cache: HashMap<String, Channel>,
    config: EngineConfig,
}

impl EngineMdf {
    /// Open an MDF4 file with the default configuration.
    ///
    /// # Errors
    /// [`Error::FileOpen`] if the file cannot be read as MDF4.
    #[cfg(feature = "mdf4")]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, EngineConfig::default())
    }

    /// Open an MDF4 file with `config`.
    #[cfg(feature = "mdf4")]
    pub fn open_with_config(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        let path = path.as_ref();
        let reader = crate::mdf4::Mdf4Reader::open(path).map_err(|source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "opened measurement file");
        Self::from_reader(reader, config)
    }

    /// Build an engine around an already opened reader.
    pub fn from_reader<R>(reader: R, config: EngineConfig) -> Result<Self>
    where
        R: MeasurementReader + 'static,
    {
        config.validate()?;
        let handle: SharedReader = Rc::new(RefCell::new(reader));
        let segments = discover(&handle, &config);
        let by_path = segments
            .iter()
            .enumerate()
            .map(|(i, s)| (s.logical_path.clone(), i))
            .collect();
        Ok(EngineMdf {
            handle: Some(handle),
            segments,
            by_path,
            cache: HashMap::new(),
            config,
        })
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Discovered segments, in discovery order.
    ///
    /// Available even after [`EngineMdf::close`].
    pub fn segments(&self) -> &[SegmentDescriptor] {
        &self.segments
    }

    /// Descriptor registered under `logical_path`.
    pub fn segment(&self, logical_path: &str) -> Option<&SegmentDescriptor> {
        self.by_path.get(logical_path).map(|&i| &self.segments[i])
    }

    /// Logical paths in discovery order.
    pub fn logical_paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments.iter().map(|s| s.logical_path())
    }

    /// Segments whose metadata was read successfully.
    pub fn ok_segments(&self) -> impl Iterator<Item = &SegmentDescriptor> + '_ {
        self.segments.iter().filter(|s| s.is_ok())
    }

    /// Segments recorded with [`crate::SegmentStatus::Error`].
    pub fn failed_segments(&self) -> impl Iterator<Item = &SegmentDescriptor> + '_ {
        self.segments.iter().filter(|s| !s.is_ok())
    }

    /// False once [`EngineMdf::close`] has been called.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Materialize the channel behind `logical_path`.
    ///
    /// With caching enabled, a previously materialized channel is returned
    /// without calling the loader again.
    ///
    /// # Errors
    /// * [`Error::ClosedFile`] after [`EngineMdf::close`]
    /// * [`Error::UnknownPath`] if no segment has this path
    /// * [`Error::SegmentDecode`] if the segment failed discovery, the reader
    ///   fails, or the decoded samples are not a valid channel
    pub fn get_channel(&mut self, logical_path: &str) -> Result<Channel> {
        self.ensure_open()?;
        if let Some(channel) = self.cache.get(logical_path) {
            debug!(path = logical_path, "channel served from cache");
            return Ok(channel.clone());
        }
        let descriptor = self
            .segment(logical_path)
            .ok_or_else(|| Error::UnknownPath(logical_path.to_owned()))?;
        let channel = self.materialize(descriptor)?;
        if self.config.cache_channels {
            self.cache.insert(logical_path.to_owned(), channel.clone());
        }
        Ok(channel)
    }

    /// Materialize a channel and keep only `t_min <= t <= t_max`.
    pub fn get_channel_window(
        &mut self,
        logical_path: &str,
        t_min: f64,
        t_max: f64,
    ) -> Result<Channel> {
        Ok(self.get_channel(logical_path)?.time_slice(t_min, t_max))
    }

    /// Materialize several channels, in the order given.
    pub fn get_channels<I, S>(&mut self, logical_paths: I) -> Result<Vec<Channel>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        logical_paths
            .into_iter()
            .map(|p| self.get_channel(p.as_ref()))
            .collect()
    }

    /// Load every segment of measurement `key` carrying `channel_name` and
    /// join them into one channel.
    ///
    /// Parts are ordered by measurement index, unindexed measurements first,
    /// so `RecResult[1]`, `RecResult[2]`, ... become one continuous signal.
    ///
    /// # Errors
    /// * [`Error::UnknownPath`] if nothing matches
    /// * [`Error::SegmentDecode`] if a part cannot be loaded or the parts
    ///   disagree on their unit
    /// * [`Error::TimeSeriesConsistency`] if the joined timestamps decrease
    pub fn get_concatenated(&mut self, key: &str, channel_name: &str) -> Result<Channel> {
        self.get_concatenated_with_ids(key, channel_name)
            .map(|(channel, _)| channel)
    }

    /// Like [`EngineMdf::get_concatenated`], also returning for every sample
    /// the index of the measurement it came from (`None` for an unindexed
    /// measurement).
    pub fn get_concatenated_with_ids(
        &mut self,
        key: &str,
        channel_name: &str,
    ) -> Result<(Channel, Vec<Option<u32>>)> {
        self.ensure_open()?;
        let label = format!("{key}[*]/{channel_name}");
        let mut parts: Vec<(Option<u32>, String)> = self
            .segments
            .iter()
            .filter(|s| s.measurement_key == key && s.channel_name == channel_name)
            .map(|s| (s.measurement_index, s.logical_path.clone()))
            .collect();
        if parts.is_empty() {
            return Err(Error::UnknownPath(label));
        }
        parts.sort_by_key(|(index, _)| index.map_or(-1, i64::from));

        let channels = parts
            .iter()
            .map(|(_, path)| self.get_channel(path))
            .collect::<Result<Vec<_>>>()?;
        let unit = channels[0].unit().to_owned();
        if let Some(other) = channels.iter().find(|c| c.unit() != unit) {
            return Err(Error::decode(
                label,
                format!("parts disagree on unit: {unit:?} and {:?}", other.unit()),
            ));
        }

        let time = TimeSeries::concat(&channels.iter().map(Channel::time).collect::<Vec<_>>())?;
        let data: Vec<f64> = channels
            .iter()
            .flat_map(|c| c.data().iter().copied())
            .collect();
        let ids: Vec<Option<u32>> = parts
            .iter()
            .zip(&channels)
            .flat_map(|((index, _), c)| std::iter::repeat_n(*index, c.len()))
            .collect();
        debug!(%label, parts = channels.len(), samples = data.len(), "concatenated measurement parts");

        let mut metadata = Metadata::new();
        metadata.insert("measurement".into(), key.into());
        metadata.insert("parts".into(), channels.len().into());
        metadata.insert("source".into(), format!("MDF:{key}").into());
        let channel = Channel::from_series(channel_name, time, data, unit, metadata)?;
        Ok((channel, ids))
    }

    /// Distinct channel names in discovery order.
    pub fn logical_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.segments
            .iter()
            .map(SegmentDescriptor::channel_name)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Measurement key used to resolve `channel_name` by name alone.
    ///
    /// [`EngineConfig::default_measurement_key`] wins when it carries the
    /// channel; otherwise the first key in discovery order that does.
    pub fn logical_key(&self, channel_name: &str) -> Option<&str> {
        let preferred = self.config.default_measurement_key.as_str();
        let mut candidates = self
            .segments
            .iter()
            .filter(|s| s.channel_name == channel_name)
            .map(SegmentDescriptor::measurement_key);
        let first = candidates.next()?;
        if first == preferred || candidates.any(|k| k == preferred) {
            Some(preferred)
        } else {
            Some(first)
        }
    }

    /// Load `channel_name` across all measurements of its logical key.
    ///
    /// # Errors
    /// [`Error::UnknownPath`] if no segment carries that channel name, and
    /// the errors of [`EngineMdf::get_concatenated`].
    pub fn get_logical(&mut self, channel_name: &str) -> Result<Channel> {
        self.ensure_open()?;
        let key = self
            .logical_key(channel_name)
            .ok_or_else(|| Error::UnknownPath(channel_name.to_owned()))?
            .to_owned();
        self.get_concatenated(&key, channel_name)
    }

    /// Load several logical channels and keep `t_min <= t <= t_max`.
    pub fn get_logical_window<I, S>(
        &mut self,
        channel_names: I,
        t_min: f64,
        t_max: f64,
    ) -> Result<Vec<Channel>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        channel_names
            .into_iter()
            .map(|n| -> Result<Channel> {
                Ok(self.get_logical(n.as_ref())?.time_slice(t_min, t_max))
            })
            .collect()
    }

    /// Materialize every usable channel of one measurement as a
    /// [`Measurement`].
    ///
    /// Failed segments are left out. When a channel name repeats within the
    /// measurement, the first segment in discovery order is kept.
    ///
    /// # Errors
    /// [`Error::UnknownPath`] if no segment belongs to `measurement_name`,
    /// [`Error::SegmentDecode`] if a usable segment fails to load.
    pub fn get_measurement(&mut self, measurement_name: &str) -> Result<Measurement> {
        self.ensure_open()?;
        let members: Vec<(String, String, bool)> = self
            .segments
            .iter()
            .filter(|s| s.measurement_name == measurement_name)
            .map(|s| (s.channel_name.clone(), s.logical_path.clone(), s.is_ok()))
            .collect();
        if members.is_empty() {
            return Err(Error::UnknownPath(format!("{measurement_name}/*")));
        }

        let mut measurement = Measurement::new(measurement_name)?;
        for (channel_name, path, ok) in members {
            if !ok {
                debug!(%path, "skipping failed segment");
                continue;
            }
            if measurement.contains(&channel_name) {
                warn!(%path, "channel name repeats within measurement, keeping the first");
                continue;
            }
            let channel = self.get_channel(&path)?;
            measurement = measurement.insert(channel, false)?;
        }
        Ok(measurement)
    }

    /// Serializable summary of all segments, in discovery order.
    pub fn catalog(&self) -> Vec<SegmentSummary> {
        self.segments.iter().map(SegmentDescriptor::summary).collect()
    }

    /// Write [`EngineMdf::catalog`] as pretty-printed JSON.
    pub fn save_catalog(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.catalog())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Drop every cached channel.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Release the file handle.
    ///
    /// Afterwards [`EngineMdf::get_channel`] and every loader obtained from
    /// this engine fail with [`Error::ClosedFile`]. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.handle.take().is_some() {
            self.cache.clear();
            info!(segments = self.segments.len(), "closed measurement file");
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.handle.is_some() {
            Ok(())
        } else {
            Err(Error::ClosedFile)
        }
    }

    fn materialize(&self, descriptor: &SegmentDescriptor) -> Result<Channel> {
        let path = descriptor.logical_path();
        let RawSamples { time, data } = descriptor.load()?;
        debug!(path, samples = time.len(), "decoded segment");
        if time.is_empty() {
            return Err(Error::decode(path, "segment has no samples"));
        }

        let unit = descriptor
            .unit()
            .unwrap_or(self.config.default_unit.as_str())
            .to_owned();
        let mut metadata = Metadata::new();
        metadata.insert(
            "measurement".into(),
            MetadataValue::from(descriptor.measurement_name()),
        );
        metadata.insert("logical_path".into(), path.into());
        metadata.insert("group_index".into(), descriptor.group_index().into());
        metadata.insert("channel_index".into(), descriptor.channel_index().into());
        metadata.insert(
            "source".into(),
            format!("MDF:{}", descriptor.measurement_key()).into(),
        );

        Channel::with_metadata(descriptor.channel_name(), time, data, unit, metadata)
            .map_err(|e| Error::decode_with(path, e))
    }
}

impl std::fmt::Debug for EngineMdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineMdf")
            .field("open", &self.is_open())
            .field("segments", &self.segments.len())
            .field("cached", &self.cache.len())
            .field("config", &self.config)
            .finish()
    }
}
