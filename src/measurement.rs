//! Named collections of channels.
//!
//! A [`Measurement`] groups the channels recorded together in one run, such
//! as every channel of `RecResult[1]`. Like [`Channel`], it is immutable:
//! selecting, dropping and slicing return new collections that share sample
//! storage with the original.
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | [`Measurement::insert`] | Add a channel, optionally replacing one with the same name |
//! | [`Measurement::select`] | Keep the named channels, in the order given |
//! | [`Measurement::drop_channels`] | Remove the named channels |
//! | [`Measurement::time_slice`] | Cut every channel to the same time window |

use tracing::debug;

use crate::{
    Error, Result,
    channel::Channel,
    timeseries::Closed,
};

/// How [`Measurement::select`] and [`Measurement::drop_channels`] treat
/// names the measurement does not contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Missing {
    /// Fail with [`Error::ChannelNotFound`]
    #[default]
    Error,
    /// Skip the name
    Ignore,
}

/// Ordered set of channels with unique names.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    name: String,
    channels: Vec<Channel>,
}

impl Measurement {
    /// Build an empty measurement.
    ///
    /// # Errors
    /// [`Error::ChannelValidation`] for a blank name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::ChannelValidation(
                "measurement name must be a non-empty string".into(),
            ));
        }
        Ok(Measurement {
            name,
            channels: Vec::new(),
        })
    }

    /// Build a measurement from `channels`, rejecting duplicate names.
    pub fn from_channels<I>(name: impl Into<String>, channels: I) -> Result<Self>
    where
        I: IntoIterator<Item = Channel>,
    {
        channels
            .into_iter()
            .try_fold(Measurement::new(name)?, |m, ch| m.insert(ch, false))
    }

    /// Name of the measurement.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True when the measurement holds no channel.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// True if a channel called `channel` is present.
    pub fn contains(&self, channel: &str) -> bool {
        self.position(channel).is_some()
    }

    /// The channel called `channel`, if any.
    pub fn get(&self, channel: &str) -> Option<&Channel> {
        self.position(channel).map(|i| &self.channels[i])
    }

    /// Like [`Measurement::get`], failing with [`Error::ChannelNotFound`].
    pub fn channel(&self, channel: &str) -> Result<&Channel> {
        self.get(channel).ok_or_else(|| self.not_found(channel))
    }

    /// Channel names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.iter().map(Channel::name)
    }

    /// Channels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Channel> + '_ {
        self.channels.iter()
    }

    /// Earliest first timestamp over all non-empty channels.
    pub fn t_start(&self) -> Option<f64> {
        self.channels
            .iter()
            .filter_map(Channel::t_start)
            .reduce(f64::min)
    }

    /// Latest last timestamp over all non-empty channels.
    pub fn t_end(&self) -> Option<f64> {
        self.channels
            .iter()
            .filter_map(Channel::t_end)
            .reduce(f64::max)
    }

    /// A new measurement with `channel` added.
    ///
    /// With `overwrite`, a channel of the same name is replaced in place;
    /// otherwise a name clash is an [`Error::ChannelValidation`].
    pub fn insert(&self, channel: Channel, overwrite: bool) -> Result<Measurement> {
        let mut channels = self.channels.clone();
        match self.position(channel.name()) {
            Some(i) if overwrite => channels[i] = channel,
            Some(_) => {
                return Err(Error::ChannelValidation(format!(
                    "measurement {:?} already has a channel {:?}",
                    self.name,
                    channel.name()
                )));
            }
            None => channels.push(channel),
        }
        Ok(self.with_channels(channels))
    }

    /// A new measurement holding only `names`, in the order given.
    pub fn select<I, S>(&self, names: I, missing: Missing) -> Result<Measurement>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut channels: Vec<Channel> = Vec::new();
        for name in names {
            let name = name.as_ref();
            match self.get(name) {
                Some(ch) if !channels.iter().any(|c| c.name() == name) => {
                    channels.push(ch.clone())
                }
                Some(_) => {}
                None if missing == Missing::Ignore => {}
                None => return Err(self.not_found(name)),
            }
        }
        Ok(self.with_channels(channels))
    }

    /// A new measurement without `names`.
    pub fn drop_channels<I, S>(&self, names: I, missing: Missing) -> Result<Measurement>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        if missing == Missing::Error {
            if let Some(absent) = names.iter().find(|n| !self.contains(n.as_ref())) {
                return Err(self.not_found(absent.as_ref()));
            }
        }
        let channels = self
            .channels
            .iter()
            .filter(|c| !names.iter().any(|n| n.as_ref() == c.name()))
            .cloned()
            .collect();
        Ok(self.with_channels(channels))
    }

    /// Samples with `t_min <= t <= t_max` in every channel.
    ///
    /// With `drop_empty`, channels left without samples are removed.
    pub fn time_slice(&self, t_min: f64, t_max: f64, drop_empty: bool) -> Measurement {
        self.time_slice_closed(t_min, t_max, Closed::Both, drop_empty)
    }

    /// Like [`Measurement::time_slice`] with explicit endpoint inclusion.
    pub fn time_slice_closed(
        &self,
        t_min: f64,
        t_max: f64,
        closed: Closed,
        drop_empty: bool,
    ) -> Measurement {
        let channels = self
            .channels
            .iter()
            .map(|c| c.time_slice_closed(t_min, t_max, closed))
            .filter(|c| {
                let keep = !(drop_empty && c.is_empty());
                if !keep {
                    debug!(measurement = %self.name, channel = c.name(), "dropped empty channel");
                }
                keep
            })
            .collect();
        self.with_channels(channels)
    }

    /// Same channels under another name.
    pub fn renamed(&self, name: impl Into<String>) -> Result<Measurement> {
        let renamed = Measurement::new(name)?;
        Ok(renamed.with_channels(self.channels.clone()))
    }

    fn position(&self, channel: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.name() == channel)
    }

    fn not_found(&self, channel: &str) -> Error {
        Error::ChannelNotFound {
            measurement: self.name.clone(),
            channel: channel.to_owned(),
        }
    }

    fn with_channels(&self, channels: Vec<Channel>) -> Measurement {
        Measurement {
            name: self.name.clone(),
            channels,
        }
    }
}
