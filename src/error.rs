//! Error types for enginemdf operations.
//!
//! This module defines the [`Error`] enum which represents every failure that
//! can occur while validating signals, discovering segments, or materializing
//! channels from an open measurement file.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "mdf4")]
//! use enginemdf::{EngineMdf, Error, Result};
//!
//! # #[cfg(feature = "mdf4")]
//! fn engine_speed(path: &str) -> Result<()> {
//!     let mut engine = EngineMdf::open(path)?;
//!     match engine.get_channel("RecResult[1]/eng_spd") {
//!         Ok(channel) => println!("{} samples", channel.len()),
//!         Err(Error::UnknownPath(p)) => eprintln!("no such segment: {p}"),
//!         Err(Error::SegmentDecode { path, reason, .. }) => {
//!             eprintln!("segment {path} is unusable: {reason}")
//!         }
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

/// Error reported by a [`crate::MeasurementReader`] implementation.
pub type ReaderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while working with measurement data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A time base was empty, decreased somewhere, or held a non-finite value.
    #[error("inconsistent time base: {0}")]
    TimeSeriesConsistency(String),

    /// A channel could not be constructed.
    ///
    /// Raised for an empty name or unit, or when the data vector and the time
    /// base have different lengths.
    #[error("invalid channel: {0}")]
    ChannelValidation(String),

    /// A segment could not be turned into samples.
    ///
    /// Either the segment was marked as failed during discovery, the reader
    /// failed to decode it, or the decoded samples did not validate.
    #[error("cannot decode segment {path:?}: {reason}")]
    SegmentDecode {
        /// Logical path of the segment
        path: String,
        /// Human readable cause
        reason: String,
        /// Underlying failure, when there is one
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    /// No discovered segment has the requested logical path.
    #[error("unknown logical path: {0:?}")]
    UnknownPath(String),

    /// A [`crate::Measurement`] holds no channel with the requested name.
    #[error("measurement {measurement:?} has no channel {channel:?}")]
    ChannelNotFound {
        /// Name of the measurement that was searched
        measurement: String,
        /// Requested channel name
        channel: String,
    },

    /// The file handle has been released by `close()`.
    #[error("measurement file is closed")]
    ClosedFile,

    /// The external reader could not open the file.
    #[error("cannot open {path}: {source}")]
    FileOpen {
        /// Path that was passed to `open`
        path: PathBuf,
        /// Reader failure
        #[source]
        source: ReaderError,
    },

    /// An I/O error occurred while writing a catalog or reading a config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization of a catalog or config failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An [`crate::EngineConfig`] value was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Build a [`Error::SegmentDecode`] without an underlying source.
    pub(crate) fn decode(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::SegmentDecode {
            path: path.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Build a [`Error::SegmentDecode`] wrapping an underlying failure.
    pub(crate) fn decode_with<E>(path: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        let source = source.into();
        Error::SegmentDecode {
            path: path.into(),
            reason: source.to_string(),
            source: Some(source),
        }
    }
}

/// A specialized Result type for enginemdf operations.
pub type Result<T> = core::result::Result<T, Error>;
