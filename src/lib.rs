#![forbid(unsafe_code)]

//! # enginemdf
//!
//! Validated, immutable measurement signals on top of automotive MDF files.
//!
//! enginemdf sits between a measurement file decoder and analysis code. It
//! discovers every (group, channel) pair of a file once, maps each onto a
//! stable logical path such as `"RecResult[1]/eng_spd"`, and decodes samples
//! only when a channel is requested.
//!
//! ## Features
//!
//! - **TimeSeries**: a non-empty, non-decreasing, finite time base that cannot
//!   be observed in an invalid state
//! - **Channel**: a time base plus an aligned data vector, unit, and typed
//!   metadata; slicing and masking keep time and data aligned
//! - **Discovery**: metadata-only scan with unique logical paths and
//!   per-segment failure capture, so one corrupt channel never hides the rest
//! - **Lazy loading**: each segment decodes through an explicit loader value
//!   on first request, with optional caching
//! - **Logical channels**: `RecResult[1]`, `RecResult[2]`, ... joined into one
//!   signal by channel name, and whole measurements loaded as a
//!   [`Measurement`]
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "mdf4")]
//! # fn main() -> enginemdf::Result<()> {
//! use enginemdf::EngineMdf;
//!
//! let mut engine = EngineMdf::open("recording.mf4")?;
//!
//! for segment in engine.segments() {
//!     println!("{} ({:?})", segment.logical_path(), segment.status());
//! }
//!
//! let rpm = engine.get_channel("RecResult[1]/eng_spd")?;
//! let window = rpm.time_slice(10.0, 20.0);
//! println!("{} samples in [10, 20] s, unit {}", window.len(), window.unit());
//!
//! engine.close();
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "mdf4"))]
//! # fn main() {}
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`timeseries`] | Validated time base and range selection |
//! | [`measurement`] | Named channel collections with joint slicing |
//! | [`metadata`] | Typed channel metadata |
//! | [`reader`] | Interface to the external file decoder |
//! | [`segment`] | Segment descriptors and lazy loaders |
//! | [`config`] | Engine configuration |
//! | `mdf4` | MDF4 reader backed by `mdf4-rs` (feature `mdf4`) |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Construction errors are raised
//! immediately; discovery failures are recorded as segment status and only
//! surface when that segment is materialized.

mod channel;
mod discovery;
mod engine;

pub mod config;
pub mod error;
#[cfg(feature = "mdf4")]
pub mod mdf4;
pub mod measurement;
pub mod metadata;
pub mod reader;
pub mod segment;
pub mod timeseries;

// Re-export commonly used types at the crate root
pub use channel::Channel;
pub use config::EngineConfig;
pub use engine::EngineMdf;
pub use error::{Error, Result};
#[cfg(feature = "mdf4")]
pub use mdf4::Mdf4Reader;
pub use measurement::{Measurement, Missing};
pub use metadata::{Metadata, MetadataValue};
pub use reader::{MeasurementReader, PairInfo, RawPair, RawSamples};
pub use segment::{SegmentDescriptor, SegmentLoader, SegmentStatus, SegmentSummary};
pub use timeseries::{Closed, TimeSeries};
