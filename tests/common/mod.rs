#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use enginemdf::{MeasurementReader, PairInfo, RawPair, RawSamples, error::ReaderError};

/// In-memory reader: groups of channels with fixed samples.
#[derive(Default)]
pub struct FakeReader {
    pairs: Vec<RawPair>,
    samples: HashMap<(usize, usize), core::result::Result<RawSamples, String>>,
    groups: usize,
    current_measurement: Option<String>,
    decode_calls: Rc<Cell<usize>>,
}

impl FakeReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new group; following channels belong to it.
    pub fn group(mut self, measurement: &str) -> Self {
        self.groups += 1;
        self.current_measurement = Some(measurement.to_string());
        self
    }

    pub fn channel(self, name: &str, unit: Option<&str>, time: &[f64], data: &[f64]) -> Self {
        let info = Ok(PairInfo {
            sample_count: time.len() as u64,
            unit: unit.map(str::to_string),
        });
        self.push(name, info, Ok(RawSamples::new(time.to_vec(), data.to_vec())))
    }

    /// A channel whose metadata cannot be read.
    pub fn broken_channel(self, name: &str, reason: &str) -> Self {
        self.push(
            name,
            Err(reason.to_string()),
            Err("decode must not be called".to_string()),
        )
    }

    /// A channel with readable metadata that fails to decode.
    pub fn undecodable_channel(self, name: &str, reason: &str) -> Self {
        let info = Ok(PairInfo {
            sample_count: 3,
            unit: Some("V".to_string()),
        });
        self.push(name, info, Err(reason.to_string()))
    }

    /// Shared counter of `decode` calls, readable after the reader is moved.
    pub fn decode_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.decode_calls)
    }

    fn push(
        mut self,
        name: &str,
        info: core::result::Result<PairInfo, String>,
        samples: core::result::Result<RawSamples, String>,
    ) -> Self {
        let group_index = self.groups.checked_sub(1).expect("call group() first");
        let channel_index = self
            .pairs
            .iter()
            .filter(|p| p.group_index == group_index)
            .count();
        self.pairs.push(RawPair {
            group_index,
            channel_index,
            measurement_name: self.current_measurement.clone().unwrap_or_default(),
            channel_name: name.to_string(),
            info,
        });
        self.samples.insert((group_index, channel_index), samples);
        self
    }
}

impl MeasurementReader for FakeReader {
    fn enumerate(&self) -> Vec<RawPair> {
        self.pairs.clone()
    }

    fn decode(
        &mut self,
        group_index: usize,
        channel_index: usize,
    ) -> core::result::Result<RawSamples, ReaderError> {
        self.decode_calls.set(self.decode_calls.get() + 1);
        match self.samples.get(&(group_index, channel_index)) {
            Some(Ok(samples)) => Ok(samples.clone()),
            Some(Err(reason)) => Err(reason.clone().into()),
            None => Err(format!("no pair ({group_index}, {channel_index})").into()),
        }
    }
}

/// G1{A, B}, G2{A}: the layout used by most engine tests.
pub fn two_groups(second_measurement: &str) -> FakeReader {
    FakeReader::new()
        .group("G1")
        .channel("A", Some("rpm"), &[0.0, 1.0, 2.0], &[800.0, 1200.0, 1500.0])
        .channel("B", Some("Nm"), &[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0])
        .group(second_measurement)
        .channel("A", Some("rpm"), &[3.0, 4.0], &[900.0, 950.0])
}
