//! Segment discovery.
//!
//! Discovery is a single metadata-only pass over the reader's enumeration. It
//! produces one [`SegmentDescriptor`] per enumerated pair, in enumeration
//! order, each with a logical path `"<measurement>/<channel>"` that is unique
//! within the pass. A pair whose metadata could not be read still gets a
//! descriptor, with [`SegmentStatus::Error`].

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::{
    config::EngineConfig,
    reader::RawPair,
    segment::{
        SegmentDescriptor, SegmentLoader, SegmentStatus, SharedReader, parse_measurement_name,
    },
};

/// Hands out unique logical paths in enumeration order.
///
/// The first pair to claim `"M/C"` keeps it. Later pairs are qualified with
/// their group index (`"M/C#3"`), then with group and channel index
/// (`"M/C#3.1"`), then with a counter until the path is free.
#[derive(Debug)]
pub(crate) struct PathAllocator {
    separator: char,
    taken: HashSet<String>,
}

impl PathAllocator {
    pub(crate) fn new(separator: char) -> Self {
        PathAllocator {
            separator,
            taken: HashSet::new(),
        }
    }

    pub(crate) fn allocate(
        &mut self,
        measurement: &str,
        channel: &str,
        group_index: usize,
        channel_index: usize,
    ) -> String {
        let base = format!("{measurement}/{channel}");
        if self.claim(&base) {
            return base;
        }
        let by_group = format!("{base}{}{group_index}", self.separator);
        if self.claim(&by_group) {
            return by_group;
        }
        let by_channel = format!("{by_group}.{channel_index}");
        if self.claim(&by_channel) {
            return by_channel;
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{by_channel}-{n}");
            if self.claim(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn claim(&mut self, path: &str) -> bool {
        if self.taken.contains(path) {
            return false;
        }
        self.taken.insert(path.to_owned())
    }
}

/// Run discovery over the reader behind `handle`.
pub(crate) fn discover(handle: &SharedReader, config: &EngineConfig) -> Vec<SegmentDescriptor> {
    let pairs = handle.borrow().enumerate();
    let mut paths = PathAllocator::new(config.suffix_separator);
    let mut descriptors = Vec::with_capacity(pairs.len());
    let mut failed = 0usize;

    for pair in pairs {
        let RawPair {
            group_index,
            channel_index,
            measurement_name,
            channel_name,
            info,
        } = pair;

        let logical_path =
            paths.allocate(&measurement_name, &channel_name, group_index, channel_index);
        let (key, index) = parse_measurement_name(&measurement_name);
        let measurement_key = key.to_owned();

        let (status, sample_count, unit) = match info {
            Ok(info) => {
                debug!(
                    path = %logical_path,
                    group = group_index,
                    channel = channel_index,
                    samples = info.sample_count,
                    "discovered segment"
                );
                let unit = info.unit.filter(|u| !u.trim().is_empty());
                (SegmentStatus::Ok, Some(info.sample_count), unit)
            }
            Err(reason) => {
                failed += 1;
                warn!(
                    path = %logical_path,
                    group = group_index,
                    channel = channel_index,
                    %reason,
                    "segment metadata unreadable"
                );
                (SegmentStatus::Error { reason }, None, None)
            }
        };

        let loader = SegmentLoader::new(
            handle,
            group_index,
            channel_index,
            logical_path.clone(),
            status.reason().map(str::to_owned),
        );

        descriptors.push(SegmentDescriptor {
            measurement_name,
            measurement_key,
            measurement_index: index,
            channel_name,
            logical_path,
            sample_count,
            unit,
            group_index,
            channel_index,
            status,
            loader,
        });
    }

    info!(
        segments = descriptors.len(),
        failed, "segment discovery finished"
    );
    descriptors
}
