//! [`MeasurementReader`] over ASAM MDF4 files, backed by the `mdf4-rs` crate.
//!
//! Opening builds an [`MdfIndex`] with streaming reads, so only metadata
//! blocks are touched. Samples are read later through a [`FileRangeReader`],
//! one channel at a time.
//!
//! A channel is reported with unreadable metadata when its group has no
//! master (time) channel, when it stores variable length signal data, when
//! its data type is not numeric, when its conversion produces text, or when
//! its group's data blocks are compressed.

use std::path::{Path, PathBuf};

use mdf4_rs::{
    DataType, DecodedValue, FileRangeReader, MdfIndex,
    blocks::{ConversionBlock, ConversionType},
    index::{IndexedChannel, IndexedChannelGroup},
};

use crate::{
    error::ReaderError,
    reader::{MeasurementReader, PairInfo, RawPair, RawSamples},
};

const CHANNEL_TYPE_VLSD: u8 = 1;
const CHANNEL_TYPE_MASTER: u8 = 2;

/// Open MDF4 file: its metadata index plus a byte range reader for samples.
pub struct Mdf4Reader {
    path: PathBuf,
    index: MdfIndex,
    ranges: FileRangeReader,
}

impl Mdf4Reader {
    /// Index the metadata of the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| format!("path {} is not valid UTF-8", path.display()))?;
        let index = MdfIndex::from_file_streaming(path_str)?;
        let ranges = FileRangeReader::new(path_str)?;
        Ok(Mdf4Reader {
            path: path.to_path_buf(),
            index,
            ranges,
        })
    }

    /// Path the reader was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The metadata index built at open time.
    pub fn index(&self) -> &MdfIndex {
        &self.index
    }
}

impl MeasurementReader for Mdf4Reader {
    fn enumerate(&self) -> Vec<RawPair> {
        let mut pairs = Vec::new();
        for (group_index, group) in self.index.channel_groups.iter().enumerate() {
            let measurement_name = group
                .name
                .clone()
                .unwrap_or_else(|| format!("Group{group_index}"));
            let master = master_channel(group);

            for (channel_index, channel) in group.channels.iter().enumerate() {
                let channel_name = channel
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Channel{channel_index}"));
                pairs.push(RawPair {
                    group_index,
                    channel_index,
                    measurement_name: measurement_name.clone(),
                    channel_name,
                    info: pair_info(group, channel, master),
                });
            }
        }
        pairs
    }

    fn decode(
        &mut self,
        group_index: usize,
        channel_index: usize,
    ) -> Result<RawSamples, ReaderError> {
        let group = self
            .index
            .channel_groups
            .get(group_index)
            .ok_or_else(|| format!("no channel group at index {group_index}"))?;
        let master = master_channel(group).ok_or("channel group has no master time channel")?;

        let time = self
            .index
            .read_channel_values(group_index, master, &mut self.ranges)?
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_ref()
                    .and_then(DecodedValue::as_f64)
                    .ok_or_else(|| format!("master channel sample {i} is invalid"))
            })
            .collect::<Result<Vec<f64>, String>>()?;

        let data = if channel_index == master {
            time.clone()
        } else {
            self.index
                .read_channel_values(group_index, channel_index, &mut self.ranges)?
                .into_iter()
                .map(|v| v.as_ref().and_then(DecodedValue::as_f64).unwrap_or(f64::NAN))
                .collect()
        };

        Ok(RawSamples::new(time, data))
    }
}

fn master_channel(group: &IndexedChannelGroup) -> Option<usize> {
    group
        .channels
        .iter()
        .position(|c| c.channel_type == CHANNEL_TYPE_MASTER)
}

fn pair_info(
    group: &IndexedChannelGroup,
    channel: &IndexedChannel,
    master: Option<usize>,
) -> Result<PairInfo, String> {
    if master.is_none() {
        return Err("channel group has no master time channel".into());
    }
    if channel.channel_type == CHANNEL_TYPE_VLSD {
        return Err("variable length signal data is not supported".into());
    }
    if !is_numeric(&channel.data_type) {
        return Err(format!("unsupported data type {:?}", channel.data_type));
    }
    if let Some(conversion) = channel.conversion.as_ref().filter(|c| produces_text(c)) {
        return Err(format!(
            "unsupported conversion {:?}: values are not numeric",
            conversion.conversion_type
        ));
    }
    if group.data_blocks.iter().any(|b| b.is_compressed) {
        return Err("compressed data blocks are not supported".into());
    }
    Ok(PairInfo {
        sample_count: group.record_count,
        unit: channel.unit.clone(),
    })
}

fn produces_text(conversion: &ConversionBlock) -> bool {
    matches!(
        conversion.conversion_type,
        ConversionType::ValueToText
            | ConversionType::RangeToText
            | ConversionType::TextToText
            | ConversionType::BitfieldText
    )
}

fn is_numeric(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::UnsignedIntegerLE
            | DataType::UnsignedIntegerBE
            | DataType::SignedIntegerLE
            | DataType::SignedIntegerBE
            | DataType::FloatLE
            | DataType::FloatBE
    )
}
