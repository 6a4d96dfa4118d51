//! Benchmarks for time slicing, masking, and segment discovery.
//!
//! Run with: cargo bench --bench slice_benchmark

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use enginemdf::{
    Channel, EngineConfig, EngineMdf, MeasurementReader, PairInfo, RawPair, RawSamples,
    error::ReaderError,
};

/// Synthetic file: `groups` groups of `channels` channels, all named alike so
/// every group after the first collides.
struct SyntheticReader {
    groups: usize,
    channels: usize,
    samples: usize,
}

impl MeasurementReader for SyntheticReader {
    fn enumerate(&self) -> Vec<RawPair> {
        (0..self.groups)
            .flat_map(|g| {
                (0..self.channels).map(move |c| RawPair {
                    group_index: g,
                    channel_index: c,
                    measurement_name: "RecResult".to_string(),
                    channel_name: format!("ch{c}"),
                    info: Ok(PairInfo {
                        sample_count: self.samples as u64,
                        unit: Some("V".to_string()),
                    }),
                })
            })
            .collect()
    }

    fn decode(&mut self, _group: usize, channel: usize) -> Result<RawSamples, ReaderError> {
        let time: Vec<f64> = (0..self.samples).map(|i| i as f64 * 0.01).collect();
        let data = time.iter().map(|t| (t + channel as f64).sin()).collect();
        Ok(RawSamples::new(time, data))
    }
}

fn signal(samples: usize) -> Channel {
    let time: Vec<f64> = (0..samples).map(|i| i as f64 * 0.001).collect();
    let data: Vec<f64> = time.iter().map(|t| (t * 50.0).sin()).collect();
    Channel::new("signal", time, data, "V").unwrap()
}

fn bench_time_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_slice");
    for samples in [1_000usize, 100_000, 1_000_000] {
        let channel = signal(samples);
        let end = channel.t_end().unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(samples), &channel, |b, ch| {
            b.iter(|| ch.time_slice(black_box(end * 0.25), black_box(end * 0.75)))
        });
    }
    group.finish();
}

fn bench_mask(c: &mut Criterion) {
    let channel = signal(100_000);
    c.bench_function("mask_positive_100k", |b| {
        b.iter(|| channel.mask(|_, _, v| black_box(v) > 0.0))
    });
}

fn bench_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery");
    for groups in [10usize, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(groups), &groups, |b, &groups| {
            b.iter(|| {
                let reader = SyntheticReader {
                    groups,
                    channels: 20,
                    samples: 1_000,
                };
                EngineMdf::from_reader(reader, EngineConfig::default()).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_materialize(c: &mut Criterion) {
    c.bench_function("get_channel_uncached", |b| {
        let reader = SyntheticReader {
            groups: 1,
            channels: 4,
            samples: 10_000,
        };
        let mut engine =
            EngineMdf::from_reader(reader, EngineConfig::default().with_cache(false)).unwrap();
        b.iter(|| engine.get_channel(black_box("RecResult/ch2")).unwrap())
    });
}

criterion_group!(
    benches,
    bench_time_slice,
    bench_mask,
    bench_discovery,
    bench_materialize
);
criterion_main!(benches);
