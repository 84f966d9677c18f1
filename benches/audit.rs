//! Sampling and uniformity-suite benchmarks.
//!
//! Typical usage: 500 samples of 32 symbols over the 94-symbol set.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use paranoid_audit::analysis::{AuditThresholds, BirthdayBound, DuplicateReport, UniformityReport};
use paranoid_audit::sampler::{Alphabet, CharsetPreset, Sampler};
use paranoid_audit::source::SeededByteSource;

const BATCH_SIZE: usize = 500;
const LENGTH: usize = 32;

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler/generate");
    let alphabet = Alphabet::preset(CharsetPreset::Full);

    group.throughput(Throughput::Elements(LENGTH as u64));

    group.bench_function("seeded_32", |b| {
        let mut sampler = Sampler::new(SeededByteSource::from_u64(1));
        b.iter(|| black_box(sampler.generate(black_box(LENGTH), &alphabet).unwrap()));
    });

    group.bench_function("os_32", |b| {
        let mut sampler = Sampler::from_os();
        b.iter(|| black_box(sampler.generate(black_box(LENGTH), &alphabet).unwrap()));
    });

    group.finish();
}

fn bench_uniformity(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis/uniformity");
    let alphabet = Alphabet::preset(CharsetPreset::Full);
    let batch = Sampler::new(SeededByteSource::from_u64(7))
        .generate_batch(BATCH_SIZE, LENGTH, &alphabet)
        .unwrap();
    let thresholds = AuditThresholds::default();

    group.throughput(Throughput::Elements((BATCH_SIZE * LENGTH) as u64));

    group.bench_function("report_500x32", |b| {
        b.iter(|| black_box(UniformityReport::analyze(black_box(&batch), &alphabet, &thresholds)));
    });

    group.bench_function("duplicates_500", |b| {
        b.iter(|| black_box(DuplicateReport::scan(black_box(&batch))));
    });

    group.finish();
}

fn bench_birthday(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis/birthday");

    group.bench_function("exact_999", |b| {
        b.iter(|| black_box(BirthdayBound::compute(94, 32, black_box(999))));
    });

    group.bench_function("approx_1e9", |b| {
        b.iter(|| black_box(BirthdayBound::compute(94, 32, black_box(1_000_000_000))));
    });

    group.finish();
}

criterion_group!(benches, bench_sampling, bench_uniformity, bench_birthday);
criterion_main!(benches);
