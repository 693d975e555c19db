//! Primitive codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fieldstore_bench::random_text;
use fieldstore_codec::{DataReader, DataWriter};

/// Benchmark VInt encoding across byte widths.
fn bench_vint(c: &mut Criterion) {
    let mut group = c.benchmark_group("vint");

    for value in [0u64, 127, 16_383, 2_097_151, u64::from(u32::MAX)] {
        group.bench_with_input(BenchmarkId::new("encode", value), &value, |b, &value| {
            let mut writer = DataWriter::with_capacity(16);
            b.iter(|| {
                writer.clear();
                writer.write_vint(black_box(value));
                black_box(writer.len());
            });
        });

        let mut encoded = DataWriter::new();
        encoded.write_vint(value);
        let bytes = encoded.into_bytes();
        group.bench_with_input(BenchmarkId::new("decode", value), &bytes, |b, bytes| {
            b.iter(|| {
                let mut reader = DataReader::new(black_box(bytes));
                black_box(reader.read_vint().unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark string encoding, which counts characters before writing.
fn bench_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("string");

    for len in [16, 256, 4096] {
        let ascii = random_text(len);
        let multibyte: String = ascii.chars().map(|c| if c.is_ascii_digit() { 'é' } else { c }).collect();

        group.throughput(Throughput::Bytes(ascii.len() as u64));
        group.bench_with_input(BenchmarkId::new("ascii", len), &ascii, |b, text| {
            let mut writer = DataWriter::with_capacity(len * 2);
            b.iter(|| {
                writer.clear();
                writer.write_string(black_box(text));
            });
        });

        group.throughput(Throughput::Bytes(multibyte.len() as u64));
        group.bench_with_input(BenchmarkId::new("multibyte", len), &multibyte, |b, text| {
            let mut writer = DataWriter::with_capacity(len * 2);
            b.iter(|| {
                writer.clear();
                writer.write_string(black_box(text));
            });
        });

        let mut encoded = DataWriter::new();
        encoded.write_string(&multibyte);
        let bytes = encoded.into_bytes();
        group.bench_with_input(BenchmarkId::new("decode", len), &bytes, |b, bytes| {
            b.iter(|| {
                let mut reader = DataReader::new(black_box(bytes));
                black_box(reader.read_string().unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_vint, bench_string);
criterion_main!(benches);
