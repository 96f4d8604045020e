//! Work item codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use frontier_bench::generate_items;
use frontier_core::{decode_record, encode_key, encode_record, DocId};

fn bench_encode_key(c: &mut Criterion) {
    c.bench_function("encode_key", |b| {
        let mut id = 0;
        b.iter(|| {
            id += 1;
            black_box(encode_key(black_box(2), black_box(300), DocId::new(id)))
        });
    });
}

fn bench_encode_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_record");
    for count in [1, 100, 1000].iter() {
        let items = generate_items(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
            b.iter(|| {
                for item in items {
                    black_box(encode_record(black_box(item)).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn bench_decode_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_record");
    for count in [1, 100, 1000].iter() {
        let records: Vec<Vec<u8>> = generate_items(*count)
            .iter()
            .map(|item| encode_record(item).unwrap())
            .collect();
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter(|| {
                for record in records {
                    black_box(decode_record(black_box(record)).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn bench_non_ascii_strings(c: &mut Criterion) {
    let item = generate_items(1)
        .remove(0)
        .with_anchor("Größe \u{0} 漢字 \u{1F600}".repeat(20));
    let record = encode_record(&item).unwrap();

    let mut group = c.benchmark_group("non_ascii");
    group.bench_function("encode", |b| b.iter(|| black_box(encode_record(&item).unwrap())));
    group.bench_function("decode", |b| b.iter(|| black_box(decode_record(&record).unwrap())));
    group.finish();
}

criterion_group!(
    benches,
    bench_encode_key,
    bench_encode_record,
    bench_decode_record,
    bench_non_ascii_strings
);
criterion_main!(benches);
