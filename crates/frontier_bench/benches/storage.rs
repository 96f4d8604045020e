//! Storage benchmarks: raw backends and table log writes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use frontier_bench::random_data;
use frontier_core::{Config, Database, DatabaseConfig};
use frontier_storage::{FileBackend, InMemoryBackend, StorageBackend};
use tempfile::TempDir;

fn bench_inmemory_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("inmemory_append");

    for size in [64, 256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut backend = InMemoryBackend::new();
            let data = random_data(size);
            b.iter(|| black_box(backend.append(black_box(&data)).unwrap()));
        });
    }

    group.finish();
}

fn bench_file_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_append");
    group.sample_size(50);

    for size in [64, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let mut backend = FileBackend::open(&dir.path().join("bench.log")).unwrap();
            let data = random_data(size);
            b.iter(|| {
                backend.append(black_box(&data)).unwrap();
                backend.flush().unwrap();
            });
        });
    }

    group.finish();
}

/// Auto-commit puts through the table log, direct and deferred.
fn bench_table_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_put");
    let modes = [
        ("direct", DatabaseConfig::default()),
        (
            "deferred",
            DatabaseConfig {
                transactional: false,
                deferred_write: true,
            },
        ),
    ];

    for (mode, table_config) in modes {
        group.bench_function(mode, |b| {
            let db = Database::open(
                "bench",
                Box::new(InMemoryBackend::new()),
                table_config,
                &Config::default(),
            )
            .unwrap();
            let value = random_data(96);
            let mut key = 0u32;
            b.iter(|| {
                key = key.wrapping_add(1);
                db.put(&key.to_be_bytes(), black_box(&value)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let backend = InMemoryBackend::new();
    {
        let db = Database::open(
            "bench",
            Box::new(backend.clone()),
            DatabaseConfig::default(),
            &Config::default(),
        )
        .unwrap();
        for key in 0u32..10_000 {
            db.put(&key.to_be_bytes(), &random_data(64)).unwrap();
        }
        db.close().unwrap();
    }

    c.bench_function("replay_10k", |b| {
        b.iter(|| {
            let db = Database::open(
                "bench",
                Box::new(backend.clone()),
                DatabaseConfig::default(),
                &Config::default(),
            )
            .unwrap();
            black_box(db.count().unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_inmemory_append,
    bench_file_append,
    bench_table_put,
    bench_replay
);
criterion_main!(benches);
