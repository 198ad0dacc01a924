//! Write, load, and lookup benchmarks for table files.
//!
//! Dictionaries hold random keys and values of 20 to 1000 bytes.
//!
//! Run with:
//! ```bash
//! cargo bench --bench table
//! ```

#![allow(clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sstable_core::{Dictionary, Table, TableConfig, TableWriter, load_index};
use sstable_test_utils::{absent_key, random_dictionary, scratch_dir};
use std::hint::black_box;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SIZES: [usize; 2] = [10_000, 100_000];

fn writer() -> TableWriter {
    TableWriter::new(TableConfig::new().with_sync_on_write(false))
}

/// Write a table of `n` random pairs, returning the dictionary it holds
fn prepare(n: usize) -> (TempDir, PathBuf, Dictionary) {
    let dir = scratch_dir().expect("Failed to create benchmark directory");
    let path = dir.path().join(format!("bench-{n}.sst"));
    let mut dict = random_dictionary(n, n as u64);
    writer()
        .write(&path, &mut dict)
        .expect("Failed to write benchmark table");
    (dir, path, dict)
}

fn open_live(path: &Path) -> Table {
    let table = Table::open(path);
    assert!(table.wait_ready().is_live(), "benchmark table failed to load");
    table
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    group.sample_size(10);

    for n in SIZES {
        let dir = scratch_dir().expect("Failed to create benchmark directory");
        let path = dir.path().join("write.sst");
        let dict = random_dictionary(n, n as u64);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &dict, |b, dict| {
            b.iter_batched(
                || dict.clone(),
                |mut dict| {
                    writer()
                        .write(&path, &mut dict)
                        .expect("Failed to write benchmark table")
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    group.sample_size(10);

    for n in SIZES {
        let (_dir, path, _) = prepare(n);

        group.bench_with_input(BenchmarkId::new("sync", n), &path, |b, path| {
            b.iter(|| black_box(load_index(path).expect("Failed to load index")));
        });
        group.bench_with_input(BenchmarkId::new("open_ready", n), &path, |b, path| {
            b.iter(|| black_box(open_live(path)));
        });
    }

    group.finish();
}

fn bench_read_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_hit");

    for n in SIZES {
        let (_dir, path, dict) = prepare(n);
        let table = open_live(&path);
        let keys: Vec<&[u8]> = dict.iter().map(|kv| kv.key.as_slice()).collect();

        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            let mut i = 0;
            b.iter(|| {
                let key = keys[i % keys.len()];
                i += 1;
                black_box(table.get(black_box(key)).expect("Lookup failed"))
            });
        });
    }

    group.finish();
}

fn bench_read_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_miss");

    for n in SIZES {
        let (_dir, path, dict) = prepare(n);
        let table = open_live(&path);
        let misses: Vec<Vec<u8>> = (0..64).map(|seed| absent_key(&dict, seed)).collect();

        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            let mut i = 0;
            b.iter(|| {
                let key = &misses[i % misses.len()];
                i += 1;
                black_box(table.get(black_box(key)).expect("Lookup failed"))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_write,
    bench_load,
    bench_read_hit,
    bench_read_miss
);
criterion_main!(benches);
