use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use depot_storage::{Adapter, DirOptions, LocalAdapter, MemoryAdapter};
use std::hint::black_box;
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Benchmark: Existence checks (path normalization + stat)
// ============================================================================

fn bench_exists(c: &mut Criterion) {
    let mut group = c.benchmark_group("exists");

    let temp = TempDir::new().unwrap();
    let local = LocalAdapter::builder().root(temp.path()).build().unwrap();
    local.write("foo/bar/baz/test.dat", b"x").unwrap();
    let memory = MemoryAdapter::default();
    memory.write("foo/bar/baz/test.dat", b"x").unwrap();

    group.bench_function("local_nested_hit", |b| {
        b.iter(|| black_box(local.exists("/foo/bar/baz/test.dat").unwrap()));
    });
    group.bench_function("local_miss", |b| {
        b.iter(|| black_box(local.exists("missing.dat").unwrap()));
    });
    group.bench_function("memory_nested_hit", |b| {
        b.iter(|| black_box(memory.exists("/foo/bar/baz/test.dat").unwrap()));
    });

    group.finish();
}

// ============================================================================
// Benchmark: File I/O Operations
// ============================================================================

fn bench_file_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_operations");
    group.measurement_time(Duration::from_secs(10));

    let temp = TempDir::new().unwrap();
    let local = LocalAdapter::builder().root(temp.path()).build().unwrap();
    let memory = MemoryAdapter::default();

    let sizes = [("1KB", 1024), ("10KB", 10 * 1024), ("100KB", 100 * 1024)];

    for (name, size) in sizes {
        let data: Vec<u8> = (0..size).map(|i| u8::try_from(i % 256).unwrap()).collect();
        group.throughput(Throughput::Bytes(u64::try_from(size).unwrap_or(u64::MAX)));

        group.bench_with_input(BenchmarkId::new("local_write", name), &data, |b, data| {
            b.iter(|| local.write(&format!("bench_{name}.dat"), data).unwrap());
        });

        local.write(&format!("read_bench_{name}.dat"), &data).unwrap();
        group.bench_function(BenchmarkId::new("local_read", name), |b| {
            b.iter(|| black_box(local.read(&format!("read_bench_{name}.dat")).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("memory_write", name), &data, |b, data| {
            b.iter(|| memory.write(&format!("bench_{name}.dat"), data).unwrap());
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Directory creation
// ============================================================================

fn bench_make_dir(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_dir");

    let temp = TempDir::new().unwrap();
    let local = LocalAdapter::builder().root(temp.path()).build().unwrap();
    local.make_dir("a/b/c", DirOptions::default()).unwrap();

    group.bench_function("existing_dir", |b| {
        b.iter(|| black_box(local.make_dir("a/b/c", DirOptions::default()).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_exists, bench_file_operations, bench_make_dir);

criterion_main!(benches);
