use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use depot::{
    Configuration, FileSystem, Filter, FilterResult, Invocation, Next, Outcome, execute, filters,
};
use std::hint::black_box;

// ============================================================================
// Benchmark: Chain composition overhead
// ============================================================================

fn passthrough(i: usize) -> Filter {
    Filter::new(format!("pass-{i}"), |invocation: Invocation, next: Next<'_>| next.run(invocation))
}

fn bench_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_depth");
    let terminal = |_invocation: Invocation| -> FilterResult { Ok(Outcome::Flag(true)) };

    for depth in [0usize, 1, 4, 16] {
        let chain: Vec<Filter> = (0..depth).map(passthrough).collect();
        group.bench_with_input(BenchmarkId::from_parameter(depth), &chain, |b, chain| {
            b.iter(|| black_box(execute(chain, Invocation::exists("f"), &terminal).unwrap()));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Facade dispatch against the in-memory adapter
// ============================================================================

fn bench_facade(c: &mut Criterion) {
    let mut group = c.benchmark_group("facade");

    let fs = FileSystem::new();
    fs.define("bare", Configuration::new("memory")).unwrap();
    fs.define(
        "filtered",
        Configuration::new("memory").filters([
            filters::validate(),
            filters::max_size(1 << 20),
            filters::prefix("tenant"),
        ]),
    )
    .unwrap();
    let payload = vec![7u8; 1024];

    for name in ["bare", "filtered"] {
        fs.write(name, "f.bin", payload.clone()).unwrap();
        group.bench_function(BenchmarkId::new("read", name), |b| {
            b.iter(|| black_box(fs.read(name, "f.bin").unwrap()));
        });
        group.bench_function(BenchmarkId::new("exists", name), |b| {
            b.iter(|| black_box(fs.exists(name, "f.bin").unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chain_depth, bench_facade);

criterion_main!(benches);
