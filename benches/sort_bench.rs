//! Sort throughput benchmarks: all-in-memory versus forced spilling.

use std::cmp::Ordering;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use spillsort_core::options::SortOptions;
use spillsort_core::stream::collect;
use spillsort_engine::Sorter;
use spillsort_io::ScratchDir;

fn cmp(a: &(u64, u64), b: &(u64, u64)) -> Ordering {
    a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1))
}

fn shuffled(n: u64) -> Vec<u64> {
    let mut v: Vec<u64> = (0..n).collect();
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for i in (1..v.len()).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let j = (state % (i as u64 + 1)) as usize;
        v.swap(i, j);
    }
    v
}

fn sort_all(opts: SortOptions, dir: Arc<ScratchDir>, keys: &[u64]) -> Vec<(u64, u64)> {
    let mut sorter: Sorter<u64, u64, fn(&(u64, u64), &(u64, u64)) -> Ordering> =
        Sorter::new(opts, cmp, ((), ()), dir).expect("valid options");
    for &k in keys {
        sorter.add(k, k ^ 0xff).expect("add");
    }
    let mut iter = sorter.done().expect("done");
    collect(iter.as_mut()).expect("drain")
}

fn bench_in_memory(c: &mut Criterion) {
    let keys = shuffled(100_000);
    let tmp = tempfile::tempdir().expect("temp dir");

    let mut group = c.benchmark_group("sort/in_memory");
    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("100k_pairs", |b| {
        b.iter_batched(
            || {
                Arc::new(
                    ScratchDir::new(tmp.path().join("mem")).expect("scratch dir"),
                )
            },
            |dir| sort_all(SortOptions::default(), dir, &keys),
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn bench_spilling(c: &mut Criterion) {
    let keys = shuffled(100_000);
    let tmp = tempfile::tempdir().expect("temp dir");

    // 64 KiB budget over 1.6 MB of records forces roughly 25 spills.
    let opts = SortOptions::new()
        .with_max_memory_usage_bytes(64 * 1024)
        .with_ext_sort_allowed(true);

    let mut group = c.benchmark_group("sort/spilling");
    group.throughput(Throughput::Elements(keys.len() as u64));
    group.sample_size(20);
    group.bench_function("100k_pairs_64k_budget", |b| {
        b.iter_batched(
            || {
                Arc::new(
                    ScratchDir::new(tmp.path().join("spill")).expect("scratch dir"),
                )
            },
            |dir| sort_all(opts.clone(), dir, &keys),
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_in_memory, bench_spilling);
criterion_main!(benches);
