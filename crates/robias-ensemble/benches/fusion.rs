use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use robias_ensemble::{BordaWeights, borda_fuse};

/// Deterministic permutation of `0..n`; `step` must be coprime to `n`.
fn scrambled(n: usize, step: usize) -> Vec<usize> {
    (0..n).map(|i| (i * step) % n).collect()
}

fn bench_borda(c: &mut Criterion) {
    let mut group = c.benchmark_group("fusion.borda");

    // The neural ranker pads to 200 sentence slots; linear rankings vary.
    for sentences in [50_usize, 200, 1_000] {
        let neural = scrambled(200, 7);
        let linear = scrambled(sentences, 13);
        group.throughput(Throughput::Elements(sentences.min(200) as u64));
        group.bench_with_input(
            BenchmarkId::new("neural200_vs_linear", sentences),
            &(neural, linear),
            |b, (neural, linear)| b.iter(|| black_box(borda_fuse(neural, linear, BordaWeights::default()))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_borda);
criterion_main!(benches);
