use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qaoa_apps::{brute_force_ground_state, DiagonalPolicy, SherringtonKirkpatrick};
use qaoa_core::RngHandle;

fn generation_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("sk_generation");
    for nodes in [16usize, 64, 256] {
        let generator = SherringtonKirkpatrick::new(nodes);
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &generator, |b, generator| {
            let mut rng = RngHandle::from_seed(7);
            b.iter(|| black_box(generator.run(&mut rng).unwrap()));
        });
    }
    group.finish();
}

fn ground_state_bench(c: &mut Criterion) {
    let graph = SherringtonKirkpatrick::new(16)
        .with_diagonal(DiagonalPolicy::Zero)
        .run(&mut RngHandle::from_seed(7))
        .unwrap();
    c.bench_function("brute_force_ground_state_16", |b| {
        b.iter(|| black_box(brute_force_ground_state(black_box(&graph)).unwrap()));
    });
}

criterion_group!(benches, generation_bench, ground_state_bench);
criterion_main!(benches);
