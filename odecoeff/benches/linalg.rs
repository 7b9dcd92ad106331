use criterion::{black_box, criterion_group, criterion_main, Criterion};
use odecoeff::linalg::solve;

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("linalg::solve");
    for n in [1usize, 2, 3, 4, 5, 6] {
        let a: Vec<f64> = (0..n * n)
            .map(|idx| if idx % (n + 1) == 0 { 2.0 } else { 0.1 })
            .collect();
        let b: Vec<f64> = (0..n).map(|i| (i + 1) as f64).collect();
        group.bench_function(format!("n={n}"), |bencher| {
            bencher.iter(|| solve(black_box(n), black_box(&a), black_box(&b)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
