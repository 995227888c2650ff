//! Criterion benchmarks for the tournament solver.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_tournament::{SearchConfig, Solver, TournamentConfig};

fn config(participants: usize, resources: usize, timeslots: usize, matches: usize) -> TournamentConfig {
    TournamentConfig::default()
        .with_participants(participants)
        .with_resources(resources)
        .with_timeslots(timeslots)
        .with_matches(matches)
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);

    for (n, r, t, m) in [(4usize, 2usize, 4usize, 2usize), (8, 4, 6, 3), (12, 6, 8, 4)] {
        let solver = Solver::new(SearchConfig::default());
        group.bench_with_input(
            BenchmarkId::new(format!("n{}_r{}_t{}_m{}", n, r, t, m), n),
            &config(n, r, t, m),
            |b, config| {
                b.iter(|| {
                    let report = solver.solve(black_box(config));
                    black_box(report)
                })
            },
        );
    }
    group.finish();
}

fn bench_seeded(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_seeded");
    group.sample_size(10);

    let config = TournamentConfig::default();
    for seed in [1u64, 7, 42] {
        let solver = Solver::new(SearchConfig::default().with_seed(seed));
        group.bench_with_input(BenchmarkId::from_parameter(seed), &config, |b, config| {
            b.iter(|| black_box(solver.solve(black_box(config))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_solve, bench_seeded);
criterion_main!(benches);
