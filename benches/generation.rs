use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use delve::generation::utils::create_rng;
use delve::{flood_fill, generate_level, Depth, Direction, GameState};

fn bench_generate_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_level");
    for level in [1u32, 13, 26] {
        let depth = Depth::new(level).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(level), &depth, |b, &depth| {
            let mut seed = 0u64;
            b.iter(|| {
                seed += 1;
                generate_level(black_box(depth), &mut create_rng(seed))
            });
        });
    }
    group.finish();
}

fn bench_flood_fill(c: &mut Criterion) {
    let level = generate_level(Depth::LAST, &mut create_rng(7));
    c.bench_function("flood_fill", |b| {
        b.iter(|| flood_fill(black_box(&level.grid), level.player_start))
    });
}

fn bench_resolve_move(c: &mut Criterion) {
    c.bench_function("resolve_move", |b| {
        b.iter_batched(
            || GameState::new(42),
            |mut state| {
                for direction in Direction::ALL {
                    state.resolve_move(direction);
                }
                state
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_generate_level, bench_flood_fill, bench_resolve_move);
criterion_main!(benches);
