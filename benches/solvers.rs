//! Criterion benchmarks for the solvers and generators.
//!
//! Run with:
//!   cargo bench --bench solvers

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use mazelab::{
    generators::{GenerateOptions, Generator, generate_grid, generate_maze},
    heuristics::Heuristic,
    maze::Maze,
    rng::MazeRng,
    solvers::{Algorithm, solve_maze},
};

fn make_maze(generator: Generator, size: u16, seed: u64) -> Maze {
    generate_maze(
        generator,
        size,
        size,
        &mut MazeRng::new(seed),
        &mut MazeRng::new(seed ^ 1),
        GenerateOptions::default(),
    )
    .expect("benchmark maze")
}

/// Every algorithm on the same mazes of growing size.
fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");

    for size in [16u16, 64, 128] {
        let maze = make_maze(Generator::Prim, size, 42);
        for algorithm in Algorithm::ALL {
            let heuristic = algorithm.requires_heuristic().then_some(Heuristic::Manhattan);
            group.bench_with_input(
                BenchmarkId::new(algorithm.name(), size),
                &maze,
                |b, maze| b.iter(|| black_box(solve_maze(maze, algorithm, heuristic).node_expansions)),
            );
        }
    }

    group.finish();
}

fn bench_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for generator in Generator::ALL {
        group.bench_function(BenchmarkId::new(generator.name(), 128), |b| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                black_box(generate_grid(generator, 128, 128, &mut MazeRng::new(seed)).map(|g| g.passage_count()))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_solvers, bench_generators);
criterion_main!(benches);
