use mazelab::{
    generators::{GenerateOptions, Generator, generate_maze},
    heuristics::Heuristic,
    metrics::solve_timed,
    rng::{GENERATION_STREAM, MazeRng, PLACEMENT_STREAM},
    solvers::Algorithm,
};

/// Repeatedly solves one large maze so a profiler has a steady workload.
///
/// Usage: `profile [iterations] [algorithm] [generator]`
fn main() -> anyhow::Result<()> {
    let mut args = std::env::args();
    args.next(); // Skip executable name
    let num_iters = args.next().and_then(|s| s.parse::<usize>().ok()).unwrap_or(1);
    let algorithm = match args.next() {
        Some(name) => name.parse::<Algorithm>()?,
        None => Algorithm::AStar,
    };
    let generator = match args.next() {
        Some(name) => name.parse::<Generator>()?,
        None => Generator::Prim,
    };
    let heuristic = algorithm.requires_heuristic().then_some(Heuristic::Manhattan);

    let (width, height) = (u8::MAX as u16, u8::MAX as u16);
    let seed = 0;
    let maze = generate_maze(
        generator,
        width,
        height,
        &mut MazeRng::for_stream(seed, GENERATION_STREAM),
        &mut MazeRng::for_stream(seed, PLACEMENT_STREAM),
        GenerateOptions::default(),
    )?;

    let mut total_ms = 0.0;
    let mut expansions = 0;
    for _ in 0..num_iters {
        let (trace, runtime_ms) = solve_timed(&maze, algorithm, heuristic);
        total_ms += runtime_ms;
        expansions = trace.node_expansions;
    }
    println!(
        "{} on {} {}x{}: {} iterations, {:.3} ms/solve, {} expansions",
        algorithm.name(),
        generator.name(),
        width,
        height,
        num_iters,
        total_ms / num_iters.max(1) as f64,
        expansions
    );
    Ok(())
}
