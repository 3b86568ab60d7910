use std::{fs::File, io::Write, path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Parser, ValueEnum};

use mazelab::{
    experiment::{ExperimentConfig, run_batch, trial_seed},
    generators::{Generator, generate_maze},
    heuristics::Heuristic,
    logging,
    maze::{Connectivity, Placement},
    rng::{GENERATION_STREAM, MazeRng, PLACEMENT_STREAM},
    sink::{CsvSink, JsonlSink, MetricsSink},
    solvers::{Algorithm, solve_maze},
};

/// Generate mazes, run pathfinding algorithms over them and record metrics
/// as JSON lines or CSV.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze generators: dfs_backtracker, prim
    #[arg(short, long, value_delimiter = ',', default_value = "dfs_backtracker,prim")]
    generators: Vec<Generator>,

    /// Algorithms: bfs, dijkstra, a_star, bidirectional_a_star
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "bfs,dijkstra,a_star,bidirectional_a_star"
    )]
    algorithms: Vec<Algorithm>,

    /// Heuristics for the A* variants: manhattan, euclidean, octile
    #[arg(long, value_delimiter = ',', default_value = "manhattan")]
    heuristics: Vec<Heuristic>,

    /// Maze sizes as WIDTHxHEIGHT
    #[arg(short, long, value_delimiter = ',', value_parser = parse_size, default_value = "20x20")]
    sizes: Vec<(u16, u16)>,

    /// Trials per variant
    #[arg(short, long, default_value_t = 10)]
    trials: u32,

    /// Base of every trial seed; random when omitted
    #[arg(long)]
    seed_base: Option<u64>,

    /// Movement model: 4 or 8
    #[arg(short, long, default_value = "4")]
    connectivity: Connectivity,

    /// Start/goal placement: corners or random
    #[arg(short, long, default_value = "corners")]
    placement: Placement,

    /// Worker threads
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// Per-trial budget in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Record output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Record format. csv keeps scalar columns only, no paths or visit orders
    #[arg(short, long, value_enum, default_value_t = Format::Jsonl)]
    format: Format,

    /// Also append logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the first maze of every size with its path
    #[arg(long)]
    ascii: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Jsonl,
    Csv,
}

fn open_sink(format: Format, writer: Box<dyn Write + Send>) -> Box<dyn MetricsSink> {
    match format {
        Format::Jsonl => Box::new(JsonlSink::new(writer)),
        Format::Csv => Box::new(CsvSink::new(writer)),
    }
}

fn parse_size(s: &str) -> Result<(u16, u16), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u16>()
            .map_err(|e| format!("bad dimension '{v}' in '{s}': {e}"))
    };
    Ok((parse(w)?, parse(h)?))
}

impl Args {
    fn to_config(&self, seed_base: u64) -> ExperimentConfig {
        ExperimentConfig {
            generators: self.generators.clone(),
            algorithms: self.algorithms.clone(),
            heuristics: self.heuristics.clone(),
            sizes: self.sizes.clone(),
            trials: self.trials,
            seed_base,
            connectivity: self.connectivity,
            placement: self.placement,
            workers: self.workers,
            trial_timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }

    /// stdout is free for the summary and ASCII mazes once records go to a file.
    fn stdout_free(&self) -> bool {
        self.output.is_some()
    }
}

/// Regenerates trial 0 of every size with the first generator and algorithm
/// and renders it with its path.
fn print_ascii(config: &ExperimentConfig, stdout_free: bool) -> anyhow::Result<()> {
    let (Some(&generator), Some(&algorithm)) = (config.generators.first(), config.algorithms.first()) else {
        return Ok(());
    };
    let heuristic = algorithm
        .requires_heuristic()
        .then(|| config.heuristics.first().copied())
        .flatten();
    for &(width, height) in &config.sizes {
        let seed = trial_seed(config.seed_base, 0, width, height);
        let maze = generate_maze(
            generator,
            width,
            height,
            &mut MazeRng::for_stream(seed, GENERATION_STREAM),
            &mut MazeRng::for_stream(seed, PLACEMENT_STREAM),
            config.generate_options(),
        )
        .with_context(|| format!("regenerating {width}x{height} maze"))?;
        let trace = solve_maze(&maze, algorithm, heuristic);
        let text = format!(
            "\n=== {width}x{height} trial 0 seed={seed} gen={} alg={} ===\n{}",
            generator.name(),
            algorithm.name(),
            maze.render_with_path(&trace.path)
        );
        if stdout_free {
            println!("{text}");
        } else {
            eprintln!("{text}");
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = logging::init(&args.log_level, args.log_file.as_deref())?;

    let seed_base = args.seed_base.unwrap_or_else(rand::random);
    tracing::info!("Using seed base {}", seed_base);
    let config = args.to_config(seed_base);
    config.validate().context("invalid experiment configuration")?;

    let writer: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating output file {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    let sink = open_sink(args.format, writer);
    let summary = run_batch(&config, sink.as_ref())?;
    if let Some(path) = &args.output {
        tracing::info!("Wrote {:?} records to {}", args.format, path.display());
    }

    let stdout_free = args.stdout_free();
    if args.ascii {
        print_ascii(&config, stdout_free)?;
    }
    if stdout_free {
        println!("{summary}");
    } else {
        eprintln!("{summary}");
    }
    Ok(())
}
