//! Experiment runner: enumerates trial variants, runs them and streams
//! records to a sink.

use serde::{Deserialize, Serialize};
use std::{
    panic::AssertUnwindSafe,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    time::Duration,
};

use crate::error::{MazeError, Result};
use crate::generators::{GenerateOptions, Generator, generate_maze_until};
use crate::heuristics::Heuristic;
use crate::maze::{Connectivity, Placement};
use crate::metrics::{RunSummary, SearchResult, TrialRecord, TrialSpec, solve_timed_until};
use crate::rng::{GENERATION_STREAM, MazeRng, PLACEMENT_STREAM};
use crate::sink::MetricsSink;
use crate::solvers::{Algorithm, SearchStatus};

/// A fully resolved experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub generators: Vec<Generator>,
    pub algorithms: Vec<Algorithm>,
    /// Used by the A* variants only.
    pub heuristics: Vec<Heuristic>,
    /// `(width, height)` pairs.
    pub sizes: Vec<(u16, u16)>,
    pub trials: u32,
    pub seed_base: u64,
    pub connectivity: Connectivity,
    pub placement: Placement,
    pub workers: usize,
    /// Wall-clock budget per trial, unlimited when `None`.
    pub trial_timeout: Option<Duration>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            generators: Generator::ALL.to_vec(),
            algorithms: Algorithm::ALL.to_vec(),
            heuristics: vec![Heuristic::Manhattan],
            sizes: vec![(20, 20)],
            trials: 10,
            seed_base: 0,
            connectivity: Connectivity::Four,
            placement: Placement::Corners,
            workers: 1,
            trial_timeout: None,
        }
    }
}

/// Seed shared by every algorithm for the same size and trial index, so all
/// of them run on identical mazes.
pub fn trial_seed(seed_base: u64, trial_index: u32, width: u16, height: u16) -> u64 {
    seed_base
        .wrapping_add(trial_index as u64)
        .wrapping_add(width as u64 * 1000 + height as u64)
}

impl ExperimentConfig {
    /// Rejects configurations that cannot run or would void optimality.
    pub fn validate(&self) -> Result<()> {
        if self.generators.is_empty() {
            return Err(MazeError::invalid("no generators selected"));
        }
        if self.algorithms.is_empty() {
            return Err(MazeError::invalid("no algorithms selected"));
        }
        if self.sizes.is_empty() {
            return Err(MazeError::invalid("no maze sizes given"));
        }
        if let Some((w, h)) = self.sizes.iter().find(|(w, h)| *w == 0 || *h == 0) {
            return Err(MazeError::invalid(format!(
                "maze dimensions must be positive, got {w}x{h}"
            )));
        }
        if self.trials == 0 {
            return Err(MazeError::invalid("trials must be at least 1"));
        }
        if self.workers == 0 {
            return Err(MazeError::invalid("workers must be at least 1"));
        }
        if self.trial_timeout.is_some_and(|t| t.is_zero()) {
            return Err(MazeError::invalid("trial timeout must be positive"));
        }

        if let Some(algorithm) = self.algorithms.iter().find(|a| a.requires_heuristic()) {
            if self.heuristics.is_empty() {
                return Err(MazeError::invalid(format!(
                    "{} is selected but no heuristics are given",
                    algorithm.name()
                )));
            }
            for heuristic in &self.heuristics {
                heuristic.check_admissible(self.connectivity)?;
            }
        }
        Ok(())
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            connectivity: self.connectivity,
            placement: self.placement,
        }
    }

    /// `(algorithm, heuristic)` pairs: one per plain algorithm, one per
    /// heuristic for the A* variants.
    fn solver_variants(&self) -> Vec<(Algorithm, Option<Heuristic>)> {
        let mut variants = Vec::new();
        for &algorithm in &self.algorithms {
            if algorithm.requires_heuristic() {
                variants.extend(self.heuristics.iter().map(|&h| (algorithm, Some(h))));
            } else {
                variants.push((algorithm, None));
            }
        }
        variants
    }

    /// Every trial in generator, size, variant, trial-index order.
    pub fn trials(&self) -> impl Iterator<Item = TrialSpec> + '_ {
        let variants = self.solver_variants();
        self.generators.iter().flat_map(move |&generator| {
            let variants = variants.clone();
            self.sizes.iter().flat_map(move |&(width, height)| {
                variants
                    .clone()
                    .into_iter()
                    .flat_map(move |(algorithm, heuristic)| {
                        (0..self.trials).map(move |trial_index| TrialSpec {
                            generator,
                            algorithm,
                            heuristic,
                            width,
                            height,
                            seed: trial_seed(self.seed_base, trial_index, width, height),
                            trial_index,
                        })
                    })
            })
        })
    }

    pub fn trial_count(&self) -> usize {
        self.generators.len() * self.sizes.len() * self.solver_variants().len() * self.trials as usize
    }
}

/// Generates one maze from `seed` and solves it.
///
/// Carving and placement draw from separate sub-streams of `seed`.
pub fn run_trial(
    generator: Generator,
    algorithm: Algorithm,
    heuristic: Option<Heuristic>,
    width: u16,
    height: u16,
    seed: u64,
    options: GenerateOptions,
) -> Result<SearchResult> {
    let spec = TrialSpec {
        generator,
        algorithm,
        heuristic,
        width,
        height,
        seed,
        trial_index: 0,
    };
    run_spec(&spec, options, &AtomicBool::new(false))
}

fn run_spec(spec: &TrialSpec, options: GenerateOptions, cancel: &AtomicBool) -> Result<SearchResult> {
    spec.algorithm.check_heuristic(spec.heuristic)?;
    let mut rng = MazeRng::for_stream(spec.seed, GENERATION_STREAM);
    let mut placement_rng = MazeRng::for_stream(spec.seed, PLACEMENT_STREAM);
    let maze = generate_maze_until(
        spec.generator,
        spec.width,
        spec.height,
        &mut rng,
        &mut placement_rng,
        options,
        cancel,
    )?;
    let (trace, runtime_ms) = solve_timed_until(&maze, spec.algorithm, spec.heuristic, cancel);
    if trace.status == SearchStatus::Interrupted {
        return Err(MazeError::Interrupted);
    }
    Ok(SearchResult::new(spec, &maze, trace, runtime_ms))
}

/// Produces the result of one trial, giving up once the flag is raised.
type TrialFn = Arc<dyn Fn(&TrialSpec, &AtomicBool) -> Result<SearchResult> + Send + Sync>;

fn trial_fn(options: GenerateOptions) -> TrialFn {
    Arc::new(move |spec: &TrialSpec, cancel: &AtomicBool| run_spec(spec, options, cancel))
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("trial panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("trial panicked: {s}")
    } else {
        "trial panicked".to_string()
    }
}

/// Runs one trial, turning errors, panics and an expired budget into records.
///
/// With a budget the trial runs on its own thread. When the budget expires
/// its cancel flag is raised and the thread is joined before returning, so no
/// trial outlives its record.
fn execute(spec: TrialSpec, run: &TrialFn, timeout: Option<Duration>) -> TrialRecord {
    let outcome = match timeout {
        None => {
            let cancel = AtomicBool::new(false);
            std::panic::catch_unwind(AssertUnwindSafe(|| run(&spec, &cancel))).map_err(panic_message)
        }
        Some(budget) => {
            let cancel = Arc::new(AtomicBool::new(false));
            let (result_tx, result_rx) = mpsc::channel();
            let handle = {
                let cancel = Arc::clone(&cancel);
                let run = Arc::clone(run);
                std::thread::spawn(move || {
                    let _ = result_tx.send(run(&spec, cancel.as_ref()));
                })
            };
            let received = result_rx.recv_timeout(budget);
            if let Err(RecvTimeoutError::Timeout) = received {
                cancel.store(true, Ordering::Relaxed);
            }
            let joined = handle.join();
            match received {
                Ok(result) => Ok(result),
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!("[trial] {} exceeded {:?}", spec, budget);
                    return TrialRecord::TimedOut {
                        trial: spec,
                        budget_ms: budget.as_millis() as u64,
                    };
                }
                Err(RecvTimeoutError::Disconnected) => Err(match joined {
                    Err(payload) => panic_message(payload),
                    Ok(()) => "trial thread exited without a result".to_string(),
                }),
            }
        }
    };

    match outcome {
        Ok(Ok(result)) => {
            tracing::debug!(
                "[trial] {} {:?} length {} expansions {}",
                spec,
                result.status,
                result.path_length,
                result.node_expansions
            );
            TrialRecord::Solved(result)
        }
        Ok(Err(e)) => {
            tracing::warn!("[trial] {} failed: {}", spec, e);
            TrialRecord::Failed {
                trial: spec,
                error: e.to_string(),
            }
        }
        Err(error) => {
            tracing::warn!("[trial] {} {}", spec, error);
            TrialRecord::Failed { trial: spec, error }
        }
    }
}

/// Validates `config`, then lazily runs its trials one after another on the
/// calling thread.
pub fn run_experiment(config: &ExperimentConfig) -> Result<impl Iterator<Item = TrialRecord> + '_> {
    config.validate()?;
    let run = trial_fn(config.generate_options());
    let timeout = config.trial_timeout;
    Ok(config.trials().map(move |spec| execute(spec, &run, timeout)))
}

/// Runs every trial of `config` on `config.workers` threads and streams the
/// records to `sink` as they complete.
///
/// Trial failures are recorded and counted; only configuration and sink
/// errors are returned. Every trial thread has exited by the time this
/// returns.
pub fn run_batch(config: &ExperimentConfig, sink: &dyn MetricsSink) -> Result<RunSummary> {
    run_batch_with(config, sink, trial_fn(config.generate_options()))
}

fn run_batch_with(config: &ExperimentConfig, sink: &dyn MetricsSink, run: TrialFn) -> Result<RunSummary> {
    config.validate()?;
    tracing::info!(
        "[batch] starting {} trials on {} workers: {}",
        config.trial_count(),
        config.workers,
        serde_json::to_string(config)?
    );

    let timeout = config.trial_timeout;
    let (job_tx, job_rx) = mpsc::channel::<TrialSpec>();
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (record_tx, record_rx) = mpsc::channel::<TrialRecord>();

    let workers: Vec<_> = (0..config.workers)
        .map(|worker| {
            let job_rx = Arc::clone(&job_rx);
            let record_tx = record_tx.clone();
            let run = Arc::clone(&run);
            std::thread::spawn(move || {
                loop {
                    let job = match job_rx.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => break,
                    };
                    let Ok(spec) = job else {
                        break;
                    };
                    if record_tx.send(execute(spec, &run, timeout)).is_err() {
                        tracing::debug!("[worker {}] record channel closed, exiting", worker);
                        break;
                    }
                }
            })
        })
        .collect();
    drop(record_tx);

    for spec in config.trials() {
        if job_tx.send(spec).is_err() {
            break;
        }
    }
    drop(job_tx);

    let mut summary = RunSummary::default();
    let mut sink_result = Ok(());
    for record in record_rx {
        summary.tally(&record);
        if let Err(e) = sink.record(&record) {
            sink_result = Err(e);
            break;
        }
    }

    for handle in workers {
        if handle.join().is_err() {
            tracing::error!("[batch] worker thread panicked");
        }
    }
    sink_result?;
    sink.flush()?;

    tracing::info!("[batch] finished: {}", summary);
    Ok(summary)
}
