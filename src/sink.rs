//! Destinations for trial records.

use serde::Serialize;
use std::io::{BufRead, BufWriter, Write};
use std::sync::{Mutex, MutexGuard};

use crate::error::{MazeError, Result};
use crate::generators::Generator;
use crate::heuristics::Heuristic;
use crate::maze::Connectivity;
use crate::metrics::{TrialRecord, TrialSpec};
use crate::solvers::{Algorithm, SearchStatus};

/// Receives records from any worker thread.
pub trait MetricsSink: Send + Sync {
    fn record(&self, record: &TrialRecord) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

fn poisoned() -> MazeError {
    MazeError::Io(std::io::Error::other("sink lock poisoned by a panicking writer"))
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| poisoned())
}

/// One JSON object per line.
///
/// Each record is serialized up front and appended with a single `write_all`
/// while holding the lock, so concurrent writers never interleave lines.
pub struct JsonlSink<W: Write + Send> {
    writer: Mutex<BufWriter<W>>,
}

impl<W: Write + Send> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        JsonlSink {
            writer: Mutex::new(BufWriter::new(writer)),
        }
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        let writer = self.writer.into_inner().map_err(|_| poisoned())?;
        writer.into_inner().map_err(|e| MazeError::Io(e.into_error()))
    }
}

impl<W: Write + Send> MetricsSink for JsonlSink<W> {
    fn record(&self, record: &TrialRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        lock(&self.writer)?.write_all(&line)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        lock(&self.writer)?.flush()?;
        Ok(())
    }
}

/// Scalar columns of one record. Paths and visit orders are left to JSONL.
///
/// Failed and timed out trials leave the solve metrics empty.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    trial: u32,
    width: u16,
    height: u16,
    seed: u64,
    generator: Generator,
    algorithm: Algorithm,
    heuristic: Option<Heuristic>,
    path_length: Option<usize>,
    node_expansions: Option<usize>,
    runtime_ms: Option<f64>,
    outcome: &'static str,
    status: Option<SearchStatus>,
    path_cost: Option<f64>,
    connectivity: Option<Connectivity>,
    error: Option<&'a str>,
    budget_ms: Option<u64>,
}

impl<'a> CsvRow<'a> {
    fn unsolved(trial: &TrialSpec, outcome: &'static str) -> Self {
        CsvRow {
            trial: trial.trial_index,
            width: trial.width,
            height: trial.height,
            seed: trial.seed,
            generator: trial.generator,
            algorithm: trial.algorithm,
            heuristic: trial.heuristic,
            path_length: None,
            node_expansions: None,
            runtime_ms: None,
            outcome,
            status: None,
            path_cost: None,
            connectivity: None,
            error: None,
            budget_ms: None,
        }
    }
}

impl<'a> From<&'a TrialRecord> for CsvRow<'a> {
    fn from(record: &'a TrialRecord) -> Self {
        match record {
            TrialRecord::Solved(result) => CsvRow {
                trial: result.trial_index,
                width: result.width,
                height: result.height,
                seed: result.seed,
                generator: result.generator,
                algorithm: result.algorithm,
                heuristic: result.heuristic,
                path_length: Some(result.path_length),
                node_expansions: Some(result.node_expansions),
                runtime_ms: Some(result.runtime_ms),
                outcome: "solved",
                status: Some(result.status),
                path_cost: Some(result.path_cost),
                connectivity: Some(result.connectivity),
                error: None,
                budget_ms: None,
            },
            TrialRecord::Failed { trial, error } => CsvRow {
                error: Some(error.as_str()),
                ..CsvRow::unsolved(trial, "failed")
            },
            TrialRecord::TimedOut { trial, budget_ms } => CsvRow {
                budget_ms: Some(*budget_ms),
                ..CsvRow::unsolved(trial, "timed_out")
            },
        }
    }
}

/// One CSV row per record, under a header written before the first row.
pub struct CsvSink<W: Write + Send> {
    writer: Mutex<csv::Writer<W>>,
}

impl<W: Write + Send> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        CsvSink {
            writer: Mutex::new(csv::Writer::from_writer(writer)),
        }
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        let writer = self.writer.into_inner().map_err(|_| poisoned())?;
        writer
            .into_inner()
            .map_err(|e| MazeError::Io(std::io::Error::new(e.error().kind(), e.to_string())))
    }
}

impl<W: Write + Send> MetricsSink for CsvSink<W> {
    fn record(&self, record: &TrialRecord) -> Result<()> {
        lock(&self.writer)?.serialize(CsvRow::from(record))?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        lock(&self.writer)?.flush()?;
        Ok(())
    }
}

/// Keeps records in memory, in arrival order.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<TrialRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn records(&self) -> Vec<TrialRecord> {
        lock(&self.records).map(|r| r.clone()).unwrap_or_default()
    }
}

impl MetricsSink for MemorySink {
    fn record(&self, record: &TrialRecord) -> Result<()> {
        lock(&self.records)?.push(record.clone());
        Ok(())
    }
}

/// Parses records written by [`JsonlSink`], skipping blank lines.
pub fn read_jsonl<R: BufRead>(reader: R) -> impl Iterator<Item = Result<TrialRecord>> {
    reader.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(serde_json::from_str(&line).map_err(MazeError::from)),
        Err(e) => Some(Err(MazeError::from(e))),
    })
}
