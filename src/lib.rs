pub mod error;
pub mod experiment;
pub mod generators;
pub mod heuristics;
pub mod logging;
pub mod maze;
pub mod metrics;
pub mod rng;
pub mod sink;
pub mod solvers;
