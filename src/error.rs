use thiserror::Error;

use crate::generators::Generator;

/// Errors raised by maze generation, configuration checks and record I/O.
///
/// Search outcomes such as "no path" or a timed out trial are not errors,
/// they are reported through [`crate::solvers::SearchStatus`] and
/// [`crate::metrics::TrialRecord`].
#[derive(Error, Debug)]
pub enum MazeError {
    /// The carved grid does not form a single spanning tree.
    #[error("{generator} produced an invalid {width}x{height} maze: {reason}")]
    Generation {
        generator: Generator,
        width: u16,
        height: u16,
        reason: String,
    },

    /// Work stopped because its cancel flag was raised.
    #[error("interrupted before completion")]
    Interrupted,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl MazeError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        MazeError::InvalidConfiguration(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, MazeError>;
