/// Error types. The core only fails at round setup; everything else is
/// either a precondition (debug-asserted) or a skipped check.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SetupError {
    #[error("a round needs at least one player")]
    NoPlayers,
    #[error("{requested} players requested, at most {max} are supported")]
    TooManyPlayers { requested: usize, max: usize },
    #[error("field must have positive, finite dimensions (got {width} x {height})")]
    InvalidField { width: f64, height: f64 },
    #[error("base speed must be positive and finite (got {0})")]
    InvalidBaseSpeed(f64),
    #[error("tick rate must be at least 1 ms")]
    InvalidTickRate,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write trace {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
    #[error(transparent)]
    Setup(#[from] SetupError),
}
