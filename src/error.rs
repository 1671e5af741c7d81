use std::io;
use thiserror::Error;

/// The single error type surfaced across all three engines and the DIMACS codec.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("malformed formula: {reason}")]
    MalformedFormula { reason: String },

    #[error("advanced an iterator past the end of its solution sequence")]
    ProceedPastEnd,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SolverError>;
