//! Error types.

use std::io;

use thiserror::Error;

/// Errors produced while building, running, training or persisting a
/// network.
#[derive(Error, Debug)]
pub enum Error {
    /// A supplied vector does not have the length the network expects.
    #[error("{what} has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The network is missing a required layer, or a layer is degenerate.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Persisted state does not match the receiving network.
    #[error("corrupt state: {0}")]
    CorruptState(String),

    /// The underlying stream failed.
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// The training step counter does not fit the persisted int32 field.
    #[error("training step count {0} does not fit in the saved format")]
    StepCountOverflow(u64),

    #[error("no training examples were provided")]
    EmptyTrainingSet,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn shape(what: &'static str, expected: usize, actual: usize) -> Self {
        Error::ShapeMismatch {
            what,
            expected,
            actual,
        }
    }
}
