use thiserror::Error;

use crate::formats::IoError;
use crate::model::CoreError;

pub type Result<T> = std::result::Result<T, ArrayError>;

#[derive(Debug, Error)]
pub enum ArrayError {
    #[error("chunk {index} has shape {found:?}, expected {expected:?}")]
    ChunkShape {
        index: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("axis permutation {axes:?} is invalid for rank {ndim}")]
    InvalidPermutation { axes: Vec<usize>, ndim: usize },

    #[error("array data failure: {0}")]
    Core(#[from] CoreError),

    #[error("chunk read failure: {0}")]
    Io(#[from] IoError),
}
