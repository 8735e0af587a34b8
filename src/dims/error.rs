use thiserror::Error;

use crate::array::ArrayError;

pub type Result<T> = std::result::Result<T, DimsError>;

#[derive(Debug, Error)]
pub enum DimsError {
    #[error("axis names {0} must be unique and include Y and X")]
    InvalidAxes(String),

    #[error("dimension info has {found} entries but the layer has rank {expected}")]
    RankMismatch { expected: usize, found: usize },

    #[error("axis scale must be positive, found {0}")]
    InvalidScale(f64),

    #[error("stored dimension info is unreadable: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("layer data failure: {0}")]
    Array(#[from] ArrayError),
}
