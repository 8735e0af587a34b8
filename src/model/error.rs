use thiserror::Error;

use super::PixelType;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("index {index} out of bounds for axis {axis} with length {len}")]
    IndexOutOfBounds {
        axis: usize,
        index: usize,
        len: usize,
    },

    #[error("region addresses {region} axes but the array has {ndim}")]
    RegionRankMismatch { region: usize, ndim: usize },

    #[error("value {value} does not fit pixel type {pixel_type}")]
    ValueOutOfRange { value: f64, pixel_type: PixelType },

    #[error("stacks need at least one slice")]
    EmptyStack,

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
}
