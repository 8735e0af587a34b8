use thiserror::Error;

use super::Granularity;

pub type Result<T> = std::result::Result<T, MappingError>;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error(
        "incompatible dimensions: source shape {source_shape:?} and target shape {target_shape:?} differ in the last {compared} axes"
    )]
    IncompatibleDimensions {
        source_shape: Vec<usize>,
        target_shape: Vec<usize>,
        compared: usize,
    },

    #[error("{granularity} copies need rank {required}, found rank {rank}")]
    GranularityUnavailable {
        granularity: Granularity,
        required: usize,
        rank: usize,
    },

    #[error("position has {found} coordinates but the source has rank {expected}")]
    CoordinateRank { expected: usize, found: usize },

    #[error("coordinate {coordinate} is outside axis {axis} with length {len}")]
    PositionOutOfBounds { axis: usize, coordinate: i64, len: usize },

    #[error("the viewer navigation step is missing {missing} leading axes")]
    MissingNavigationStep { missing: usize },
}
