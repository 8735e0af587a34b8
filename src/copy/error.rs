use thiserror::Error;

use crate::array::ArrayError;
use crate::mapping::MappingError;
use crate::model::PixelType;

pub type Result<T> = std::result::Result<T, CopyError>;

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("label {label} does not fit in {pixel_type} and no wider unsigned type holds it")]
    LabelOverflow { label: f64, pixel_type: PixelType },

    #[error("source region {source_shape:?} does not line up with target region {target_shape:?}")]
    RegionShape {
        source_shape: Vec<usize>,
        target_shape: Vec<usize>,
    },

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Array(#[from] ArrayError),
}
