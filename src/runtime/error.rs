use crate::array::ArrayError;
use crate::commands::OpsError;
use crate::copy::CopyError;
use crate::dims::DimsError;
use crate::engine::MutationError;
use crate::formats::IoError;
use crate::mapping::MappingError;
use crate::model::CoreError;
use crate::workflow::PipelineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("raster error: {0}")]
    Core(#[from] CoreError),

    #[error("array error: {0}")]
    Array(#[from] ArrayError),

    #[error("dimension error: {0}")]
    Dims(#[from] DimsError),

    #[error("I/O service error: {0}")]
    Io(#[from] IoError),

    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("operation service error: {0}")]
    Ops(#[from] OpsError),

    #[error("{0}")]
    Mutation(#[from] MutationError),

    #[error("label copy failed: {0}")]
    Copy(#[from] CopyError),

    #[error("{0}")]
    Mapping(#[from] MappingError),

    #[error("pipeline service error: {0}")]
    Pipeline(#[from] PipelineError),
}
