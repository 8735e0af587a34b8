use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpsError>;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid operation parameters: {0}")]
    InvalidParams(String),

    #[error("{operation} supports rank {supported}, found rank {found}")]
    UnsupportedRank {
        operation: &'static str,
        supported: &'static str,
        found: usize,
    },

    #[error("{0} needs a second image")]
    MissingOperand(&'static str),

    #[error("operand shape {operand:?} does not match image shape {image:?}")]
    OperandShape {
        image: Vec<usize>,
        operand: Vec<usize>,
    },

    #[error("core raster error: {0}")]
    Core(#[from] CoreError),
}
