use std::path::PathBuf;

use thiserror::Error;

use crate::array::ArrayError;
use crate::commands::OpsError;
use crate::formats::IoError;

pub type Result<T> = std::result::Result<T, MutationError>;

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("no output directory selected")]
    NoOutputDirectorySelected,

    #[error("a chunked stack is transformed slice by slice; select indices along axis 0")]
    WholeArrayOnChunked,

    #[error("paired selections differ in length: {primary} image slices, {operand} operand slices")]
    SelectionLength { primary: usize, operand: usize },

    #[error("unsupported selection: {0}")]
    UnsupportedSelection(String),

    #[error("slice {index} is out of bounds for axis 0 of length {len}")]
    SliceOutOfBounds { index: usize, len: usize },

    #[error("cannot create output directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Ops(#[from] OpsError),

    #[error(transparent)]
    Array(#[from] ArrayError),

    #[error(transparent)]
    Io(#[from] IoError),
}
