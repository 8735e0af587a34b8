mod error;
mod info;

#[cfg(test)]
mod tests;

pub use error::{DimsError, Result};
pub use info::{
    DimensionInfo, LEGACY_METADATA_KEY, METADATA_KEY, attach, infer, reorder, transpose_order,
    validate,
};
