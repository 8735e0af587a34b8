mod chunked;
mod error;
mod label_array;
mod layer;

#[cfg(test)]
mod tests;

pub use chunked::{Chunk, ChunkedArray};
pub use error::{ArrayError, Result};
pub use label_array::LabelArray;
pub use layer::{Layer, LayerKind};
