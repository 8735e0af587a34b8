mod error;
mod granularity;
mod position;


pub use error::{MappingError, Result};
pub use granularity::Granularity;
pub use position::{MappedRegion, map_position};
