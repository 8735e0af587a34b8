mod axis;
mod error;
mod pixel;
mod raster;


pub use axis::{AxisIndex, AxisName};
pub use error::{CoreError, Result};
pub use pixel::{MAX_EXACT_INTEGER, PixelType};
pub use raster::Raster;
