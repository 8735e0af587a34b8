mod api;
mod error;
mod raster;
mod tiff;
mod util;


pub use api::{
    is_supported, load_directory_as_lazy_stack, read_slice, supported_formats, write_slice,
};
pub use error::{IoError, Result};
pub use util::{remove_invalid_chars, slice_file_name, time_point_file_name};
