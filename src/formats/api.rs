use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::array::{Chunk, ChunkedArray};
use crate::model::{PixelType, Raster};

use super::raster::{read_common_raster, write_common_raster};
use super::tiff::{read_tiff, write_tiff};
use super::util::extension;
use super::{IoError, Result};

pub fn read_slice(path: impl AsRef<Path>) -> Result<Raster> {
    let path = path.as_ref();
    let extension = extension(path)?;
    match extension.as_str() {
        "png" | "jpg" | "jpeg" => read_common_raster(path),
        "tif" | "tiff" => read_tiff(path),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

/// Writes `raster` cast to `pixel_type`.
pub fn write_slice(path: impl AsRef<Path>, raster: &Raster, pixel_type: PixelType) -> Result<()> {
    let path = path.as_ref();
    let extension = extension(path)?;
    let converted;
    let raster = if raster.pixel_type == pixel_type {
        raster
    } else {
        converted = raster.cast(pixel_type);
        &converted
    };
    match extension.as_str() {
        "png" => write_common_raster(path, raster),
        "tif" | "tiff" => write_tiff(path, raster),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

pub fn supported_formats() -> &'static [&'static str] {
    &["png", "jpg", "jpeg", "tif", "tiff"]
}

pub fn is_supported(path: &Path) -> bool {
    extension(path)
        .map(|extension| supported_formats().contains(&extension.as_str()))
        .unwrap_or(false)
}

/// Builds a chunked-lazy stack from every image file in `dir`, ordered by file
/// name. Only the first file is read, to learn the slice shape and pixel type.
pub fn load_directory_as_lazy_stack(dir: impl AsRef<Path>) -> Result<ChunkedArray> {
    let dir = dir.as_ref();
    let mut paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<PathBuf>>>()?;
    paths.retain(|path| path.is_file() && is_supported(path));
    paths.sort_by(|left, right| left.file_name().cmp(&right.file_name()));
    let first = paths
        .first()
        .ok_or_else(|| IoError::EmptyDirectory(dir.display().to_string()))?;
    let probe = read_slice(first)?;
    let chunk_shape = probe.shape().to_vec();
    debug!(
        "lazy stack of {} slices {:?} from {}",
        paths.len(),
        chunk_shape,
        dir.display()
    );
    let chunks = paths
        .into_iter()
        .map(|path| Chunk::File {
            path,
            shape: chunk_shape.clone(),
        })
        .collect();
    Ok(ChunkedArray::new(chunks, chunk_shape, probe.pixel_type)?)
}
