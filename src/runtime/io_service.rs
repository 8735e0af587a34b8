use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::array::{LabelArray, Layer};
use crate::dims::attach;
use crate::formats::{
    load_directory_as_lazy_stack, read_slice, remove_invalid_chars, time_point_file_name,
    write_slice,
};
use crate::model::PixelType;

use super::Result;

/// How a label layer is written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOptions {
    /// Base file name; the layer name when absent.
    pub file_name: Option<String>,
    pub pixel_type: PixelType,
    /// Write one file per index along axis 0 (rank 3 and up only).
    pub split_time_points: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            file_name: None,
            pixel_type: PixelType::U16,
            split_time_points: false,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IoService;

impl IoService {
    /// Opens a single image file as a materialized label layer, or a directory
    /// of slices as a chunked-lazy one. Dimension info is attached either way.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Layer> {
        let path = path.as_ref();
        let (name, data) = if path.is_dir() {
            let name = path.file_name();
            (name, LabelArray::from(load_directory_as_lazy_stack(path)?))
        } else {
            (path.file_stem(), LabelArray::from(read_slice(path)?))
        };
        let name = name
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "labels".to_string());
        let mut layer = Layer::labels(name, data);
        attach(&mut layer)?;
        info!(
            "loaded {} {:?} ({}) from {}",
            layer.name,
            layer.shape(),
            if layer.data.is_chunked() { "lazy" } else { "in memory" },
            path.display()
        );
        Ok(layer)
    }

    /// Writes `layer` into `destination` and returns the files created.
    pub fn save_labels(
        &self,
        layer: &Layer,
        destination: impl AsRef<Path>,
        options: &SaveOptions,
    ) -> Result<Vec<PathBuf>> {
        let destination = destination.as_ref();
        fs::create_dir_all(destination)?;
        let file_name = options.file_name.as_deref().unwrap_or(&layer.name);
        let file_name = file_name.strip_suffix(".tif").unwrap_or(file_name);

        let mut written = Vec::new();
        if layer.ndim() >= 3 && options.split_time_points {
            for index in 0..layer.shape()[0] {
                let path = destination.join(time_point_file_name(file_name, index));
                write_slice(&path, &layer.data.read_slice(index)?, options.pixel_type)?;
                written.push(path);
            }
        } else {
            let path = destination.join(format!("{}.tif", remove_invalid_chars(file_name)));
            write_slice(&path, &layer.data.to_raster()?, options.pixel_type)?;
            written.push(path);
        }
        info!(
            "saved {} as {} file(s) in {}",
            layer.name,
            written.len(),
            destination.display()
        );
        Ok(written)
    }
}
