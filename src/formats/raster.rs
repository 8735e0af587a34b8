use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma};
use ndarray::Array;

use crate::model::{PixelType, Raster};

use super::{IoError, Result};

pub(crate) fn read_common_raster(path: &Path) -> Result<Raster> {
    let image = image::open(path)?;
    let (values, width, height, pixel_type) = match image {
        DynamicImage::ImageLuma8(buffer) => {
            let (width, height) = buffer.dimensions();
            let values = buffer.pixels().map(|pixel| f64::from(pixel.0[0])).collect();
            (values, width, height, PixelType::U8)
        }
        DynamicImage::ImageLuma16(buffer) => {
            let (width, height) = buffer.dimensions();
            let values = buffer.pixels().map(|pixel| f64::from(pixel.0[0])).collect();
            (values, width, height, PixelType::U16)
        }
        other => {
            let gray = other.to_luma8();
            let (width, height) = gray.dimensions();
            let values = gray.pixels().map(|pixel| f64::from(pixel.0[0])).collect();
            (values, width, height, PixelType::U8)
        }
    };
    let data = Array::from_shape_vec((height as usize, width as usize), values)
        .map_err(|error| IoError::UnsupportedLayout(error.to_string()))?
        .into_dyn();
    Ok(Raster::new(data, pixel_type))
}

pub(crate) fn write_common_raster(path: &Path, raster: &Raster) -> Result<()> {
    let shape = raster.shape();
    if shape.len() != 2 {
        return Err(IoError::UnsupportedLayout(format!(
            "raster write expects [Y, X], found shape {shape:?}"
        )));
    }
    let (height, width) = (shape[0] as u32, shape[1] as u32);
    match raster.pixel_type {
        PixelType::U8 => {
            let samples = raster.data.iter().map(|value| *value as u8).collect::<Vec<_>>();
            let image = ImageBuffer::<Luma<u8>, _>::from_vec(width, height, samples)
                .ok_or_else(|| IoError::UnsupportedLayout("failed to construct gray image".into()))?;
            image.save(path)?;
        }
        PixelType::U16 => {
            let samples = raster.data.iter().map(|value| *value as u16).collect::<Vec<_>>();
            let image = ImageBuffer::<Luma<u16>, _>::from_vec(width, height, samples)
                .ok_or_else(|| IoError::UnsupportedLayout("failed to construct gray image".into()))?;
            image.save(path)?;
        }
        other => {
            return Err(IoError::UnsupportedLayout(format!(
                "PNG holds u8 or u16 labels, found {other}"
            )));
        }
    }
    Ok(())
}
