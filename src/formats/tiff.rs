use std::fs::File;
use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, TiffValue, colortype};
use tiff::tags::Tag;

use crate::model::{PixelType, Raster};

use super::{IoError, Result};

/// JSON stored in the ImageDescription tag so that stacks of rank > 3 reload
/// with their full shape instead of as a flat page stack.
#[derive(Debug, Serialize, Deserialize)]
struct ShapeDescriptor {
    shape: Vec<usize>,
}

pub(crate) fn read_tiff(path: &Path) -> Result<Raster> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(file)?;
    let (width, height) = decoder.dimensions()?;
    let descriptor = decoder
        .get_tag_ascii_string(Tag::ImageDescription)
        .ok()
        .and_then(|text| serde_json::from_str::<ShapeDescriptor>(&text).ok());

    let mut values = Vec::new();
    let mut pixel_type;
    let mut pages = 0usize;
    loop {
        pixel_type = decode_tiff_page(&mut decoder, &mut values, width, height)?;
        pages += 1;
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
        let (other_width, other_height) = decoder.dimensions()?;
        if other_width != width || other_height != height {
            return Err(IoError::UnsupportedLayout(
                "TIFF pages must have identical dimensions".into(),
            ));
        }
    }

    let plane = [height as usize, width as usize];
    let shape = match descriptor {
        Some(descriptor) if descriptor.shape.iter().product::<usize>() == values.len() => {
            descriptor.shape
        }
        _ if pages == 1 => plane.to_vec(),
        _ => vec![pages, plane[0], plane[1]],
    };
    let found = values.len();
    let data = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| {
        IoError::UnsupportedLayout(format!("{found} samples do not fill shape {shape:?}"))
    })?;
    Ok(Raster::new(data, pixel_type))
}

fn decode_tiff_page(
    decoder: &mut Decoder<File>,
    values: &mut Vec<f64>,
    width: u32,
    height: u32,
) -> Result<PixelType> {
    let expected = width as usize * height as usize;
    let before = values.len();
    let pixel_type = match decoder.read_image()? {
        DecodingResult::U8(buffer) => {
            values.extend(buffer.into_iter().map(f64::from));
            PixelType::U8
        }
        DecodingResult::U16(buffer) => {
            values.extend(buffer.into_iter().map(f64::from));
            PixelType::U16
        }
        DecodingResult::U32(buffer) => {
            values.extend(buffer.into_iter().map(f64::from));
            PixelType::U32
        }
        DecodingResult::U64(buffer) => {
            values.extend(buffer.into_iter().map(|value| value as f64));
            PixelType::U64
        }
        DecodingResult::I8(buffer) => {
            values.extend(buffer.into_iter().map(f64::from));
            PixelType::I8
        }
        DecodingResult::I16(buffer) => {
            values.extend(buffer.into_iter().map(f64::from));
            PixelType::I16
        }
        DecodingResult::I32(buffer) => {
            values.extend(buffer.into_iter().map(f64::from));
            PixelType::I32
        }
        DecodingResult::I64(buffer) => {
            values.extend(buffer.into_iter().map(|value| value as f64));
            PixelType::I64
        }
        DecodingResult::F32(buffer) => {
            values.extend(buffer.into_iter().map(f64::from));
            PixelType::F32
        }
        DecodingResult::F64(buffer) => {
            values.extend(buffer);
            PixelType::F64
        }
        other => {
            return Err(IoError::UnsupportedLayout(format!(
                "unsupported TIFF sample type: {other:?}"
            )));
        }
    };
    if values.len() - before != expected {
        return Err(IoError::UnsupportedLayout(
            "TIFF RGB/alpha pages are not supported for label images".into(),
        ));
    }
    Ok(pixel_type)
}

/// Writes `raster` as grey pages in its own pixel type. Every axis before the
/// last two is flattened into pages; the full shape goes into ImageDescription.
pub(crate) fn write_tiff(path: &Path, raster: &Raster) -> Result<()> {
    let shape = raster.shape();
    if shape.len() < 2 || raster.is_empty() {
        return Err(IoError::UnsupportedLayout(format!(
            "TIFF expects at least [Y, X] with non-zero extent, found shape {shape:?}"
        )));
    }
    let description = serde_json::to_string(&ShapeDescriptor {
        shape: shape.to_vec(),
    })
    .map_err(|error| IoError::UnsupportedLayout(error.to_string()))?;
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;
    match raster.pixel_type {
        PixelType::U8 => {
            write_pages::<colortype::Gray8>(&mut encoder, raster, &description, |v| v as u8)
        }
        PixelType::U16 => {
            write_pages::<colortype::Gray16>(&mut encoder, raster, &description, |v| v as u16)
        }
        PixelType::U32 => {
            write_pages::<colortype::Gray32>(&mut encoder, raster, &description, |v| v as u32)
        }
        PixelType::U64 => {
            write_pages::<colortype::Gray64>(&mut encoder, raster, &description, |v| v as u64)
        }
        PixelType::I8 => {
            write_pages::<colortype::GrayI8>(&mut encoder, raster, &description, |v| v as i8)
        }
        PixelType::I16 => {
            write_pages::<colortype::GrayI16>(&mut encoder, raster, &description, |v| v as i16)
        }
        PixelType::I32 => {
            write_pages::<colortype::GrayI32>(&mut encoder, raster, &description, |v| v as i32)
        }
        PixelType::I64 => {
            write_pages::<colortype::GrayI64>(&mut encoder, raster, &description, |v| v as i64)
        }
        PixelType::F32 => write_pages::<colortype::Gray32Float>(
            &mut encoder,
            raster,
            &description,
            |v| v as f32,
        ),
        PixelType::F64 => {
            write_pages::<colortype::Gray64Float>(&mut encoder, raster, &description, |v| v)
        }
    }
}

fn write_pages<C>(
    encoder: &mut TiffEncoder<File>,
    raster: &Raster,
    description: &str,
    convert: fn(f64) -> C::Inner,
) -> Result<()>
where
    C: colortype::ColorType,
    [C::Inner]: TiffValue,
{
    let shape = raster.shape();
    let height = shape[shape.len() - 2];
    let width = shape[shape.len() - 1];
    let samples = raster.data.iter().map(|value| convert(*value)).collect::<Vec<_>>();
    for (index, page) in samples.chunks(height * width).enumerate() {
        let mut image = encoder.new_image::<C>(width as u32, height as u32)?;
        if index == 0 {
            image.encoder().write_tag(Tag::ImageDescription, description)?;
        }
        image.write_data(page)?;
    }
    Ok(())
}
