use std::collections::BTreeMap;

use ndarray::IxDyn;

use crate::model::{AxisIndex, CoreError, PixelType, Raster};

use super::chunked::check_permutation;
use super::{ChunkedArray, Result};

/// Pixel data of a layer: either fully resident or a lazy stack of slices.
///
/// Resident arrays are edited in place. Chunked arrays are never mutated: a
/// write swaps `self` for a rebuilt handle, so clones taken earlier keep the
/// old contents and untouched slices stay unevaluated.
#[derive(Debug, Clone)]
pub enum LabelArray {
    Materialized(Raster),
    Chunked(ChunkedArray),
}

impl From<Raster> for LabelArray {
    fn from(raster: Raster) -> Self {
        LabelArray::Materialized(raster)
    }
}

impl From<ChunkedArray> for LabelArray {
    fn from(array: ChunkedArray) -> Self {
        LabelArray::Chunked(array)
    }
}

impl LabelArray {
    pub fn shape(&self) -> Vec<usize> {
        match self {
            LabelArray::Materialized(raster) => raster.shape().to_vec(),
            LabelArray::Chunked(array) => array.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        match self {
            LabelArray::Materialized(raster) => raster.ndim(),
            LabelArray::Chunked(array) => array.ndim(),
        }
    }

    pub fn pixel_type(&self) -> PixelType {
        match self {
            LabelArray::Materialized(raster) => raster.pixel_type,
            LabelArray::Chunked(array) => array.pixel_type(),
        }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self, LabelArray::Chunked(_))
    }

    pub fn as_raster(&self) -> Option<&Raster> {
        match self {
            LabelArray::Materialized(raster) => Some(raster),
            LabelArray::Chunked(_) => None,
        }
    }

    /// Slice `index` along axis 0.
    pub fn read_slice(&self, index: usize) -> Result<Raster> {
        match self {
            LabelArray::Materialized(raster) => Ok(raster.index_axis0(index)?),
            LabelArray::Chunked(array) => array.compute(index),
        }
    }

    pub fn write_slice(&mut self, index: usize, values: Raster) -> Result<()> {
        match self {
            LabelArray::Materialized(raster) => Ok(raster.assign_axis0(index, &values)?),
            LabelArray::Chunked(array) => {
                let patched = array.patch(BTreeMap::from([(index, values)]))?;
                *self = LabelArray::Chunked(patched);
                Ok(())
            }
        }
    }

    pub fn read_region(&self, region: &[AxisIndex]) -> Result<Raster> {
        match self {
            LabelArray::Materialized(raster) => Ok(raster.read_region(region)?),
            LabelArray::Chunked(array) => {
                check_rank(region, array.ndim())?;
                match region[0] {
                    AxisIndex::Fixed(index) => Ok(array.compute(index)?.read_region(&region[1..])?),
                    AxisIndex::Free => {
                        let slices = (0..array.len())
                            .map(|index| {
                                let slice = array.compute(index)?;
                                Ok(slice.read_region(&region[1..])?)
                            })
                            .collect::<Result<Vec<_>>>()?;
                        Ok(Raster::stack(&slices)?)
                    }
                }
            }
        }
    }

    pub fn write_region(&mut self, region: &[AxisIndex], values: &Raster) -> Result<()> {
        match self {
            LabelArray::Materialized(raster) => Ok(raster.write_region(region, values)?),
            LabelArray::Chunked(array) => {
                check_rank(region, array.ndim())?;
                let mut modified = BTreeMap::new();
                match region[0] {
                    AxisIndex::Fixed(index) => {
                        let mut slice = array.compute(index)?;
                        slice.write_region(&region[1..], values)?;
                        modified.insert(index, slice);
                    }
                    AxisIndex::Free => {
                        if values.shape().first() != Some(&array.len()) {
                            return Err(CoreError::ShapeMismatch {
                                expected: vec![array.len()],
                                found: values.shape().to_vec(),
                            }
                            .into());
                        }
                        for index in 0..array.len() {
                            let mut slice = array.compute(index)?;
                            slice.write_region(&region[1..], &values.index_axis0(index)?)?;
                            modified.insert(index, slice);
                        }
                    }
                }
                let patched = array.patch(modified)?;
                *self = LabelArray::Chunked(patched);
                Ok(())
            }
        }
    }

    pub fn value_at(&self, coords: &[usize]) -> Result<f64> {
        match self {
            LabelArray::Materialized(raster) => Ok(raster.value_at(coords)?),
            LabelArray::Chunked(array) => {
                if coords.len() != array.ndim() {
                    return Err(CoreError::RegionRankMismatch {
                        region: coords.len(),
                        ndim: array.ndim(),
                    }
                    .into());
                }
                Ok(array.compute(coords[0])?.value_at(&coords[1..])?)
            }
        }
    }

    pub fn max_value(&self) -> Result<f64> {
        match self {
            LabelArray::Materialized(raster) => Ok(raster.max_value()),
            LabelArray::Chunked(array) => array.max_value(),
        }
    }

    /// Widens the pixel type. Chunked stacks are only retagged; values are
    /// already representable because promotion never narrows.
    pub fn promote(&mut self, pixel_type: PixelType) -> Result<()> {
        match self {
            LabelArray::Materialized(raster) => Ok(raster.promote(pixel_type)?),
            LabelArray::Chunked(array) => {
                let (min, max) = pixel_type.range();
                let (current_min, current_max) = array.pixel_type().range();
                if current_min < min || current_max > max {
                    return Err(CoreError::ValueOutOfRange {
                        value: current_max.max(-current_min),
                        pixel_type,
                    }
                    .into());
                }
                let widened = array.with_pixel_type(pixel_type);
                *self = LabelArray::Chunked(widened);
                Ok(())
            }
        }
    }

    /// Reorders the axes. A chunked stack whose leading axis stays first is
    /// permuted lazily; otherwise it is computed and split again along the new
    /// leading axis.
    pub fn permute(&mut self, axes: &[usize]) -> Result<()> {
        check_permutation(axes, self.ndim())?;
        if axes.iter().enumerate().all(|(index, axis)| index == *axis) {
            return Ok(());
        }
        match self {
            LabelArray::Materialized(raster) => {
                raster.data = raster
                    .data
                    .view()
                    .permuted_axes(IxDyn(axes))
                    .as_standard_layout()
                    .into_owned();
                Ok(())
            }
            LabelArray::Chunked(array) if axes[0] == 0 => {
                let inner = axes[1..].iter().map(|axis| axis - 1).collect::<Vec<_>>();
                let permuted = array.permute_chunks(&inner)?;
                *self = LabelArray::Chunked(permuted);
                Ok(())
            }
            LabelArray::Chunked(array) => {
                let mut raster = array.compute_all()?;
                raster.data = raster
                    .data
                    .permuted_axes(IxDyn(axes))
                    .as_standard_layout()
                    .into_owned();
                let rebuilt = ChunkedArray::from_raster(&raster)?;
                *self = LabelArray::Chunked(rebuilt);
                Ok(())
            }
        }
    }

    /// Fully resident copy of the data. Computes every chunk of a lazy stack.
    pub fn to_raster(&self) -> Result<Raster> {
        match self {
            LabelArray::Materialized(raster) => Ok(raster.clone()),
            LabelArray::Chunked(array) => array.compute_all(),
        }
    }

    pub fn materialize(self) -> Result<Raster> {
        match self {
            LabelArray::Materialized(raster) => Ok(raster),
            LabelArray::Chunked(array) => array.compute_all(),
        }
    }
}

fn check_rank(region: &[AxisIndex], ndim: usize) -> Result<()> {
    if region.len() != ndim {
        return Err(CoreError::RegionRankMismatch {
            region: region.len(),
            ndim,
        }
        .into());
    }
    Ok(())
}
