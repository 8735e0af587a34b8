use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;
use ndarray::IxDyn;

use crate::formats::read_slice;
use crate::model::{CoreError, PixelType, Raster};

use super::{ArrayError, Result};

/// One delayed slice along axis 0 of a [`ChunkedArray`].
#[derive(Debug, Clone)]
pub enum Chunk {
    /// Read from an image file when computed. `shape` restores slices that were
    /// stored flattened into a page stack.
    File { path: PathBuf, shape: Vec<usize> },
    /// A slice that has already been computed.
    Resident(Arc<Raster>),
    /// Another chunk whose axes are permuted after computing.
    Permuted { source: Box<Chunk>, axes: Vec<usize> },
}

impl Chunk {
    pub fn resident(raster: Raster) -> Self {
        Chunk::Resident(Arc::new(raster))
    }

    pub fn is_resident(&self) -> bool {
        match self {
            Chunk::File { .. } => false,
            Chunk::Resident(_) => true,
            Chunk::Permuted { source, .. } => source.is_resident(),
        }
    }

    pub fn compute(&self) -> Result<Raster> {
        match self {
            Chunk::File { path, shape } => {
                debug!("reading chunk {}", path.display());
                let raster = read_slice(path)?;
                if raster.shape() == shape.as_slice() {
                    return Ok(raster);
                }
                let found = raster.shape().to_vec();
                if raster.len() != shape.iter().product::<usize>() {
                    return Err(CoreError::ShapeMismatch {
                        expected: shape.clone(),
                        found,
                    }
                    .into());
                }
                let pixel_type = raster.pixel_type;
                let data = raster
                    .data
                    .into_shape_with_order(IxDyn(shape))
                    .map_err(|_| CoreError::ShapeMismatch {
                        expected: shape.clone(),
                        found,
                    })?;
                Ok(Raster::new(data, pixel_type))
            }
            Chunk::Resident(raster) => Ok(raster.as_ref().clone()),
            Chunk::Permuted { source, axes } => {
                let raster = source.compute()?;
                if axes.len() != raster.ndim() {
                    return Err(ArrayError::InvalidPermutation {
                        axes: axes.clone(),
                        ndim: raster.ndim(),
                    });
                }
                let pixel_type = raster.pixel_type;
                let data = raster
                    .data
                    .permuted_axes(IxDyn(axes))
                    .as_standard_layout()
                    .into_owned();
                Ok(Raster::new(data, pixel_type))
            }
        }
    }
}

/// A stack of delayed slices along axis 0. Indexing is metadata only; pixel
/// data is read when a slice is computed. Handles are immutable: every edit
/// produces a new handle sharing the untouched chunks.
#[derive(Debug, Clone)]
pub struct ChunkedArray {
    chunks: Vec<Chunk>,
    chunk_shape: Vec<usize>,
    pixel_type: PixelType,
}

impl ChunkedArray {
    pub fn new(
        chunks: Vec<Chunk>,
        chunk_shape: Vec<usize>,
        pixel_type: PixelType,
    ) -> crate::model::Result<Self> {
        if chunks.is_empty() {
            return Err(CoreError::EmptyStack);
        }
        Ok(Self {
            chunks,
            chunk_shape,
            pixel_type,
        })
    }

    /// Splits a resident raster into already-computed chunks along axis 0.
    pub fn from_raster(raster: &Raster) -> crate::model::Result<Self> {
        let len = raster.shape().first().copied().unwrap_or(0);
        let chunks = (0..len)
            .map(|index| raster.index_axis0(index).map(Chunk::resident))
            .collect::<crate::model::Result<Vec<_>>>()?;
        Self::new(chunks, raster.shape()[1..].to_vec(), raster.pixel_type)
    }

    pub fn shape(&self) -> Vec<usize> {
        let mut shape = Vec::with_capacity(self.chunk_shape.len() + 1);
        shape.push(self.chunks.len());
        shape.extend_from_slice(&self.chunk_shape);
        shape
    }

    pub fn ndim(&self) -> usize {
        self.chunk_shape.len() + 1
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunk_shape(&self) -> &[usize] {
        &self.chunk_shape
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Computes one slice along axis 0.
    pub fn compute(&self, index: usize) -> Result<Raster> {
        let chunk = self.chunks.get(index).ok_or(CoreError::IndexOutOfBounds {
            axis: 0,
            index,
            len: self.chunks.len(),
        })?;
        let raster = chunk.compute()?;
        if raster.shape() != self.chunk_shape.as_slice() {
            return Err(ArrayError::ChunkShape {
                index,
                expected: self.chunk_shape.clone(),
                found: raster.shape().to_vec(),
            });
        }
        if raster.pixel_type == self.pixel_type {
            Ok(raster)
        } else {
            Ok(raster.cast(self.pixel_type))
        }
    }

    /// Computes every slice in ascending order and stacks them.
    pub fn compute_all(&self) -> Result<Raster> {
        let slices = (0..self.chunks.len())
            .map(|index| self.compute(index))
            .collect::<Result<Vec<_>>>()?;
        Ok(Raster::stack(&slices)?)
    }

    /// Largest value in the stack, computing one slice at a time.
    pub fn max_value(&self) -> Result<f64> {
        let mut max = f64::MIN;
        for index in 0..self.chunks.len() {
            max = max.max(self.compute(index)?.max_value());
        }
        Ok(max)
    }

    /// New handle identical to this one except that the given slices are
    /// replaced by computed ones. Other chunks are shared and stay unevaluated.
    pub fn patch(&self, modified: BTreeMap<usize, Raster>) -> Result<ChunkedArray> {
        let mut chunks = self.chunks.clone();
        let mut pixel_type = self.pixel_type;
        for (index, raster) in modified {
            if index >= chunks.len() {
                return Err(CoreError::IndexOutOfBounds {
                    axis: 0,
                    index,
                    len: chunks.len(),
                }
                .into());
            }
            if raster.shape() != self.chunk_shape.as_slice() {
                return Err(ArrayError::ChunkShape {
                    index,
                    expected: self.chunk_shape.clone(),
                    found: raster.shape().to_vec(),
                });
            }
            pixel_type = pixel_type.common(raster.pixel_type);
            chunks[index] = Chunk::resident(raster);
        }
        Ok(Self {
            chunks,
            chunk_shape: self.chunk_shape.clone(),
            pixel_type,
        })
    }

    /// Same chunks presented with another pixel type. Used to widen label arrays.
    pub fn with_pixel_type(&self, pixel_type: PixelType) -> ChunkedArray {
        Self {
            chunks: self.chunks.clone(),
            chunk_shape: self.chunk_shape.clone(),
            pixel_type,
        }
    }

    /// Permutes the axes inside every chunk; axis 0 of the stack is untouched.
    pub fn permute_chunks(&self, axes: &[usize]) -> Result<ChunkedArray> {
        check_permutation(axes, self.chunk_shape.len())?;
        let chunks = self
            .chunks
            .iter()
            .map(|chunk| Chunk::Permuted {
                source: Box::new(chunk.clone()),
                axes: axes.to_vec(),
            })
            .collect();
        let chunk_shape = axes.iter().map(|axis| self.chunk_shape[*axis]).collect();
        Ok(Self {
            chunks,
            chunk_shape,
            pixel_type: self.pixel_type,
        })
    }
}

pub(super) fn check_permutation(axes: &[usize], ndim: usize) -> Result<()> {
    let mut seen = vec![false; ndim];
    for axis in axes {
        match seen.get_mut(*axis) {
            Some(flag) if !*flag => *flag = true,
            _ => {
                return Err(ArrayError::InvalidPermutation {
                    axes: axes.to_vec(),
                    ndim,
                });
            }
        }
    }
    if axes.len() != ndim {
        return Err(ArrayError::InvalidPermutation {
            axes: axes.to_vec(),
            ndim,
        });
    }
    Ok(())
}
