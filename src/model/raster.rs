use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Axis, IxDyn, Zip, stack};

use super::{AxisIndex, CoreError, PixelType, Result};

/// A fully resident n-dimensional array tagged with its logical pixel type.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub data: ArrayD<f64>,
    pub pixel_type: PixelType,
}

impl Raster {
    pub fn new(data: ArrayD<f64>, pixel_type: PixelType) -> Self {
        Self { data, pixel_type }
    }

    pub fn zeros(shape: &[usize], pixel_type: PixelType) -> Self {
        Self::new(ArrayD::zeros(IxDyn(shape)), pixel_type)
    }

    pub fn from_shape_vec(shape: &[usize], values: Vec<f64>, pixel_type: PixelType) -> Result<Self> {
        let found = values.len();
        let data = ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|_| {
            CoreError::ShapeMismatch {
                expected: shape.to_vec(),
                found: vec![found],
            }
        })?;
        Ok(Self::new(data, pixel_type))
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for value in iter {
            if value < min {
                min = value;
            }
            if value > max {
                max = value;
            }
        }
        Some((min, max))
    }

    pub fn max_value(&self) -> f64 {
        self.min_max().map(|(_, max)| max).unwrap_or(0.0)
    }

    pub fn nonzero_mask(&self) -> ArrayD<bool> {
        self.data.mapv(|value| value != 0.0)
    }

    /// Clip-and-cast copy in another pixel type.
    pub fn cast(&self, pixel_type: PixelType) -> Raster {
        Raster::new(
            self.data.mapv(|value| pixel_type.cast_value(value)),
            pixel_type,
        )
    }

    /// Widens the pixel type without touching values; fails if a value would not fit.
    pub fn promote(&mut self, pixel_type: PixelType) -> Result<()> {
        if let Some(value) = self.data.iter().copied().find(|value| !pixel_type.contains(*value)) {
            return Err(CoreError::ValueOutOfRange { value, pixel_type });
        }
        self.pixel_type = pixel_type;
        Ok(())
    }

    pub fn value_at(&self, coords: &[usize]) -> Result<f64> {
        self.check_point(coords)?;
        Ok(self.data[IxDyn(coords)])
    }

    pub fn index_axis0(&self, index: usize) -> Result<Raster> {
        self.check_axis(0, index)?;
        Ok(Raster::new(
            self.data.index_axis(Axis(0), index).to_owned(),
            self.pixel_type,
        ))
    }

    pub fn assign_axis0(&mut self, index: usize, values: &Raster) -> Result<()> {
        self.check_axis(0, index)?;
        let mut view = self.data.index_axis_mut(Axis(0), index);
        if view.shape() != values.shape() {
            return Err(CoreError::ShapeMismatch {
                expected: view.shape().to_vec(),
                found: values.shape().to_vec(),
            });
        }
        view.assign(&values.data);
        self.widen_for(values.pixel_type);
        Ok(())
    }

    pub fn read_region(&self, region: &[AxisIndex]) -> Result<Raster> {
        self.check_region(region)?;
        let mut view: ArrayViewD<'_, f64> = self.data.view();
        for (axis, index) in region.iter().enumerate().rev() {
            if let AxisIndex::Fixed(index) = index {
                view = view.index_axis_move(Axis(axis), *index);
            }
        }
        Ok(Raster::new(view.to_owned(), self.pixel_type))
    }

    pub fn write_region(&mut self, region: &[AxisIndex], values: &Raster) -> Result<()> {
        self.check_region(region)?;
        let mut view: ArrayViewMutD<'_, f64> = self.data.view_mut();
        for (axis, index) in region.iter().enumerate().rev() {
            if let AxisIndex::Fixed(index) = index {
                view = view.index_axis_move(Axis(axis), *index);
            }
        }
        if view.shape() != values.shape() {
            return Err(CoreError::ShapeMismatch {
                expected: view.shape().to_vec(),
                found: values.shape().to_vec(),
            });
        }
        view.assign(&values.data);
        self.widen_for(values.pixel_type);
        Ok(())
    }

    /// Stacks equally shaped slices along a new leading axis.
    pub fn stack(slices: &[Raster]) -> Result<Raster> {
        let first = slices.first().ok_or(CoreError::EmptyStack)?;
        let mut pixel_type = first.pixel_type;
        for slice in slices {
            if slice.shape() != first.shape() {
                return Err(CoreError::ShapeMismatch {
                    expected: first.shape().to_vec(),
                    found: slice.shape().to_vec(),
                });
            }
            pixel_type = pixel_type.common(slice.pixel_type);
        }
        let views = slices.iter().map(|slice| slice.data.view()).collect::<Vec<_>>();
        let data = stack(Axis(0), &views).map_err(|_| CoreError::ShapeMismatch {
            expected: first.shape().to_vec(),
            found: vec![slices.len()],
        })?;
        Ok(Raster::new(data, pixel_type))
    }

    /// Pixels equal to `value`.
    pub fn equals_mask(&self, value: f64) -> ArrayD<bool> {
        self.data.mapv(|pixel| pixel == value)
    }

    /// Zeroes every pixel where `keep` is false.
    pub fn masked(&self, keep: &ArrayD<bool>) -> Result<Raster> {
        if keep.shape() != self.shape() {
            return Err(CoreError::ShapeMismatch {
                expected: self.shape().to_vec(),
                found: keep.shape().to_vec(),
            });
        }
        let mut data = self.data.clone();
        Zip::from(&mut data).and(keep).for_each(|value, keep| {
            if !*keep {
                *value = 0.0;
            }
        });
        Ok(Raster::new(data, self.pixel_type))
    }

    fn widen_for(&mut self, incoming: PixelType) {
        if incoming != self.pixel_type {
            self.pixel_type = self.pixel_type.common(incoming);
        }
    }

    fn check_axis(&self, axis: usize, index: usize) -> Result<()> {
        let len = self.shape().get(axis).copied().unwrap_or(0);
        if index >= len {
            return Err(CoreError::IndexOutOfBounds { axis, index, len });
        }
        Ok(())
    }

    fn check_point(&self, coords: &[usize]) -> Result<()> {
        if coords.len() != self.ndim() {
            return Err(CoreError::RegionRankMismatch {
                region: coords.len(),
                ndim: self.ndim(),
            });
        }
        for (axis, index) in coords.iter().enumerate() {
            self.check_axis(axis, *index)?;
        }
        Ok(())
    }

    fn check_region(&self, region: &[AxisIndex]) -> Result<()> {
        if region.len() != self.ndim() {
            return Err(CoreError::RegionRankMismatch {
                region: region.len(),
                ndim: self.ndim(),
            });
        }
        for (axis, index) in region.iter().enumerate() {
            if let AxisIndex::Fixed(index) = index {
                self.check_axis(axis, *index)?;
            }
        }
        Ok(())
    }
}
