use crate::array::Layer;
use crate::dims::{DimensionInfo, attach, reorder};
use crate::mapping::Granularity;
use crate::model::AxisName;

use super::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct LayerService;

impl LayerService {
    /// Dimension info of `layer`, recording the default on first inspection.
    pub fn inspect(&self, layer: &mut Layer) -> Result<DimensionInfo> {
        Ok(attach(layer)?)
    }

    /// Renames and transposes the layer's axes; returns the permutation used.
    pub fn reorder(
        &self,
        layer: &mut Layer,
        axis_names: &[AxisName],
        axis_scale: Option<&[f64]>,
    ) -> Result<Vec<usize>> {
        Ok(reorder(layer, axis_names, axis_scale)?)
    }

    pub fn granularities(&self, source: &Layer, target: &Layer) -> Vec<Granularity> {
        Granularity::available(source.ndim(), target.ndim())
    }
}
