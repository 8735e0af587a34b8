use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::PixelType;

use super::LabelArray;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Labels,
    Image,
}

/// Named array with per-axis scale and a free-form metadata map.
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub kind: LayerKind,
    pub data: LabelArray,
    pub scale: Vec<f64>,
    pub metadata: BTreeMap<String, Value>,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: LayerKind, data: impl Into<LabelArray>) -> Self {
        let data = data.into();
        let scale = vec![1.0; data.ndim()];
        Self {
            name: name.into(),
            kind,
            data,
            scale,
            metadata: BTreeMap::new(),
        }
    }

    pub fn labels(name: impl Into<String>, data: impl Into<LabelArray>) -> Self {
        Self::new(name, LayerKind::Labels, data)
    }

    pub fn image(name: impl Into<String>, data: impl Into<LabelArray>) -> Self {
        Self::new(name, LayerKind::Image, data)
    }

    pub fn with_scale(mut self, scale: Vec<f64>) -> Self {
        self.scale = scale;
        self
    }

    pub fn is_labels(&self) -> bool {
        self.kind == LayerKind::Labels
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.data.shape()
    }

    pub fn pixel_type(&self) -> PixelType {
        self.data.pixel_type()
    }

    /// Converts a world position to integer data coordinates. The position may
    /// carry more leading axes than the layer; only the trailing ones are used.
    /// The result can lie outside the array.
    pub fn world_to_data(&self, position: &[f64]) -> Vec<i64> {
        let ndim = self.ndim();
        let offset = position.len().saturating_sub(ndim);
        let mut coords = vec![0; ndim.saturating_sub(position.len())];
        coords.extend(position[offset..].iter().enumerate().map(|(axis, value)| {
            let axis = axis + ndim - (position.len() - offset);
            let scale = self.scale.get(axis).copied().filter(|scale| *scale != 0.0).unwrap_or(1.0);
            (value / scale).floor() as i64
        }));
        coords
    }
}
