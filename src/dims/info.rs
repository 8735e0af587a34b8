use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::array::Layer;
use crate::model::AxisName;

use super::{DimsError, Result};

pub const METADATA_KEY: &str = "dimension_info";
pub const LEGACY_METADATA_KEY: &str = "dimensions";

/// Which original axis each data axis came from, its semantic name and its
/// physical scale. All three vectors have one entry per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionInfo {
    pub index_labels: Vec<usize>,
    pub axis_names: Vec<AxisName>,
    pub axis_scale: Vec<f64>,
}

/// Dimension info as found in layer metadata: either the named form written by
/// this crate or a bare `[labels, names, scale]` triple.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredInfo {
    Named(DimensionInfo),
    Triple(Vec<Value>, Vec<AxisName>, Vec<f64>),
}

impl From<StoredInfo> for DimensionInfo {
    fn from(stored: StoredInfo) -> Self {
        match stored {
            StoredInfo::Named(info) => info,
            StoredInfo::Triple(labels, axis_names, axis_scale) => {
                let index_labels = labels
                    .iter()
                    .enumerate()
                    .map(|(position, label)| index_label(label).unwrap_or(position))
                    .collect();
                DimensionInfo {
                    index_labels,
                    axis_names,
                    axis_scale,
                }
            }
        }
    }
}

/// Accepts `3` as well as display strings such as `"3 [12]"`.
fn index_label(value: &Value) -> Option<usize> {
    match value {
        Value::Number(number) => number.as_u64().map(|value| value as usize),
        Value::String(text) => {
            let digits = text
                .trim()
                .chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>();
            digits.parse().ok()
        }
        _ => None,
    }
}

impl DimensionInfo {
    /// Right-aligned default names with unit scale.
    pub fn default_for_rank(rank: usize) -> Result<Self> {
        if !(2..=AxisName::CANONICAL.len()).contains(&rank) {
            return Err(DimsError::InvalidAxes(format!("for rank {rank}")));
        }
        Ok(Self {
            index_labels: (0..rank).collect(),
            axis_names: AxisName::defaults_for_rank(rank),
            axis_scale: vec![1.0; rank],
        })
    }

    pub fn rank(&self) -> usize {
        self.axis_names.len()
    }

    pub fn axis_position(&self, name: AxisName) -> Option<usize> {
        self.axis_names.iter().position(|axis| *axis == name)
    }

    pub fn has_axis(&self, name: AxisName) -> bool {
        self.axis_position(name).is_some()
    }

    /// Reads the info stored in a layer's metadata, if any.
    pub fn from_layer(layer: &Layer) -> Result<Option<Self>> {
        let stored = layer
            .metadata
            .get(METADATA_KEY)
            .or_else(|| layer.metadata.get(LEGACY_METADATA_KEY));
        let Some(stored) = stored else {
            return Ok(None);
        };
        let info = DimensionInfo::from(serde_json::from_value::<StoredInfo>(stored.clone())?);
        info.check_rank(layer.ndim())?;
        Ok(Some(info))
    }

    pub fn store(&self, layer: &mut Layer) -> Result<()> {
        layer
            .metadata
            .insert(METADATA_KEY.to_string(), serde_json::to_value(self)?);
        Ok(())
    }

    fn check_rank(&self, rank: usize) -> Result<()> {
        for found in [
            self.index_labels.len(),
            self.axis_names.len(),
            self.axis_scale.len(),
        ] {
            if found != rank {
                return Err(DimsError::RankMismatch {
                    expected: rank,
                    found,
                });
            }
        }
        Ok(())
    }
}

/// Stored dimension info of `layer`, or the right-aligned default when none
/// has been recorded yet.
pub fn infer(layer: &Layer) -> Result<DimensionInfo> {
    match DimensionInfo::from_layer(layer)? {
        Some(info) => Ok(info),
        None => DimensionInfo::default_for_rank(layer.ndim()),
    }
}

/// Infers and records dimension info on first inspection of a layer.
pub fn attach(layer: &mut Layer) -> Result<DimensionInfo> {
    if let Some(info) = DimensionInfo::from_layer(layer)? {
        return Ok(info);
    }
    let info = DimensionInfo::default_for_rank(layer.ndim())?;
    info.store(layer)?;
    Ok(info)
}

/// True when the names are unique and include both Y and X.
pub fn validate(axis_names: &[AxisName]) -> bool {
    let mut seen = Vec::with_capacity(axis_names.len());
    for name in axis_names {
        if seen.contains(name) {
            return false;
        }
        seen.push(*name);
    }
    seen.contains(&AxisName::Y) && seen.contains(&AxisName::X)
}

/// Permutation that moves the named axes into canonical C, T, Z, Y, X order.
pub fn transpose_order(axis_names: &[AxisName]) -> Vec<usize> {
    AxisName::CANONICAL
        .iter()
        .filter_map(|canonical| axis_names.iter().position(|name| name == canonical))
        .collect()
}

/// Renames the layer's axes, transposes the data into canonical order and
/// records the new dimension info. C and T axes always get scale 1. Invalid
/// input is rejected before the layer is touched.
pub fn reorder(
    layer: &mut Layer,
    axis_names: &[AxisName],
    axis_scale: Option<&[f64]>,
) -> Result<Vec<usize>> {
    let rank = layer.ndim();
    if axis_names.len() != rank {
        return Err(DimsError::RankMismatch {
            expected: rank,
            found: axis_names.len(),
        });
    }
    if !validate(axis_names) {
        let names = axis_names
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        return Err(DimsError::InvalidAxes(format!("[{names}]")));
    }
    let scale = axis_scale.unwrap_or(&layer.scale);
    if scale.len() != rank {
        return Err(DimsError::RankMismatch {
            expected: rank,
            found: scale.len(),
        });
    }
    if let Some(bad) = scale.iter().copied().find(|value| value.is_nan() || *value <= 0.0) {
        return Err(DimsError::InvalidScale(bad));
    }
    let scale = axis_names
        .iter()
        .zip(scale)
        .map(|(name, value)| if name.has_pinned_scale() { 1.0 } else { *value })
        .collect::<Vec<_>>();
    let previous = infer(layer)?;
    let order = transpose_order(axis_names);

    layer.data.permute(&order)?;
    let info = DimensionInfo {
        index_labels: order.iter().map(|axis| previous.index_labels[*axis]).collect(),
        axis_names: order.iter().map(|axis| axis_names[*axis]).collect(),
        axis_scale: order.iter().map(|axis| scale[*axis]).collect(),
    };
    layer.scale = info.axis_scale.clone();
    info.store(layer)?;
    debug!(
        "layer {} reordered with {:?} to {:?}",
        layer.name, order, info.axis_names
    );
    Ok(order)
}
