use serde::{Deserialize, Serialize};

use crate::array::Layer;
use crate::mapping::{Granularity, MappedRegion, map_position};
use crate::model::{MAX_EXACT_INTEGER, PixelType};

use super::{ClickEvent, CopyError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOptions {
    pub granularity: Granularity,
    /// Reuse the clicked label value instead of `max(target) + 1`.
    #[serde(default)]
    pub preserve_source_value: bool,
    /// Only paint background pixels of the target.
    #[serde(default)]
    pub preserve_target_labels: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::Slice,
            preserve_source_value: false,
            preserve_target_labels: false,
        }
    }
}

/// Whether a label value fits in a pixel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFit {
    Fits,
    /// Fits after converting to this unsigned type.
    Promote(PixelType),
    Overflow,
}

/// Labels past [`MAX_EXACT_INTEGER`] overflow whatever the type.
pub fn check_value_dtype(value: f64, pixel_type: PixelType) -> LabelFit {
    if value.abs() > MAX_EXACT_INTEGER {
        return LabelFit::Overflow;
    }
    if pixel_type.is_float() || pixel_type.contains(value) {
        return LabelFit::Fits;
    }
    match PixelType::next_unsigned_for(value) {
        Some(next) => LabelFit::Promote(next),
        None => LabelFit::Overflow,
    }
}

/// Everything needed to commit one copy.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyPlan {
    pub region: MappedRegion,
    /// Label under the click in the source.
    pub source_label: f64,
    /// Value painted into the target.
    pub target_label: f64,
    /// Target label at the clicked point before the copy.
    pub original_label: f64,
    pub promotion: Option<PixelType>,
}

/// Resolves a click into a copy plan. Returns `None` when the click hits
/// background. Nothing is modified.
pub fn resolve_copy(
    event: &ClickEvent,
    source: &Layer,
    target: &Layer,
    options: &CopyOptions,
) -> Result<Option<CopyPlan>> {
    let coords = source.world_to_data(&event.position);
    let region = map_position(
        &source.shape(),
        &target.shape(),
        &coords,
        &event.dims_displayed,
        options.granularity,
        &event.current_step,
    )?;
    let source_point = coords.iter().map(|coord| *coord as usize).collect::<Vec<_>>();
    let source_label = source.data.value_at(&source_point)?;
    if source_label == 0.0 {
        return Ok(None);
    }

    let target_label = if options.preserve_source_value {
        source_label
    } else {
        target.data.max_value()? + 1.0
    };
    let promotion = match check_value_dtype(target_label, target.pixel_type()) {
        LabelFit::Fits => None,
        LabelFit::Promote(next) => Some(next),
        LabelFit::Overflow => {
            return Err(CopyError::LabelOverflow {
                label: target_label,
                pixel_type: target.pixel_type(),
            });
        }
    };
    let original_label = target.data.value_at(&region.target_coords)?;
    Ok(Some(CopyPlan {
        region,
        source_label,
        target_label,
        original_label,
        promotion,
    }))
}
