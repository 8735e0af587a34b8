use log::{debug, info};
use ndarray::{ArrayD, Zip};

use crate::array::Layer;
use crate::mapping::Granularity;
use crate::model::{AxisIndex, PixelType, Raster};

use super::{ClickEvent, CopyError, CopyOptions, CopyPlan, CopyPrompt, Result, resolve_copy};

/// Target region as it was before the last copy.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoSnapshot {
    pub region: Vec<AxisIndex>,
    pub previous: Raster,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CopyOutcome {
    /// Not a copy click, or the click hit background.
    Ignored,
    /// A prompt was answered with no.
    Declined,
    Copied {
        label: f64,
        promoted: Option<PixelType>,
    },
}

/// Copies clicked labels from a source layer into a target layer and keeps
/// one level of undo.
#[derive(Debug, Clone, Default)]
pub struct LabelCopier {
    pub options: CopyOptions,
    snapshot: Option<UndoSnapshot>,
}

impl LabelCopier {
    pub fn new(options: CopyOptions) -> Self {
        Self {
            options,
            snapshot: None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<&UndoSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn copy_label(
        &mut self,
        event: &ClickEvent,
        source: &Layer,
        target: &mut Layer,
        prompt: &dyn CopyPrompt,
    ) -> Result<CopyOutcome> {
        if !event.is_copy_trigger() {
            return Ok(CopyOutcome::Ignored);
        }
        let chunked = source.data.is_chunked() || target.data.is_chunked();
        if self.options.granularity == Granularity::Series && chunked && !prompt.confirm_slow_copy() {
            return Ok(CopyOutcome::Declined);
        }
        let Some(plan) = resolve_copy(event, source, target, &self.options)? else {
            debug!("click on background of {}, nothing to copy", source.name);
            return Ok(CopyOutcome::Ignored);
        };

        let mask = source
            .data
            .read_region(&plan.region.source_slices)?
            .equals_mask(plan.source_label);
        let mut current = target.data.read_region(&plan.region.target_slices)?;
        if mask.shape() != current.shape() {
            return Err(CopyError::RegionShape {
                source_shape: mask.shape().to_vec(),
                target_shape: current.shape().to_vec(),
            });
        }

        if let Some(next) = plan.promotion {
            if !prompt.confirm_promotion(plan.target_label, target.pixel_type(), next) {
                return Ok(CopyOutcome::Declined);
            }
            info!("converting {} from {} to {next}", target.name, target.pixel_type());
            target.data.promote(next)?;
            current = current.cast(next);
        }
        let merged = self.merge(&current, &mask, &plan);

        self.snapshot = Some(UndoSnapshot {
            region: plan.region.target_slices.clone(),
            previous: current,
        });
        target.data.write_region(&plan.region.target_slices, &merged)?;
        info!(
            "copied label {} of {} into {} as {}",
            plan.source_label, source.name, target.name, plan.target_label
        );
        Ok(CopyOutcome::Copied {
            label: plan.target_label,
            promoted: plan.promotion,
        })
    }

    fn merge(&self, current: &Raster, mask: &ArrayD<bool>, plan: &CopyPlan) -> Raster {
        let mut merged = current.clone();
        let preserve = self.options.preserve_target_labels;
        Zip::from(&mut merged.data).and(mask).for_each(|value, selected| {
            if preserve {
                if *selected && *value == 0.0 {
                    *value = plan.target_label;
                }
            } else if *selected {
                *value = plan.target_label;
            } else if *value == plan.original_label {
                *value = 0.0;
            }
        });
        merged
    }

    /// Restores the region overwritten by the last copy. Returns false when
    /// there is nothing to undo.
    pub fn undo(&mut self, target: &mut Layer) -> Result<bool> {
        let Some(snapshot) = self.snapshot.take() else {
            return Ok(false);
        };
        target.data.write_region(&snapshot.region, &snapshot.previous)?;
        debug!("restored previous region of {}", target.name);
        Ok(true)
    }
}
