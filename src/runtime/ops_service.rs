use std::collections::BTreeMap;
use std::path::PathBuf;

use log::info;
use serde_json::{Value, json};

use crate::array::{LabelArray, Layer, LayerKind};
use crate::commands::{
    Arithmetic, ArithmeticOp, MaskFilterOp, MaskInterpolateOp, OpSchema, OpWarning, Operation,
    OpsError, PointFilterOp, find_operation, list_operations,
};
use crate::dims::infer;
use crate::engine::{
    Applied, ApplyRequest, CancelPicker, DirectoryPicker, MutationError, Outcome, SliceSelection,
    apply, create_output_dir, persist_stack,
};
use crate::formats::time_point_file_name;
use crate::mapping::MappingError;
use crate::model::AxisName;

use super::Result;

/// A transform result wrapped as a new layer next to its source.
#[derive(Debug, Clone)]
pub struct OpRun {
    pub layer: Layer,
    pub warnings: Vec<OpWarning>,
    pub output_dir: Option<PathBuf>,
}

/// Options for selecting or deleting labels under a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskFilterRequest {
    /// Keep the touched labels (`true`) or delete them.
    pub keep: bool,
    /// Time point used when a single-frame mask meets a stack.
    pub current_step: usize,
    /// Reuse a single-frame mask for every time point.
    pub all_time_points: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OpsService;

fn derived(source: &Layer, name: String, kind: LayerKind, data: LabelArray) -> Layer {
    let mut layer = Layer::new(name, kind, data);
    if layer.shape() == source.shape() {
        layer.scale = source.scale.clone();
        layer.metadata = source.metadata.clone();
    }
    layer
}

/// Applies `operation` to a copy of `layer.data`; the source layer is never touched.
fn run_on_copy(
    layer: &Layer,
    operation: &dyn Operation,
    request: ApplyRequest<'_>,
    picker: &dyn DirectoryPicker,
    name: String,
) -> Result<OpRun> {
    let mut primary = layer.data.clone();
    let Applied {
        outcome,
        warnings,
        output_dir,
        ..
    } = apply(&mut primary, operation, &request.in_place(true), picker)?;
    let data = match outcome {
        Outcome::Updated => primary,
        Outcome::Created(array) => array,
    };
    Ok(OpRun {
        layer: derived(layer, name, LayerKind::Labels, data),
        warnings,
        output_dir,
    })
}

impl OpsService {
    pub fn list(&self) -> Vec<OpSchema> {
        list_operations()
    }

    /// Runs a registered transform over `selection` of the layer.
    pub fn run(
        &self,
        layer: &Layer,
        op: &str,
        params: &Value,
        selection: SliceSelection,
        picker: &dyn DirectoryPicker,
    ) -> Result<OpRun> {
        let operation = find_operation(op)?;
        let name = format!("{}_{}", layer.name, operation.output_suffix());
        let request = ApplyRequest::new(&layer.name, params).selection(selection);
        run_on_copy(layer, operation.as_ref(), request, picker, name)
    }

    /// Runs a single-layer transform frame by frame on chunked or 4D stacks,
    /// and over the whole array otherwise.
    pub fn run_segmentation(
        &self,
        layer: &Layer,
        op: &str,
        params: &Value,
        picker: &dyn DirectoryPicker,
    ) -> Result<OpRun> {
        let selection = SliceSelection::for_segmentation(&layer.data);
        self.run(layer, op, params, selection, picker)
    }

    /// Keeps or deletes the labels of `image` that overlap `mask`.
    ///
    /// A mask with one axis less than the image is applied to the current
    /// time point, or to all of them. Masks of the image's own shape are
    /// applied frame by frame when the image has a time axis or is chunked.
    pub fn filter_by_mask(
        &self,
        image: &Layer,
        mask: &Layer,
        request: MaskFilterRequest,
        picker: &dyn DirectoryPicker,
    ) -> Result<OpRun> {
        let image_shape = image.shape();
        let mask_shape = mask.shape();
        let len = image_shape.first().copied().unwrap_or(0);
        let params = json!({});
        let base = ApplyRequest::new(&image.name, &params);

        let apply_request = if image_shape.len() == mask_shape.len() + 1
            && image_shape[1..] == mask_shape[..]
        {
            let selection = if request.all_time_points {
                SliceSelection::all(len)
            } else {
                SliceSelection::Single(request.current_step)
            };
            base.selection(selection)
                .operand(&mask.data, SliceSelection::Whole)
        } else if image_shape == mask_shape {
            let has_time = infer(image)?.has_axis(AxisName::T);
            if has_time || image.data.is_chunked() {
                base.selection(SliceSelection::all(len))
                    .operand(&mask.data, SliceSelection::all(len))
            } else {
                base.operand(&mask.data, SliceSelection::Whole)
            }
        } else {
            return Err(MappingError::IncompatibleDimensions {
                source_shape: mask_shape.clone(),
                target_shape: image_shape.clone(),
                compared: image_shape.len(),
            }
            .into());
        };
        let operation = MaskFilterOp { keep: request.keep };
        let name = format!("{}_filtered_labels", image.name);
        run_on_copy(image, &operation, apply_request, picker, name)
    }

    /// Keeps or deletes the labels found at `points`.
    ///
    /// On chunked or 4D images, points that carry a leading time index are
    /// grouped by it and each time point is filtered on its own.
    pub fn filter_by_points(&self, layer: &Layer, points: &[Vec<i64>], keep: bool) -> Result<OpRun> {
        let operation = PointFilterOp { keep };
        let suffix = if keep { "points_kept" } else { "points_removed" };
        let name = format!("{}_{suffix}", layer.name);
        let per_frame = points.first().is_some_and(|point| point.len() == layer.ndim())
            && (layer.ndim() == 4 || layer.data.is_chunked());

        if !per_frame {
            let params = json!({ "points": points });
            let request = ApplyRequest::new(&layer.name, &params);
            return run_on_copy(layer, &operation, request, &CancelPicker, name);
        }

        let mut frames: BTreeMap<usize, Vec<Vec<i64>>> = BTreeMap::new();
        for point in points {
            let Some((&frame, rest)) = point.split_first() else {
                continue;
            };
            let frame = usize::try_from(frame).map_err(|_| {
                OpsError::InvalidParams(format!("point {point:?} has a negative time index"))
            })?;
            frames.entry(frame).or_default().push(rest.to_vec());
        }

        let mut data = layer.data.clone();
        let mut warnings = Vec::new();
        for (frame, frame_points) in frames {
            let params = json!({ "points": frame_points });
            let request = ApplyRequest::new(&layer.name, &params)
                .selection(SliceSelection::Single(frame))
                .in_place(true);
            let applied = apply(&mut data, &operation, &request, &CancelPicker)?;
            warnings.extend(applied.warnings);
            if let Outcome::Created(array) = applied.outcome {
                data = array;
            }
        }
        Ok(OpRun {
            layer: derived(layer, name, LayerKind::Labels, data),
            warnings,
            output_dir: None,
        })
    }

    /// Interpolates a binary mask stack between its populated slices. A
    /// chunked stack is computed, interpolated and written to a new output
    /// directory, then reopened lazily.
    pub fn interpolate(&self, layer: &Layer, picker: &dyn DirectoryPicker) -> Result<OpRun> {
        let operation = MaskInterpolateOp;
        let name = format!("{}_{}", layer.name, operation.output_suffix());
        if !layer.data.is_chunked() {
            let params = Value::Null;
            let request = ApplyRequest::new(&layer.name, &params);
            return run_on_copy(layer, &operation, request, picker, name);
        }

        let stack = layer.data.to_raster()?;
        let output = operation.execute(&stack, None, &Value::Null)?;
        let root = picker
            .pick_directory("Select Output Folder")
            .ok_or(MutationError::NoOutputDirectorySelected)?;
        let dir = create_output_dir(root, &name)?;
        let basename = format!("{}_interpolation", layer.name);
        let data = persist_stack(&LabelArray::from(output.raster), &dir, |index| {
            time_point_file_name(&basename, index)
        })?;
        info!("interpolated {} into {}", layer.name, dir.display());
        Ok(OpRun {
            layer: derived(layer, name, LayerKind::Labels, data),
            warnings: output.warnings,
            output_dir: Some(dir),
        })
    }

    /// Combines two images pixel-wise. Chunked images are processed frame by
    /// frame with the operand frames paired by index.
    pub fn combine(
        &self,
        image: &Layer,
        operand: &Layer,
        operation: Arithmetic,
        adjust_dtype: bool,
        picker: &dyn DirectoryPicker,
    ) -> Result<OpRun> {
        let op = ArithmeticOp { operation };
        let params = json!({ "adjust_dtype": adjust_dtype });
        let mut request = ApplyRequest::new(&image.name, &params);
        request = if image.data.is_chunked() {
            let len = image.shape()[0];
            request
                .selection(SliceSelection::all(len))
                .operand(&operand.data, SliceSelection::all(len))
        } else {
            request.operand(&operand.data, SliceSelection::Whole)
        };
        let name = format!("{}_{}", image.name, op.output_suffix());
        let mut run = run_on_copy(image, &op, request, picker, name)?;
        if !operation.is_logical() {
            run.layer.kind = LayerKind::Image;
        }
        Ok(run)
    }
}
