use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde_json::Value;

use crate::array::LabelArray;
use crate::commands::{MeasurementTable, OpWarning, Operation};
use crate::formats::{load_directory_as_lazy_stack, slice_file_name, write_slice};
use crate::model::Raster;

use super::{
    DirectoryPicker, MutationError, Result, SliceSelection, create_output_dir,
};

/// One call of a transform through the engine.
#[derive(Debug, Clone)]
pub struct ApplyRequest<'a> {
    pub params: &'a Value,
    pub operand: Option<&'a LabelArray>,
    pub selection: SliceSelection,
    /// How the operand is indexed. `Whole` reuses the full operand for every
    /// selected slice; `Many` is zipped pairwise with `selection`.
    pub operand_selection: SliceSelection,
    /// Edit a materialized primary directly instead of a copy.
    pub in_place: bool,
    /// Layer name used for output directories and slice files.
    pub basename: &'a str,
}

impl<'a> ApplyRequest<'a> {
    pub fn new(basename: &'a str, params: &'a Value) -> Self {
        Self {
            params,
            operand: None,
            selection: SliceSelection::Whole,
            operand_selection: SliceSelection::Whole,
            in_place: false,
            basename,
        }
    }

    pub fn selection(mut self, selection: SliceSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn operand(mut self, operand: &'a LabelArray, selection: SliceSelection) -> Self {
        self.operand = Some(operand);
        self.operand_selection = selection;
        self
    }

    pub fn in_place(mut self, in_place: bool) -> Self {
        self.in_place = in_place;
        self
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    /// The primary array was edited in place.
    Updated,
    /// A new array handle the caller must adopt.
    Created(LabelArray),
}

#[derive(Debug, Clone)]
pub struct Applied {
    pub outcome: Outcome,
    pub warnings: Vec<OpWarning>,
    /// One table per transform call that produced measurements, in call order.
    pub measurements: Vec<MeasurementTable>,
    pub output_dir: Option<PathBuf>,
}

impl Applied {
    /// The resulting array, given the primary passed to `apply`.
    pub fn into_array(self, primary: &LabelArray) -> LabelArray {
        match self.outcome {
            Outcome::Updated => primary.clone(),
            Outcome::Created(array) => array,
        }
    }
}

/// Operand for one primary slice: none, the same raster every time, or one
/// slice of the operand per primary slice.
enum OperandFrames<'a> {
    Absent,
    Fixed(Raster),
    Paired(&'a LabelArray),
}

impl OperandFrames<'_> {
    fn frame(&self, index: Option<usize>) -> Result<Option<Raster>> {
        Ok(match (self, index) {
            (OperandFrames::Absent, _) => None,
            (OperandFrames::Fixed(raster), _) => Some(raster.clone()),
            (OperandFrames::Paired(array), Some(index)) => Some(array.read_slice(index)?),
            (OperandFrames::Paired(array), None) => Some(array.to_raster()?),
        })
    }
}

/// Validated work list: primary slice with its operand slice, ascending.
struct Plan<'a> {
    pairs: Vec<(usize, Option<usize>)>,
    operand: OperandFrames<'a>,
}

fn check_bounds(indices: &[usize], len: usize) -> Result<()> {
    match indices.iter().find(|index| **index >= len) {
        Some(index) => Err(MutationError::SliceOutOfBounds { index: *index, len }),
        None => Ok(()),
    }
}

fn plan<'a>(primary: &LabelArray, request: &ApplyRequest<'a>) -> Result<Plan<'a>> {
    let len = primary.shape().first().copied().unwrap_or(0);
    let primary_indices = match &request.selection {
        SliceSelection::Whole => Vec::new(),
        SliceSelection::Single(index) => vec![*index],
        SliceSelection::Many(indices) => indices.clone(),
    };
    check_bounds(&primary_indices, len)?;

    let Some(operand) = request.operand else {
        if !request.operand_selection.is_whole() {
            return Err(MutationError::UnsupportedSelection(
                "operand indices given without an operand".to_string(),
            ));
        }
        let mut pairs = primary_indices.into_iter().map(|index| (index, None)).collect::<Vec<_>>();
        pairs.sort_by_key(|(index, _)| *index);
        return Ok(Plan {
            pairs,
            operand: OperandFrames::Absent,
        });
    };
    let operand_len = operand.shape().first().copied().unwrap_or(0);

    let (mut pairs, frames) = match (&request.selection, &request.operand_selection) {
        (SliceSelection::Whole, SliceSelection::Whole) => {
            (Vec::new(), OperandFrames::Paired(operand))
        }
        (SliceSelection::Whole, _) => {
            return Err(MutationError::UnsupportedSelection(
                "an indexed operand needs an indexed image".to_string(),
            ));
        }
        (_, SliceSelection::Whole) => (
            primary_indices.iter().map(|index| (*index, None)).collect(),
            OperandFrames::Fixed(operand.to_raster()?),
        ),
        (_, SliceSelection::Single(index)) => {
            check_bounds(&[*index], operand_len)?;
            (
                primary_indices.iter().map(|primary| (*primary, None)).collect(),
                OperandFrames::Fixed(operand.read_slice(*index)?),
            )
        }
        (_, SliceSelection::Many(indices)) => {
            if indices.len() != primary_indices.len() {
                return Err(MutationError::SelectionLength {
                    primary: primary_indices.len(),
                    operand: indices.len(),
                });
            }
            check_bounds(indices, operand_len)?;
            (
                primary_indices
                    .iter()
                    .zip(indices)
                    .map(|(primary, operand)| (*primary, Some(*operand)))
                    .collect(),
                OperandFrames::Paired(operand),
            )
        }
    };
    pairs.sort_by_key(|(index, _)| *index);
    Ok(Plan {
        pairs,
        operand: frames,
    })
}

fn report(operation: &dyn Operation, basename: &str, warnings: &[OpWarning]) {
    for warning in warnings {
        warn!("{basename}: {warning}");
    }
    debug!("{} finished on {basename}", operation.name());
}

/// Runs `operation` over `primary` following the request's selection.
///
/// * `Whole`: one call over the full array; chunked stacks are rejected.
/// * `Single(i)`: slice `i` is transformed and written back. A chunked stack
///   gets a new handle in which only slice `i` is replaced.
/// * `Many`: slices are visited in ascending order. A materialized array is
///   edited slice by slice. A chunked stack asks `picker` for a location
///   first, writes one file per slice into a fresh directory (unselected
///   slices unchanged) and is reloaded lazily from it in the common pixel
///   type of all slices. Cancelling the picker creates nothing.
pub fn apply(
    primary: &mut LabelArray,
    operation: &dyn Operation,
    request: &ApplyRequest<'_>,
    picker: &dyn DirectoryPicker,
) -> Result<Applied> {
    let plan = plan(primary, request)?;
    match &request.selection {
        SliceSelection::Whole => apply_whole(primary, operation, request, &plan),
        SliceSelection::Many(_) if primary.is_chunked() => {
            apply_to_directory(primary, operation, request, &plan, picker)
        }
        _ => apply_to_slices(primary, operation, request, &plan),
    }
}

fn apply_whole(
    primary: &mut LabelArray,
    operation: &dyn Operation,
    request: &ApplyRequest<'_>,
    plan: &Plan<'_>,
) -> Result<Applied> {
    let Some(input) = primary.as_raster() else {
        return Err(MutationError::WholeArrayOnChunked);
    };
    let operand = plan.operand.frame(None)?;
    let output = operation.execute(input, operand.as_ref(), request.params)?;
    report(operation, request.basename, &output.warnings);
    let result = LabelArray::from(output.raster);
    let outcome = if request.in_place {
        *primary = result;
        Outcome::Updated
    } else {
        Outcome::Created(result)
    };
    Ok(Applied {
        outcome,
        warnings: output.warnings,
        measurements: output.measurements.into_iter().collect(),
        output_dir: None,
    })
}

fn apply_to_slices(
    primary: &mut LabelArray,
    operation: &dyn Operation,
    request: &ApplyRequest<'_>,
    plan: &Plan<'_>,
) -> Result<Applied> {
    let mut copy = (!request.in_place || primary.is_chunked()).then(|| primary.clone());
    let target = match copy.as_mut() {
        Some(copy) => copy,
        None => &mut *primary,
    };
    let mut warnings = Vec::new();
    let mut measurements = Vec::new();
    for (index, operand_index) in &plan.pairs {
        let frame = target.read_slice(*index)?;
        let operand = plan.operand.frame(*operand_index)?;
        let output = operation.execute(&frame, operand.as_ref(), request.params)?;
        warnings.extend(output.warnings);
        measurements.extend(output.measurements);
        target.write_slice(*index, output.raster)?;
    }
    report(operation, request.basename, &warnings);
    let outcome = match copy {
        Some(array) => Outcome::Created(array),
        None => Outcome::Updated,
    };
    Ok(Applied {
        outcome,
        warnings,
        measurements,
        output_dir: None,
    })
}

fn apply_to_directory(
    primary: &LabelArray,
    operation: &dyn Operation,
    request: &ApplyRequest<'_>,
    plan: &Plan<'_>,
    picker: &dyn DirectoryPicker,
) -> Result<Applied> {
    let root = picker
        .pick_directory("Select Output Folder")
        .ok_or(MutationError::NoOutputDirectorySelected)?;
    let name = format!("{}_{}", request.basename, operation.output_suffix());
    let dir = create_output_dir(root, &name)?;
    let len = primary.shape().first().copied().unwrap_or(0);
    info!(
        "{}: {} of {len} slices of {} into {}",
        operation.name(),
        plan.pairs.len(),
        request.basename,
        dir.display()
    );

    let mut pixel_type = primary.pixel_type();
    let mut pending = plan.pairs.iter().peekable();
    let mut warnings = Vec::new();
    let mut measurements = Vec::new();
    for index in 0..len {
        let mut frame = primary.read_slice(index)?;
        while let Some((_, operand_index)) = pending.next_if(|(selected, _)| *selected == index) {
            let operand = plan.operand.frame(*operand_index)?;
            let output = operation.execute(&frame, operand.as_ref(), request.params)?;
            warnings.extend(output.warnings);
            measurements.extend(output.measurements);
            frame = output.raster;
        }
        pixel_type = pixel_type.common(frame.pixel_type);
        let path = dir.join(slice_file_name(request.basename, index));
        write_slice(&path, &frame, frame.pixel_type)?;
        debug!("wrote {}", path.display());
    }
    report(operation, request.basename, &warnings);
    // Files keep their own types; the stack is read back in the widest one.
    let array = load_directory_as_lazy_stack(&dir)?.with_pixel_type(pixel_type);
    Ok(Applied {
        outcome: Outcome::Created(LabelArray::from(array)),
        warnings,
        measurements,
        output_dir: Some(dir),
    })
}

/// Writes every slice of `array` along axis 0 into `dir`, named by
/// `file_name`, in ascending order, then reopens the directory lazily.
pub fn persist_stack(
    array: &LabelArray,
    dir: &Path,
    file_name: impl Fn(usize) -> String,
) -> Result<LabelArray> {
    let len = array.shape().first().copied().unwrap_or(0);
    for index in 0..len {
        let slice = array.read_slice(index)?;
        write_slice(dir.join(file_name(index)), &slice, slice.pixel_type)?;
    }
    let reloaded = load_directory_as_lazy_stack(dir)?.with_pixel_type(array.pixel_type());
    Ok(LabelArray::from(reloaded))
}
