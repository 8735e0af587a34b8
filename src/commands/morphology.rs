use std::collections::VecDeque;

use ndarray::{ArrayD, Axis, Dimension, IxDyn, Zip};
use serde_json::Value;

use crate::model::Raster;

use super::{
    OpOutput, OpSchema, Operation, OpsError, ParamSpec, Result,
    distance::distance_field,
    params::get_optional_usize,
    util::{check_rank, face_offsets, neighborhood_offsets, shifted},
};

/// Window offsets of a `size`-wide box centred the way an odd window is:
/// `-(size / 2) ..= size - 1 - size / 2`.
fn window(size: usize) -> (isize, isize) {
    let low = -((size / 2) as isize);
    (low, low + size as isize - 1)
}

/// Fills background regions that cannot be reached from the array border
/// through face-connected background pixels.
pub(crate) fn fill_holes(mask: &ArrayD<bool>) -> ArrayD<bool> {
    let shape = mask.shape().to_vec();
    let offsets = face_offsets(shape.len());
    let mut outside = ArrayD::<bool>::from_elem(IxDyn(&shape), false);
    let mut queue = VecDeque::new();

    for (index, inside) in mask.indexed_iter() {
        let point = index.slice();
        let on_border = point
            .iter()
            .zip(&shape)
            .any(|(coord, len)| *coord == 0 || *coord + 1 == *len);
        if !*inside && on_border {
            outside[IxDyn(point)] = true;
            queue.push_back(point.to_vec());
        }
    }
    while let Some(point) = queue.pop_front() {
        for offset in &offsets {
            let Some(candidate) = shifted(&shape, &point, offset) else {
                continue;
            };
            let idx = IxDyn(&candidate);
            if mask[idx.clone()] || outside[idx.clone()] {
                continue;
            }
            outside[idx] = true;
            queue.push_back(candidate);
        }
    }
    outside.mapv(|reached| !reached)
}

/// Binary erosion with an all-ones box of `size` per side; pixels outside the
/// array count as background.
pub(crate) fn erode_box(mask: &ArrayD<bool>, size: usize) -> ArrayD<bool> {
    let (low, high) = window(size);
    let mut eroded = mask.clone();
    for axis in 0..mask.ndim() {
        let source = eroded.clone();
        Zip::from(eroded.lanes_mut(Axis(axis)))
            .and(source.lanes(Axis(axis)))
            .par_for_each(|mut out, lane| {
                let values = lane.to_vec();
                let len = values.len() as isize;
                let mut filled = vec![0_usize; values.len() + 1];
                for (position, value) in values.iter().enumerate() {
                    filled[position + 1] = filled[position] + usize::from(*value);
                }
                for (position, slot) in out.iter_mut().enumerate() {
                    let start = position as isize + low;
                    let end = position as isize + high;
                    *slot = start >= 0
                        && end < len
                        && filled[end as usize + 1] - filled[start as usize] == size;
                }
            });
    }
    eroded
}

/// Grows every label into background pixels closer than `distance` to it,
/// taking the label of the nearest labelled pixel.
pub(crate) fn expand_labels(raster: &Raster, distance: f64) -> Raster {
    let field = distance_field(&raster.nonzero_mask());
    let flat = raster.data.iter().copied().collect::<Vec<_>>();
    let limit = distance * distance;
    let mut data = raster.data.clone();
    Zip::from(&mut data)
        .and(&field.squared)
        .and(&field.nearest)
        .for_each(|value, squared, nearest| {
            if *value == 0.0 && *squared <= limit && *nearest != usize::MAX {
                *value = flat[*nearest];
            }
        });
    Raster::new(data, raster.pixel_type)
}

/// Half-sample symmetric reflection of `position` into `0..len`.
fn reflect(position: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let wrapped = position.rem_euclid(period);
    if wrapped < len as isize {
        wrapped as usize
    } else {
        (period - 1 - wrapped) as usize
    }
}

pub(crate) fn median_filter(raster: &Raster, size: usize) -> Raster {
    let shape = raster.shape().to_vec();
    let (low, _) = window(size);
    let offsets = neighborhood_offsets(shape.len(), size.saturating_sub(1), true)
        .into_iter()
        .filter(|offset| offset.iter().all(|value| *value >= 0 && (*value as usize) < size))
        .collect::<Vec<_>>();
    let mut output = raster.data.clone();
    let mut window_values = Vec::with_capacity(offsets.len());
    for (index, slot) in output.indexed_iter_mut() {
        window_values.clear();
        for offset in &offsets {
            let coords = index
                .slice()
                .iter()
                .zip(offset)
                .zip(&shape)
                .map(|((coord, delta), len)| reflect(*coord as isize + delta + low, *len))
                .collect::<Vec<_>>();
            window_values.push(raster.data[IxDyn(&coords)]);
        }
        window_values.sort_by(f64::total_cmp);
        *slot = window_values[window_values.len() / 2];
    }
    Raster::new(output, raster.pixel_type)
}

/// Pixels whose value differs from at least one in-bounds face neighbour.
pub(crate) fn boundary_mask(raster: &Raster) -> ArrayD<bool> {
    let shape = raster.shape().to_vec();
    let offsets = face_offsets(shape.len());
    let mut mask = ArrayD::<bool>::from_elem(IxDyn(&shape), false);
    for (index, value) in raster.data.indexed_iter() {
        let point = index.slice();
        mask[IxDyn(point)] = offsets.iter().any(|offset| {
            shifted(&shape, point, offset)
                .is_some_and(|neighbour| raster.data[IxDyn(&neighbour)] != *value)
        });
    }
    mask
}

fn diameter_params() -> Vec<ParamSpec> {
    vec![
        ParamSpec::new("diameter", "structuring element size in pixels", false, "usize"),
        ParamSpec::new("iterations", "number of passes", false, "usize"),
    ]
}

fn diameter_and_iterations(params: &Value) -> Result<(usize, usize)> {
    let diameter = get_optional_usize(params, "diameter", 1);
    let iterations = get_optional_usize(params, "iterations", 1);
    if diameter == 0 || iterations == 0 {
        return Err(OpsError::InvalidParams(
            "`diameter` and `iterations` must be at least 1".to_string(),
        ));
    }
    Ok((diameter, iterations))
}

#[derive(Debug, Clone, Copy)]
pub struct LabelsErodeOp;

impl Operation for LabelsErodeOp {
    fn name(&self) -> &'static str {
        "labels.erode"
    }

    fn schema(&self) -> OpSchema {
        OpSchema {
            name: self.name().to_string(),
            description: "Fill holes in the foreground, erode it with a box element and keep the labels that survive.".to_string(),
            operand: false,
            params: diameter_params(),
        }
    }

    fn execute(&self, input: &Raster, _operand: Option<&Raster>, params: &Value) -> Result<OpOutput> {
        check_rank(self.name(), input, 2..=3, "2-3")?;
        let (diameter, iterations) = diameter_and_iterations(params)?;
        let mut mask = fill_holes(&input.nonzero_mask());
        for _ in 0..iterations {
            mask = erode_box(&mask, diameter);
        }
        Ok(OpOutput::raster_only(input.masked(&mask)?).warn_if_emptied(self.name(), input))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LabelsDilateOp;

impl Operation for LabelsDilateOp {
    fn name(&self) -> &'static str {
        "labels.dilate"
    }

    fn schema(&self) -> OpSchema {
        OpSchema {
            name: self.name().to_string(),
            description: "Expand labels into the background by `diameter` pixels, `iterations` times.".to_string(),
            operand: false,
            params: diameter_params(),
        }
    }

    fn execute(&self, input: &Raster, _operand: Option<&Raster>, params: &Value) -> Result<OpOutput> {
        check_rank(self.name(), input, 2..=3, "2-3")?;
        let (diameter, iterations) = diameter_and_iterations(params)?;
        let mut raster = input.clone();
        for _ in 0..iterations {
            raster = expand_labels(&raster, diameter as f64);
        }
        Ok(OpOutput::raster_only(raster))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LabelsBoundariesOp;

impl Operation for LabelsBoundariesOp {
    fn name(&self) -> &'static str {
        "labels.boundaries"
    }

    fn schema(&self) -> OpSchema {
        OpSchema {
            name: self.name().to_string(),
            description: "Keep the boundary pixels of every label with their value; interiors become 0.".to_string(),
            operand: false,
            params: vec![],
        }
    }

    fn execute(&self, input: &Raster, _operand: Option<&Raster>, _params: &Value) -> Result<OpOutput> {
        check_rank(self.name(), input, 2..=4, "2-4")?;
        let mask = boundary_mask(input);
        Ok(OpOutput::raster_only(input.masked(&mask)?))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LabelsMedianOp;

impl Operation for LabelsMedianOp {
    fn name(&self) -> &'static str {
        "labels.median"
    }

    fn schema(&self) -> OpSchema {
        OpSchema {
            name: self.name().to_string(),
            description: "Smooth labels with a median filter of the given window size.".to_string(),
            operand: false,
            params: vec![ParamSpec::new("size", "window size per axis", false, "usize")],
        }
    }

    fn execute(&self, input: &Raster, _operand: Option<&Raster>, params: &Value) -> Result<OpOutput> {
        check_rank(self.name(), input, 2..=3, "2-3")?;
        let size = get_optional_usize(params, "size", 3);
        if size == 0 {
            return Err(OpsError::InvalidParams("`size` must be at least 1".to_string()));
        }
        Ok(OpOutput::raster_only(median_filter(input, size)).warn_if_emptied(self.name(), input))
    }
}
