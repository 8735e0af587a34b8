use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use crate::model::Raster;

use super::{OpsError, Result};

pub(crate) fn neighborhood_offsets(
    rank: usize,
    radius: usize,
    include_origin: bool,
) -> Vec<Vec<isize>> {
    fn recurse(
        rank: usize,
        radius: isize,
        axis: usize,
        current: &mut Vec<isize>,
        output: &mut Vec<Vec<isize>>,
        include_origin: bool,
    ) {
        if axis == rank {
            if include_origin || current.iter().any(|value| *value != 0) {
                output.push(current.clone());
            }
            return;
        }

        for offset in -radius..=radius {
            current.push(offset);
            recurse(rank, radius, axis + 1, current, output, include_origin);
            current.pop();
        }
    }

    let mut offsets = Vec::new();
    recurse(
        rank,
        radius as isize,
        0,
        &mut Vec::new(),
        &mut offsets,
        include_origin,
    );
    offsets
}

/// Offsets of the 2 * rank face neighbours.
pub(crate) fn face_offsets(rank: usize) -> Vec<Vec<isize>> {
    neighborhood_offsets(rank, 1, false)
        .into_iter()
        .filter(|offset| offset.iter().filter(|value| **value != 0).count() == 1)
        .collect()
}

/// `point + offset` when it stays inside `shape`.
pub(crate) fn shifted(shape: &[usize], point: &[usize], offset: &[isize]) -> Option<Vec<usize>> {
    point
        .iter()
        .zip(offset)
        .zip(shape)
        .map(|((coord, delta), len)| {
            let next = *coord as isize + delta;
            (next >= 0 && (next as usize) < *len).then_some(next as usize)
        })
        .collect()
}

pub(crate) fn check_rank(
    operation: &'static str,
    raster: &Raster,
    supported: RangeInclusive<usize>,
    label: &'static str,
) -> Result<()> {
    if supported.contains(&raster.ndim()) {
        Ok(())
    } else {
        Err(OpsError::UnsupportedRank {
            operation,
            supported: label,
            found: raster.ndim(),
        })
    }
}

pub(crate) fn require_operand<'a>(
    operation: &'static str,
    input: &Raster,
    operand: Option<&'a Raster>,
) -> Result<&'a Raster> {
    let operand = operand.ok_or(OpsError::MissingOperand(operation))?;
    if operand.shape() != input.shape() {
        return Err(OpsError::OperandShape {
            image: input.shape().to_vec(),
            operand: operand.shape().to_vec(),
        });
    }
    Ok(operand)
}

/// Pixel count of every non-zero label.
pub(crate) fn label_counts(raster: &Raster) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for value in raster.data.iter().filter(|value| **value != 0.0) {
        *counts.entry(*value as i64).or_insert(0) += 1;
    }
    counts
}

/// Zeroes every label for which `keep` returns false.
pub(crate) fn retain_labels(raster: &Raster, keep: impl Fn(i64) -> bool) -> Raster {
    let data = raster
        .data
        .mapv(|value| if value != 0.0 && keep(value as i64) { value } else { 0.0 });
    Raster::new(data, raster.pixel_type)
}

pub(crate) fn labels_in(values: impl Iterator<Item = f64>) -> BTreeSet<i64> {
    values.filter(|value| *value != 0.0).map(|value| value as i64).collect()
}
