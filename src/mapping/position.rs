use crate::model::AxisIndex;

use super::{Granularity, MappingError, Result};

/// Regions addressed by one click: where to read the mask in the source,
/// where to merge it in the target, and the exact target point under the click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRegion {
    pub source_slices: Vec<AxisIndex>,
    pub target_slices: Vec<AxisIndex>,
    pub target_coords: Vec<usize>,
}

/// Maps a clicked source position onto source and target regions.
///
/// `source_coords` are integer data coordinates in the source layer.
/// `dims_displayed` are viewer axes, the viewer having as many axes as the
/// larger of the two layers. `current_step` is the viewer's navigation index
/// and supplies the leading target coordinates when the target has one more
/// axis than the source.
pub fn map_position(
    source_shape: &[usize],
    target_shape: &[usize],
    source_coords: &[i64],
    dims_displayed: &[usize],
    granularity: Granularity,
    current_step: &[usize],
) -> Result<MappedRegion> {
    let source_rank = source_shape.len();
    let target_rank = target_shape.len();
    let delta = source_rank as i64 - target_rank as i64;
    let compared = granularity.axes();
    let incompatible = || MappingError::IncompatibleDimensions {
        source_shape: source_shape.to_vec(),
        target_shape: target_shape.to_vec(),
        compared,
    };
    if delta.abs() > 1 {
        return Err(incompatible());
    }
    let rank = source_rank.min(target_rank);
    if compared > rank {
        return Err(MappingError::GranularityUnavailable {
            granularity,
            required: compared,
            rank,
        });
    }
    if source_shape[source_rank - compared..] != target_shape[target_rank - compared..] {
        return Err(incompatible());
    }
    let coords = checked_coords(source_shape, source_coords)?;

    let mut source_slices = vec![AxisIndex::Free; source_rank];
    match granularity {
        Granularity::Slice => {
            let shift = delta.min(0);
            let displayed = dims_displayed
                .iter()
                .map(|dim| *dim as i64 + shift)
                .collect::<Vec<_>>();
            for (axis, slot) in source_slices.iter_mut().enumerate() {
                if !displayed.contains(&(axis as i64)) {
                    *slot = AxisIndex::Fixed(coords[axis]);
                }
            }
        }
        Granularity::Volume | Granularity::Series => {
            for (slot, coord) in source_slices
                .iter_mut()
                .zip(&coords)
                .take(source_rank - compared)
            {
                *slot = AxisIndex::Fixed(*coord);
            }
        }
    }

    let (target_slices, target_coords) = match delta {
        1 => (source_slices[1..].to_vec(), coords[1..].to_vec()),
        -1 => {
            let step = *current_step
                .first()
                .ok_or(MappingError::MissingNavigationStep { missing: 1 })?;
            if step >= target_shape[0] {
                return Err(MappingError::PositionOutOfBounds {
                    axis: 0,
                    coordinate: step as i64,
                    len: target_shape[0],
                });
            }
            let mut slices = vec![AxisIndex::Fixed(step)];
            slices.extend_from_slice(&source_slices);
            let mut point = vec![step];
            point.extend_from_slice(&coords);
            (slices, point)
        }
        _ => (source_slices.clone(), coords),
    };

    Ok(MappedRegion {
        source_slices,
        target_slices,
        target_coords,
    })
}

fn checked_coords(shape: &[usize], coords: &[i64]) -> Result<Vec<usize>> {
    if coords.len() != shape.len() {
        return Err(MappingError::CoordinateRank {
            expected: shape.len(),
            found: coords.len(),
        });
    }
    coords
        .iter()
        .zip(shape)
        .enumerate()
        .map(|(axis, (coordinate, len))| {
            if *coordinate < 0 || *coordinate as usize >= *len {
                Err(MappingError::PositionOutOfBounds {
                    axis,
                    coordinate: *coordinate,
                    len: *len,
                })
            } else {
                Ok(*coordinate as usize)
            }
        })
        .collect()
}
