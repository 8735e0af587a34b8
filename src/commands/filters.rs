use std::collections::BTreeSet;

use log::debug;
use ndarray::Zip;
use serde_json::Value;

use crate::model::Raster;

use super::{
    OpOutput, OpSchema, Operation, OpsError, ParamSpec, Result,
    params::{get_optional_usize, get_points},
    util::{label_counts, labels_in, require_operand, retain_labels},
};

/// Labels found under the non-zero pixels of `mask`.
pub(crate) fn labels_under_mask(image: &Raster, mask: &Raster) -> BTreeSet<i64> {
    let mut touched = BTreeSet::new();
    Zip::from(&image.data).and(&mask.data).for_each(|value, selected| {
        if *selected != 0.0 && *value != 0.0 {
            touched.insert(*value as i64);
        }
    });
    touched
}

/// Labels found exactly at `points`, each point giving one coordinate per axis.
pub(crate) fn labels_at_points(image: &Raster, points: &[Vec<i64>]) -> Result<BTreeSet<i64>> {
    let values = points
        .iter()
        .map(|point| {
            if point.len() != image.ndim() || point.iter().any(|coord| *coord < 0) {
                return Err(OpsError::InvalidParams(format!(
                    "point {point:?} does not address an image of shape {:?}",
                    image.shape()
                )));
            }
            let coords = point.iter().map(|coord| *coord as usize).collect::<Vec<_>>();
            image.value_at(&coords).map_err(OpsError::from)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(labels_in(values.into_iter()))
}

fn select(input: &Raster, touched: &BTreeSet<i64>, keep: bool) -> Raster {
    retain_labels(input, |label| touched.contains(&label) == keep)
}

#[derive(Debug, Clone, Copy)]
pub struct SizeFilterOp;

impl Operation for SizeFilterOp {
    fn name(&self) -> &'static str {
        "filter.size"
    }

    fn schema(&self) -> OpSchema {
        OpSchema {
            name: self.name().to_string(),
            description: "Remove labels whose pixel count is at or below `min_pixels`.".to_string(),
            operand: false,
            params: vec![ParamSpec::new(
                "min_pixels",
                "labels with this many pixels or fewer are removed",
                false,
                "usize",
            )],
        }
    }

    fn execute(&self, input: &Raster, _operand: Option<&Raster>, params: &Value) -> Result<OpOutput> {
        let threshold = get_optional_usize(params, "min_pixels", 0);
        let counts = label_counts(input);
        let dropped = counts.values().filter(|count| **count <= threshold).count();
        debug!("{}: dropping {dropped} of {} labels", self.name(), counts.len());
        let raster = retain_labels(input, |label| {
            counts.get(&label).is_some_and(|count| *count > threshold)
        });
        Ok(OpOutput::raster_only(raster).warn_if_emptied(self.name(), input))
    }
}

/// Keeps or deletes the labels touched by a second image's non-zero pixels.
#[derive(Debug, Clone, Copy)]
pub struct MaskFilterOp {
    pub keep: bool,
}

impl Operation for MaskFilterOp {
    fn name(&self) -> &'static str {
        if self.keep {
            "filter.mask.keep"
        } else {
            "filter.mask.delete"
        }
    }

    fn schema(&self) -> OpSchema {
        let description = if self.keep {
            "Keep only labels that overlap the non-zero pixels of the mask."
        } else {
            "Delete labels that overlap the non-zero pixels of the mask."
        };
        OpSchema {
            name: self.name().to_string(),
            description: description.to_string(),
            operand: true,
            params: vec![],
        }
    }

    fn execute(&self, input: &Raster, operand: Option<&Raster>, _params: &Value) -> Result<OpOutput> {
        let mask = require_operand(self.name(), input, operand)?;
        let touched = labels_under_mask(input, mask);
        Ok(OpOutput::raster_only(select(input, &touched, self.keep))
            .warn_if_emptied(self.name(), input))
    }
}

/// Keeps or deletes the labels found at the `points` parameter.
#[derive(Debug, Clone, Copy)]
pub struct PointFilterOp {
    pub keep: bool,
}

impl Operation for PointFilterOp {
    fn name(&self) -> &'static str {
        if self.keep {
            "filter.points.keep"
        } else {
            "filter.points.delete"
        }
    }

    fn schema(&self) -> OpSchema {
        let description = if self.keep {
            "Keep only labels found at the given points."
        } else {
            "Delete labels found at the given points."
        };
        OpSchema {
            name: self.name().to_string(),
            description: description.to_string(),
            operand: false,
            params: vec![ParamSpec::new(
                "points",
                "list of data coordinates, one integer per image axis",
                true,
                "points",
            )],
        }
    }

    fn execute(&self, input: &Raster, _operand: Option<&Raster>, params: &Value) -> Result<OpOutput> {
        let points = get_points(params, "points")?;
        let touched = labels_at_points(input, &points)?;
        Ok(OpOutput::raster_only(select(input, &touched, self.keep))
            .warn_if_emptied(self.name(), input))
    }
}
