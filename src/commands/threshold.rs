use rayon::prelude::*;
use serde_json::{Value, json};

use crate::model::{PixelType, Raster};

use super::{
    MeasurementTable, OpOutput, OpSchema, Operation, OpsError, ParamSpec, Result,
    params::get_required_f64,
};

#[derive(Debug, Clone, Copy)]
pub struct ThresholdRangeOp;

impl Operation for ThresholdRangeOp {
    fn name(&self) -> &'static str {
        "threshold.range"
    }

    fn schema(&self) -> OpSchema {
        OpSchema {
            name: self.name().to_string(),
            description: "Binary mask of pixels inside an inclusive value range.".to_string(),
            operand: false,
            params: vec![
                ParamSpec::new("min", "lowest selected value (inclusive)", true, "float"),
                ParamSpec::new("max", "highest selected value (inclusive)", true, "float"),
            ],
        }
    }

    fn execute(&self, input: &Raster, _operand: Option<&Raster>, params: &Value) -> Result<OpOutput> {
        let min = get_required_f64(params, "min")?;
        let max = get_required_f64(params, "max")?;
        if min > max {
            return Err(OpsError::InvalidParams(format!(
                "`min` ({min}) is above `max` ({max})"
            )));
        }
        let mut values = input.data.iter().copied().collect::<Vec<_>>();
        values.par_iter_mut().for_each(|value| {
            *value = if *value >= min && *value <= max { 1.0 } else { 0.0 };
        });
        let selected = values.iter().filter(|value| **value != 0.0).count();
        let raster = Raster::from_shape_vec(input.shape(), values, PixelType::U8)?;

        let mut measurements = MeasurementTable::default();
        measurements
            .values
            .insert("selected_pixels".to_string(), json!(selected));
        Ok(OpOutput {
            raster,
            warnings: Vec::new(),
            measurements: Some(measurements),
        })
    }
}
