use ndarray::{Axis, Zip};
use serde_json::Value;

use crate::model::{PixelType, Raster};

use super::{
    OpOutput, OpSchema, Operation, Result, distance::signed_distance, util::check_rank,
};

/// Fills the slices between populated slices along axis 0 by blending the
/// signed distance fields of the two neighbouring key slices. Key slices are
/// rebuilt from their own field; slices outside the first and last key stay 0.
/// A stack with a single populated slice comes back with that slice binarised
/// and everything else empty, rather than all zeros.
pub fn interpolate_binary_mask(stack: &Raster) -> Raster {
    let mut output = Raster::zeros(stack.shape(), PixelType::U8);
    let keys = stack
        .data
        .axis_iter(Axis(0))
        .enumerate()
        .filter(|(_, slice)| slice.iter().any(|value| *value != 0.0))
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    if let [only] = keys.as_slice() {
        let mask = stack.data.index_axis(Axis(0), *only).mapv(|value| value != 0.0);
        output
            .data
            .index_axis_mut(Axis(0), *only)
            .assign(&mask.mapv(|inside| f64::from(u8::from(inside))));
        return output;
    }

    for pair in keys.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let field_at = |index: usize| {
            let mask = stack
                .data
                .index_axis(Axis(0), index)
                .mapv(|value| value != 0.0);
            signed_distance(&mask)
        };
        let start_field = field_at(start);
        let end_field = field_at(end);
        let span = (end - start) as f64;
        for position in start..=end {
            let alpha = (position - start) as f64 / span;
            let mut slice = output.data.index_axis_mut(Axis(0), position);
            Zip::from(&mut slice)
                .and(&start_field)
                .and(&end_field)
                .for_each(|out, from, to| {
                    let blended = (1.0 - alpha) * from + alpha * to;
                    *out = f64::from(u8::from(blended < 0.0));
                });
        }
    }
    output
}

#[derive(Debug, Clone, Copy)]
pub struct MaskInterpolateOp;

impl Operation for MaskInterpolateOp {
    fn name(&self) -> &'static str {
        "mask.interpolate"
    }

    fn schema(&self) -> OpSchema {
        OpSchema {
            name: self.name().to_string(),
            description: "Interpolate a binary mask between populated slices along the first axis.".to_string(),
            operand: false,
            params: vec![],
        }
    }

    fn execute(&self, input: &Raster, _operand: Option<&Raster>, _params: &Value) -> Result<OpOutput> {
        check_rank(self.name(), input, 3..=5, "3-5")?;
        Ok(OpOutput::raster_only(interpolate_binary_mask(input)))
    }

    fn output_suffix(&self) -> String {
        "interpolated".to_string()
    }
}
