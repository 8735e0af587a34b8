use ndarray::{ArrayD, Zip};
use serde_json::Value;

use crate::model::{PixelType, Raster};

use super::{
    OpOutput, OpSchema, Operation, ParamSpec, Result, params::get_optional_bool,
    util::require_operand,
};

/// Binary pixel-wise operations between an image and an operand of equal shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arithmetic {
    Add,
    Subtract,
    Multiply,
    Divide,
    And,
    Or,
}

impl Arithmetic {
    pub const ALL: [Arithmetic; 6] = [
        Arithmetic::Add,
        Arithmetic::Subtract,
        Arithmetic::Multiply,
        Arithmetic::Divide,
        Arithmetic::And,
        Arithmetic::Or,
    ];

    /// Operation behind a registered `math.*` name.
    pub fn from_op_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|operation| ArithmeticOp { operation: *operation }.name() == name)
    }

    fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Arithmetic::Add => left + right,
            Arithmetic::Subtract => left - right,
            Arithmetic::Multiply => left * right,
            Arithmetic::Divide if right == 0.0 => 0.0,
            Arithmetic::Divide => left / right,
            Arithmetic::And => f64::from(u8::from(left != 0.0 && right != 0.0)),
            Arithmetic::Or => f64::from(u8::from(left != 0.0 || right != 0.0)),
        }
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Arithmetic::And | Arithmetic::Or)
    }
}

/// Chooses the result type of an arithmetic result holding `values`.
///
/// With `adjust` an integer image gets the smallest integer type holding the
/// observed range, a float image the common type of both inputs. Without it an
/// integer image is clipped back to its own type.
pub(crate) fn settle_type(
    values: &ArrayD<f64>,
    operation: Arithmetic,
    image: PixelType,
    operand: PixelType,
    adjust: bool,
) -> PixelType {
    if operation.is_logical() {
        return PixelType::U8;
    }
    if operation == Arithmetic::Divide {
        return if !adjust && image.is_integer() {
            image
        } else {
            PixelType::F64
        };
    }
    match (adjust, image.is_integer()) {
        (true, true) => {
            let raster = Raster::new(values.clone(), image);
            let (min, max) = raster.min_max().unwrap_or((0.0, 0.0));
            PixelType::smallest_integer_for(min.trunc(), max.trunc())
        }
        (false, true) => image,
        (_, false) => image.common(operand),
    }
}

pub(crate) fn combine(
    operation: Arithmetic,
    image: &Raster,
    operand: &Raster,
    adjust: bool,
) -> Raster {
    let values = Zip::from(&image.data)
        .and(&operand.data)
        .map_collect(|left, right| operation.apply(*left, *right));
    let pixel_type = settle_type(&values, operation, image.pixel_type, operand.pixel_type, adjust);
    Raster::new(values, image.pixel_type).cast(pixel_type)
}

#[derive(Debug, Clone, Copy)]
pub struct ArithmeticOp {
    pub operation: Arithmetic,
}

impl Operation for ArithmeticOp {
    fn name(&self) -> &'static str {
        match self.operation {
            Arithmetic::Add => "math.add",
            Arithmetic::Subtract => "math.subtract",
            Arithmetic::Multiply => "math.multiply",
            Arithmetic::Divide => "math.divide",
            Arithmetic::And => "math.and",
            Arithmetic::Or => "math.or",
        }
    }

    fn schema(&self) -> OpSchema {
        let description = match self.operation {
            Arithmetic::Add => "Add the operand to the image.",
            Arithmetic::Subtract => "Subtract the operand from the image.",
            Arithmetic::Multiply => "Multiply the image by the operand.",
            Arithmetic::Divide => "Divide the image by the operand; division by zero gives 0.",
            Arithmetic::And => "1 where both images are non-zero, else 0.",
            Arithmetic::Or => "1 where either image is non-zero, else 0.",
        };
        let params = if self.operation.is_logical() {
            vec![]
        } else {
            vec![ParamSpec::new(
                "adjust_dtype",
                "widen the result type instead of clipping to the image type (default true)",
                false,
                "bool",
            )]
        };
        OpSchema {
            name: self.name().to_string(),
            description: description.to_string(),
            operand: true,
            params,
        }
    }

    fn execute(&self, input: &Raster, operand: Option<&Raster>, params: &Value) -> Result<OpOutput> {
        let operand = require_operand(self.name(), input, operand)?;
        let adjust = get_optional_bool(params, "adjust_dtype", true);
        Ok(OpOutput::raster_only(combine(self.operation, input, operand, adjust)))
    }
}
