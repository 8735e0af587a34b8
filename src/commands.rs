mod arithmetic;
mod components;
mod distance;
mod error;
mod filters;
mod interpolate;
mod morphology;
mod params;
mod registry;
mod schema;
mod threshold;
mod util;

#[cfg(test)]
mod tests;

pub use arithmetic::{Arithmetic, ArithmeticOp};
pub use components::{ComponentsLabelOp, LargestClusterOp, LargestFragmentOp};
pub use error::{OpsError, Result};
pub use filters::{MaskFilterOp, PointFilterOp, SizeFilterOp};
pub use interpolate::{MaskInterpolateOp, interpolate_binary_mask};
pub use morphology::{LabelsBoundariesOp, LabelsDilateOp, LabelsErodeOp, LabelsMedianOp};
pub use registry::{execute_operation, find_operation, list_operations};
pub use schema::{MeasurementTable, OpOutput, OpSchema, OpWarning, Operation, ParamSpec};
pub use threshold::ThresholdRangeOp;

pub(crate) use params::get_points;
