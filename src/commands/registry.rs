use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::model::Raster;

use super::{
    Arithmetic, ArithmeticOp, ComponentsLabelOp, LabelsBoundariesOp, LabelsDilateOp,
    LabelsErodeOp, LabelsMedianOp, LargestClusterOp, LargestFragmentOp, MaskFilterOp,
    MaskInterpolateOp, OpOutput, OpSchema, Operation, OpsError, PointFilterOp, Result,
    SizeFilterOp, ThresholdRangeOp,
};

type Registry = HashMap<&'static str, Arc<dyn Operation>>;

fn register<O: Operation + 'static>(map: &mut Registry, operation: O) {
    map.insert(operation.name(), Arc::new(operation));
}

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: Registry = HashMap::new();
        register(&mut map, LabelsErodeOp);
        register(&mut map, LabelsDilateOp);
        register(&mut map, LabelsBoundariesOp);
        register(&mut map, LabelsMedianOp);
        register(&mut map, ComponentsLabelOp);
        register(&mut map, LargestClusterOp);
        register(&mut map, LargestFragmentOp);
        register(&mut map, SizeFilterOp);
        register(&mut map, MaskFilterOp { keep: true });
        register(&mut map, MaskFilterOp { keep: false });
        register(&mut map, PointFilterOp { keep: true });
        register(&mut map, PointFilterOp { keep: false });
        for operation in Arithmetic::ALL {
            register(&mut map, ArithmeticOp { operation });
        }
        register(&mut map, ThresholdRangeOp);
        register(&mut map, MaskInterpolateOp);
        map
    })
}

/// Looks up a registered operation by name.
pub fn find_operation(name: &str) -> Result<Arc<dyn Operation>> {
    registry()
        .get(name)
        .cloned()
        .ok_or_else(|| OpsError::UnknownOperation(name.to_string()))
}

pub fn list_operations() -> Vec<OpSchema> {
    let mut schemas = registry()
        .values()
        .map(|op| op.schema())
        .collect::<Vec<_>>();
    schemas.sort_by(|left, right| left.name.cmp(&right.name));
    schemas
}

pub fn execute_operation(
    name: &str,
    input: &Raster,
    operand: Option<&Raster>,
    params: &Value,
) -> Result<OpOutput> {
    find_operation(name)?.execute(input, operand, params)
}
