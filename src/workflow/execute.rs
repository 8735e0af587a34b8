use std::collections::BTreeMap;
use std::time::Instant;

use log::info;

use crate::array::Layer;
use crate::commands::find_operation;
use crate::engine::{Applied, ApplyRequest, DirectoryPicker, Outcome, SliceSelection, apply};

use super::{PipelineError, PipelineReport, PipelineSpec, Result, StepReport};

/// Runs every step of `spec` in order on a copy of `layer`'s labels and
/// returns the result as a new layer named `{name}_processed`.
pub fn run_pipeline(
    spec: &PipelineSpec,
    layer: &Layer,
    picker: &dyn DirectoryPicker,
) -> Result<(Layer, PipelineReport)> {
    spec.validate()?;

    let mut current = layer.data.clone();
    let mut steps = Vec::with_capacity(spec.operations.len());
    let mut final_measurements = BTreeMap::new();

    for invocation in &spec.operations {
        let operation = find_operation(&invocation.op)?;
        if operation.schema().operand {
            return Err(PipelineError::UnsupportedStep {
                op: invocation.op.clone(),
                reason: "it needs a second image",
            });
        }
        let selection = match &invocation.slices {
            Some(slices) => SliceSelection::Many(slices.clone()),
            None => SliceSelection::for_segmentation(&current),
        };
        let request = ApplyRequest::new(&layer.name, &invocation.params)
            .selection(selection)
            .in_place(true);

        let started = Instant::now();
        let Applied {
            outcome,
            warnings,
            measurements,
            output_dir,
        } = apply(&mut current, operation.as_ref(), &request, picker)?;
        let duration_ms = started.elapsed().as_millis();
        if let Outcome::Created(array) = outcome {
            current = array;
        }
        for table in &measurements {
            for (key, value) in &table.values {
                final_measurements.insert(key.clone(), value.clone());
            }
        }
        info!("{} finished in {duration_ms} ms", invocation.op);
        steps.push(StepReport {
            op: invocation.op.clone(),
            duration_ms,
            measurements,
            warnings: warnings.iter().map(ToString::to_string).collect(),
            output_dir,
        });
    }

    let mut output = Layer::labels(format!("{}_processed", layer.name), current);
    if output.shape() == layer.shape() {
        output.scale = layer.scale.clone();
        output.metadata = layer.metadata.clone();
    }
    let report = PipelineReport {
        pipeline_name: spec.name.clone(),
        steps,
        final_measurements,
        output_shape: output.shape(),
        output_pixel_type: output.pixel_type(),
    };
    Ok((output, report))
}
