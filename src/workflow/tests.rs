use std::fs;

use serde_json::json;

use crate::array::{ChunkedArray, Layer};
use crate::engine::{CancelPicker, FixedDirectory, MutationError};
use crate::model::{PixelType, Raster};

use super::{OpInvocation, PipelineError, PipelineSpec, load_spec, run_pipeline, save_report};

fn cells() -> Raster {
    let mut stack = Raster::zeros(&[2, 8, 8], PixelType::U16);
    for (slice, label) in [(0, 3.0), (1, 9.0)] {
        for row in 1..6 {
            for col in 1..6 {
                stack.data[[slice, row, col].as_slice()] = label;
            }
        }
    }
    stack.data[[0, 7, 7].as_slice()] = 4.0;
    stack
}

fn step(op: &str, params: serde_json::Value) -> OpInvocation {
    OpInvocation {
        op: op.to_string(),
        params,
        slices: None,
    }
}

#[test]
fn pipeline_executes_in_order() {
    let spec = PipelineSpec {
        name: Some("cleanup".to_string()),
        operations: vec![
            step("filter.size", json!({"min_pixels": 1})),
            step("threshold.range", json!({"min": 1, "max": 65535})),
        ],
    };
    let layer = Layer::labels("cells", cells()).with_scale(vec![1.0, 0.5, 0.5]);
    let (result, report) = run_pipeline(&spec, &layer, &CancelPicker).expect("pipeline");

    assert_eq!(report.steps.len(), 2);
    assert_eq!(report.pipeline_name.as_deref(), Some("cleanup"));
    assert_eq!(report.final_measurements["selected_pixels"], json!(50));
    assert_eq!(report.output_pixel_type, PixelType::U8);
    assert_eq!(result.name, "cells_processed");
    assert_eq!(result.scale, vec![1.0, 0.5, 0.5]);
    assert_eq!(result.data.value_at(&[0, 7, 7]).expect("value"), 0.0);
    assert_eq!(result.data.value_at(&[1, 3, 3]).expect("value"), 1.0);
    assert_eq!(layer.data.value_at(&[0, 7, 7]).expect("value"), 4.0);
}

#[test]
fn invalid_pipeline_is_rejected() {
    let layer = Layer::labels("cells", cells());
    let empty = PipelineSpec {
        name: None,
        operations: vec![],
    };
    assert!(matches!(
        run_pipeline(&empty, &layer, &CancelPicker),
        Err(PipelineError::Parse(_))
    ));

    let with_operand = PipelineSpec {
        name: None,
        operations: vec![step("math.add", json!({}))],
    };
    assert!(matches!(
        run_pipeline(&with_operand, &layer, &CancelPicker),
        Err(PipelineError::UnsupportedStep { .. })
    ));
}

#[test]
fn explicit_slices_limit_the_step() {
    let mut erode = step("labels.erode", json!({"diameter": 3}));
    erode.slices = Some(vec![1]);
    let spec = PipelineSpec {
        name: None,
        operations: vec![erode],
    };
    let layer = Layer::labels("cells", cells());
    let (result, _) = run_pipeline(&spec, &layer, &CancelPicker).expect("pipeline");
    assert_eq!(result.data.value_at(&[0, 1, 1]).expect("value"), 3.0);
    assert_eq!(result.data.value_at(&[1, 1, 1]).expect("value"), 0.0);
    assert_eq!(result.data.value_at(&[1, 3, 3]).expect("value"), 9.0);
}

#[test]
fn chunked_pipeline_writes_each_step_to_a_directory() {
    let root = tempfile::tempdir().expect("tempdir");
    let chunked = ChunkedArray::from_raster(&cells()).expect("chunked");
    let layer = Layer::labels("cells", chunked);
    let spec = PipelineSpec {
        name: None,
        operations: vec![step("labels.boundaries", json!({}))],
    };

    let err = run_pipeline(&spec, &layer, &CancelPicker).expect_err("cancelled");
    assert!(matches!(
        err,
        PipelineError::Mutation(MutationError::NoOutputDirectorySelected)
    ));

    let picker = FixedDirectory(root.path().to_path_buf());
    let (result, report) = run_pipeline(&spec, &layer, &picker).expect("pipeline");
    assert!(result.data.is_chunked());
    let dir = report.steps[0].output_dir.clone().expect("output dir");
    assert_eq!(dir, root.path().join("cells_labels_boundaries"));
    assert_eq!(result.data.value_at(&[1, 1, 1]).expect("value"), 9.0);
    assert_eq!(result.data.value_at(&[1, 3, 3]).expect("value"), 0.0);
}

#[test]
fn recipes_and_reports_round_trip_through_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let recipe = dir.path().join("recipe.yaml");
    fs::write(
        &recipe,
        "name: smooth\noperations:\n  - op: labels.median\n    params:\n      size: 3\n",
    )
    .expect("write recipe");
    let spec = load_spec(&recipe).expect("load");
    assert_eq!(spec.operations[0].op, "labels.median");
    assert_eq!(spec.operations[0].slices, None);

    let layer = Layer::labels("cells", cells());
    let (_, report) = run_pipeline(&spec, &layer, &CancelPicker).expect("pipeline");
    let report_path = dir.path().join("report.json");
    save_report(&report_path, &report).expect("save");
    let raw = fs::read_to_string(&report_path).expect("read report");
    assert!(raw.contains("\"pipeline_name\": \"smooth\""));

    fs::write(dir.path().join("empty.json"), r#"{"operations": []}"#).expect("write");
    assert!(load_spec(dir.path().join("empty.json")).is_err());
}
