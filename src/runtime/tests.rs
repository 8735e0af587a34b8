use serde_json::json;
use tempfile::tempdir;

use crate::array::{ChunkedArray, LayerKind, Layer};
use crate::commands::Arithmetic;
use crate::dims::METADATA_KEY;
use crate::engine::{CancelPicker, FixedDirectory};
use crate::formats::{read_slice, slice_file_name, write_slice};
use crate::mapping::{Granularity, MappingError};
use crate::model::{AxisName, PixelType, Raster};

use super::{AppContext, AppError, MaskFilterRequest, SaveOptions};

/// Frames of 4x4 with label 1 in the top-left and label 2 in the bottom-right corner.
fn two_labels(leading: &[usize]) -> Raster {
    let mut shape = leading.to_vec();
    shape.extend([4, 4]);
    let mut raster = Raster::zeros(&shape, PixelType::U16);
    let frames = leading.iter().product::<usize>();
    for frame in 0..frames {
        let mut prefix = Vec::new();
        let mut rest = frame;
        for len in leading.iter().rev() {
            prefix.insert(0, rest % len);
            rest /= len;
        }
        let mut at = |row: usize, col: usize, value: f64| {
            let mut index = prefix.clone();
            index.extend([row, col]);
            raster.data[index.as_slice()] = value;
        };
        at(0, 0, 1.0);
        at(3, 3, 2.0);
    }
    raster
}

fn point_mask(row: usize, col: usize) -> Raster {
    let mut mask = Raster::zeros(&[4, 4], PixelType::U8);
    mask.data[[row, col].as_slice()] = 1.0;
    mask
}

#[test]
fn loads_files_and_directories_with_dimension_info() {
    let dir = tempdir().expect("tempdir");
    let app = AppContext::new();

    let file = dir.path().join("cells.tif");
    write_slice(&file, &two_labels(&[3]), PixelType::U16).expect("write");
    let layer = app.io_service().load(&file).expect("load file");
    assert_eq!(layer.name, "cells");
    assert!(!layer.data.is_chunked());
    assert!(layer.metadata.contains_key(METADATA_KEY));

    let stack_dir = dir.path().join("stack");
    std::fs::create_dir(&stack_dir).expect("mkdir");
    for index in 0..2 {
        write_slice(
            stack_dir.join(slice_file_name("stack", index)),
            &two_labels(&[]),
            PixelType::U16,
        )
        .expect("write slice");
    }
    let layer = app.io_service().load(&stack_dir).expect("load dir");
    assert_eq!(layer.name, "stack");
    assert!(layer.data.is_chunked());
    assert_eq!(layer.shape(), vec![2, 4, 4]);
}

#[test]
fn saves_labels_whole_or_split_by_time_point() {
    let dir = tempdir().expect("tempdir");
    let app = AppContext::new();
    let layer = Layer::labels("cells", two_labels(&[3]));

    let split = SaveOptions {
        pixel_type: PixelType::U8,
        split_time_points: true,
        ..SaveOptions::default()
    };
    let written = app
        .io_service()
        .save_labels(&layer, dir.path(), &split)
        .expect("save split");
    assert_eq!(written.len(), 3);
    assert_eq!(written[2], dir.path().join("cells_TP0002.tif"));
    let frame = read_slice(&written[1]).expect("read");
    assert_eq!(frame.pixel_type, PixelType::U8);
    assert_eq!(frame.shape(), &[4, 4]);

    let whole = SaveOptions {
        file_name: Some("out.tif".to_string()),
        ..SaveOptions::default()
    };
    let written = app
        .io_service()
        .save_labels(&layer, dir.path(), &whole)
        .expect("save whole");
    assert_eq!(written, vec![dir.path().join("out.tif")]);
    let restored = read_slice(&written[0]).expect("read");
    assert_eq!(restored.shape(), &[3, 4, 4]);
    assert_eq!(restored.pixel_type, PixelType::U16);
}

#[test]
fn single_frame_mask_targets_current_or_every_time_point() {
    let app = AppContext::new();
    let image = Layer::labels("cells", two_labels(&[3]));
    let mask = Layer::labels("mask", point_mask(0, 0));

    let current = MaskFilterRequest {
        keep: true,
        current_step: 1,
        all_time_points: false,
    };
    let run = app
        .ops_service()
        .filter_by_mask(&image, &mask, current, &CancelPicker)
        .expect("filter");
    assert_eq!(run.layer.name, "cells_filtered_labels");
    assert_eq!(run.layer.data.value_at(&[1, 3, 3]).expect("value"), 0.0);
    assert_eq!(run.layer.data.value_at(&[0, 3, 3]).expect("value"), 2.0);
    assert_eq!(run.layer.data.value_at(&[2, 3, 3]).expect("value"), 2.0);

    let every = MaskFilterRequest {
        keep: false,
        current_step: 0,
        all_time_points: true,
    };
    let run = app
        .ops_service()
        .filter_by_mask(&image, &mask, every, &CancelPicker)
        .expect("filter");
    for frame in 0..3 {
        assert_eq!(run.layer.data.value_at(&[frame, 0, 0]).expect("value"), 0.0);
        assert_eq!(run.layer.data.value_at(&[frame, 3, 3]).expect("value"), 2.0);
    }
    assert_eq!(image.data.value_at(&[1, 0, 0]).expect("value"), 1.0);
}

#[test]
fn equal_shape_mask_pairs_frames_on_chunked_stacks() {
    let root = tempdir().expect("tempdir");
    let app = AppContext::new();
    let image = Layer::labels(
        "cells",
        ChunkedArray::from_raster(&two_labels(&[2])).expect("chunked"),
    );
    let mask = Layer::labels(
        "mask",
        Raster::stack(&[point_mask(0, 0), point_mask(3, 3)]).expect("stack"),
    );
    let request = MaskFilterRequest {
        keep: true,
        ..MaskFilterRequest::default()
    };
    let run = app
        .ops_service()
        .filter_by_mask(&image, &mask, request, &FixedDirectory(root.path().to_path_buf()))
        .expect("filter");
    assert!(run.layer.data.is_chunked());
    assert_eq!(run.output_dir, Some(root.path().join("cells_filter_mask_keep")));
    assert_eq!(run.layer.data.value_at(&[0, 0, 0]).expect("value"), 1.0);
    assert_eq!(run.layer.data.value_at(&[0, 3, 3]).expect("value"), 0.0);
    assert_eq!(run.layer.data.value_at(&[1, 0, 0]).expect("value"), 0.0);
    assert_eq!(run.layer.data.value_at(&[1, 3, 3]).expect("value"), 2.0);
}

#[test]
fn equal_shape_mask_without_time_axis_filters_whole_volume() {
    let app = AppContext::new();
    let image = Layer::labels("cells", two_labels(&[2]));
    let mut mask_values = Raster::zeros(&[2, 4, 4], PixelType::U8);
    mask_values.data[[1, 3, 3].as_slice()] = 1.0;
    let mask = Layer::labels("mask", mask_values);
    let run = app
        .ops_service()
        .filter_by_mask(&image, &mask, MaskFilterRequest::default(), &CancelPicker)
        .expect("filter");
    for frame in 0..2 {
        assert_eq!(run.layer.data.value_at(&[frame, 0, 0]).expect("value"), 1.0);
        assert_eq!(run.layer.data.value_at(&[frame, 3, 3]).expect("value"), 0.0);
    }

    let wrong = Layer::labels("mask", Raster::zeros(&[5, 5], PixelType::U8));
    let err = app
        .ops_service()
        .filter_by_mask(&image, &wrong, MaskFilterRequest::default(), &CancelPicker)
        .expect_err("incompatible");
    assert!(matches!(
        err,
        AppError::Mapping(MappingError::IncompatibleDimensions { .. })
    ));
}

#[test]
fn points_on_series_are_grouped_by_time_point() {
    let app = AppContext::new();
    let image = Layer::labels("cells", two_labels(&[2, 1]));
    let run = app
        .ops_service()
        .filter_by_points(&image, &[vec![1, 0, 3, 3]], true)
        .expect("filter");
    assert_eq!(run.layer.name, "cells_points_kept");
    assert_eq!(run.layer.data.value_at(&[1, 0, 0, 0]).expect("value"), 0.0);
    assert_eq!(run.layer.data.value_at(&[1, 0, 3, 3]).expect("value"), 2.0);
    assert_eq!(run.layer.data.value_at(&[0, 0, 0, 0]).expect("value"), 1.0);

    let plane = Layer::labels("plane", two_labels(&[]));
    let run = app
        .ops_service()
        .filter_by_points(&plane, &[vec![0, 0]], false)
        .expect("filter");
    assert_eq!(run.layer.name, "plane_points_removed");
    assert_eq!(run.layer.data.value_at(&[0, 0]).expect("value"), 0.0);
    assert_eq!(run.layer.data.value_at(&[3, 3]).expect("value"), 2.0);
}

#[test]
fn interpolating_chunked_stack_persists_to_new_directory() {
    let root = tempdir().expect("tempdir");
    let app = AppContext::new();
    let mut keys = Raster::zeros(&[5, 4, 4], PixelType::U8);
    for slice in [0, 4] {
        for row in 1..3 {
            for col in 1..3 {
                keys.data[[slice, row, col].as_slice()] = 1.0;
            }
        }
    }
    let layer = Layer::labels("mask", ChunkedArray::from_raster(&keys).expect("chunked"));

    let err = app
        .ops_service()
        .interpolate(&layer, &CancelPicker)
        .expect_err("cancelled");
    assert!(matches!(err, AppError::Mutation(_)));

    let run = app
        .ops_service()
        .interpolate(&layer, &FixedDirectory(root.path().to_path_buf()))
        .expect("interpolate");
    let dir = run.output_dir.expect("output dir");
    assert_eq!(dir, root.path().join("mask_interpolated"));
    assert!(dir.join("mask_interpolation_TP0002.tif").is_file());
    assert!(run.layer.data.is_chunked());
    assert_eq!(run.layer.data.value_at(&[2, 1, 1]).expect("value"), 1.0);
    assert_eq!(run.layer.data.value_at(&[2, 0, 0]).expect("value"), 0.0);
}

#[test]
fn combine_names_result_and_picks_layer_kind() {
    let app = AppContext::new();
    let mut left = Raster::zeros(&[4, 4], PixelType::U8);
    left.data[[0, 0].as_slice()] = 200.0;
    let mut right = Raster::zeros(&[4, 4], PixelType::U8);
    right.data[[0, 0].as_slice()] = 100.0;
    let image = Layer::labels("a", left);
    let operand = Layer::labels("b", right);

    let sum = app
        .ops_service()
        .combine(&image, &operand, Arithmetic::Add, true, &CancelPicker)
        .expect("add");
    assert_eq!(sum.layer.name, "a_math_add");
    assert_eq!(sum.layer.kind, LayerKind::Image);
    assert_eq!(sum.layer.pixel_type(), PixelType::U16);
    assert_eq!(sum.layer.data.value_at(&[0, 0]).expect("value"), 300.0);

    let both = app
        .ops_service()
        .combine(&image, &operand, Arithmetic::And, true, &CancelPicker)
        .expect("and");
    assert_eq!(both.layer.kind, LayerKind::Labels);
    assert_eq!(both.layer.data.value_at(&[0, 0]).expect("value"), 1.0);
}

#[test]
fn layer_service_reorders_and_lists_granularities() {
    let app = AppContext::new();
    let mut layer = Layer::labels("cells", Raster::zeros(&[2, 3, 4], PixelType::U8));
    let info = app.layer_service().inspect(&mut layer).expect("inspect");
    assert_eq!(info.axis_names, vec![AxisName::Z, AxisName::Y, AxisName::X]);

    let order = app
        .layer_service()
        .reorder(&mut layer, &[AxisName::Y, AxisName::X, AxisName::Z], None)
        .expect("reorder");
    assert_eq!(order, vec![2, 0, 1]);
    assert_eq!(layer.shape(), vec![4, 2, 3]);

    let series = Layer::labels("series", Raster::zeros(&[2, 2, 3, 4], PixelType::U8));
    assert_eq!(
        app.layer_service().granularities(&layer, &series),
        vec![Granularity::Slice, Granularity::Volume]
    );
}

#[test]
fn segmentation_run_creates_named_layer() {
    let app = AppContext::new();
    let mut volume = Raster::zeros(&[1, 7, 7], PixelType::U8);
    for row in 1..6 {
        for col in 1..6 {
            volume.data[[0, row, col].as_slice()] = 5.0;
        }
    }
    let layer = Layer::labels("cells", volume).with_scale(vec![2.0, 1.0, 1.0]);
    let run = app
        .ops_service()
        .run_segmentation(&layer, "labels.boundaries", &json!({}), &CancelPicker)
        .expect("run");
    assert_eq!(run.layer.name, "cells_labels_boundaries");
    assert_eq!(run.layer.scale, vec![2.0, 1.0, 1.0]);
    assert_eq!(run.layer.data.value_at(&[0, 1, 1]).expect("value"), 5.0);
    assert_eq!(run.layer.data.value_at(&[0, 3, 3]).expect("value"), 0.0);
    assert!(app.ops_service().list().len() >= 20);
}
