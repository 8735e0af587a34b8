use serde_json::json;

use crate::model::{PixelType, Raster};

use super::{OpWarning, OpsError, execute_operation, interpolate_binary_mask, list_operations};

fn raster(shape: &[usize], values: &[f64], pixel_type: PixelType) -> Raster {
    Raster::from_shape_vec(shape, values.to_vec(), pixel_type).expect("raster")
}

fn values(raster: &Raster) -> Vec<f64> {
    raster.data.iter().copied().collect()
}

fn square(size: usize, start: usize, side: usize, label: f64) -> Raster {
    let mut output = Raster::zeros(&[size, size], PixelType::U8);
    for row in start..start + side {
        for col in start..start + side {
            output.data[[row, col].as_slice()] = label;
        }
    }
    output
}

#[test]
fn contains_required_operations() {
    let names = list_operations()
        .into_iter()
        .map(|schema| schema.name)
        .collect::<Vec<_>>();
    for expected in [
        "labels.erode",
        "labels.dilate",
        "labels.boundaries",
        "components.label",
        "components.largest_cluster",
        "components.largest_fragment",
        "filter.size",
        "filter.mask.keep",
        "filter.mask.delete",
        "filter.points.keep",
        "filter.points.delete",
        "math.add",
        "math.divide",
        "math.or",
        "threshold.range",
        "mask.interpolate",
    ] {
        assert!(names.contains(&expected.to_string()), "missing {expected}");
    }
    let err = execute_operation("gaussian.blur", &square(3, 0, 1, 1.0), None, &json!({}))
        .expect_err("unknown");
    assert!(matches!(err, OpsError::UnknownOperation(_)));
}

#[test]
fn erode_shrinks_square_by_one_ring() {
    let input = square(9, 2, 5, 7.0);
    let output = execute_operation(
        "labels.erode",
        &input,
        None,
        &json!({"diameter": 3, "iterations": 1}),
    )
    .expect("erode");
    assert_eq!(output.raster, square(9, 3, 3, 7.0));
    assert!(output.warnings.is_empty());
}

#[test]
fn erode_fills_holes_before_eroding() {
    let mut input = square(9, 1, 7, 4.0);
    input.data[[4, 4].as_slice()] = 0.0;
    let output = execute_operation(
        "labels.erode",
        &input,
        None,
        &json!({"diameter": 3, "iterations": 1}),
    )
    .expect("erode");
    // the hole survives as background but no longer eats its neighbours
    assert_eq!(output.raster.data[[3, 4].as_slice()], 4.0);
    assert_eq!(output.raster.data[[4, 4].as_slice()], 0.0);
    assert_eq!(output.raster.data[[1, 1].as_slice()], 0.0);
}

#[test]
fn erode_rejects_unsupported_rank() {
    let input = Raster::zeros(&[2, 2, 4, 4], PixelType::U8);
    let err = execute_operation("labels.erode", &input, None, &json!({})).expect_err("rank");
    assert!(matches!(err, OpsError::UnsupportedRank { found: 4, .. }));
}

#[test]
fn dilate_repeats_expansion_from_previous_pass() {
    let input = square(5, 2, 1, 3.0);
    let once = execute_operation("labels.dilate", &input, None, &json!({"diameter": 1}))
        .expect("dilate");
    assert_eq!(values(&once.raster).iter().filter(|v| **v == 3.0).count(), 5);
    let twice = execute_operation(
        "labels.dilate",
        &input,
        None,
        &json!({"diameter": 1, "iterations": 2}),
    )
    .expect("dilate");
    assert_eq!(values(&twice.raster).iter().filter(|v| **v == 3.0).count(), 13);
}

#[test]
fn boundaries_keep_outline_only() {
    let input = square(5, 1, 3, 2.0);
    let output = execute_operation("labels.boundaries", &input, None, &json!({})).expect("bounds");
    assert_eq!(output.raster.data[[2, 2].as_slice()], 0.0);
    assert_eq!(output.raster.data[[1, 1].as_slice()], 2.0);
    assert_eq!(values(&output.raster).iter().filter(|v| **v == 2.0).count(), 8);
}

#[test]
fn median_removes_isolated_spike() {
    let input = square(5, 2, 1, 9.0);
    let output = execute_operation("labels.median", &input, None, &json!({"size": 3})).expect("median");
    assert!(values(&output.raster).iter().all(|v| *v == 0.0));
    assert_eq!(output.warnings.len(), 1);

    let flat = square(3, 0, 3, 5.0);
    let output = execute_operation("labels.median", &flat, None, &json!({"size": 3})).expect("median");
    assert_eq!(output.raster, flat);
}

#[test]
fn components_split_regions_by_value() {
    let input = raster(
        &[3, 3],
        &[
            1.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, //
            0.0, 2.0, 4.0, //
        ],
        PixelType::U16,
    );
    let output = execute_operation("components.label", &input, None, &json!({})).expect("label");
    let count = output
        .measurements
        .and_then(|table| table.values.get("component_count").cloned())
        .and_then(|value| value.as_u64())
        .expect("count");
    assert_eq!(count, 3);
    assert_eq!(output.raster.pixel_type, PixelType::U8);
    assert_eq!(values(&output.raster), vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 2.0, 3.0]);
}

#[test]
fn largest_cluster_and_fragment() {
    let input = raster(
        &[3, 4],
        &[
            1.0, 1.0, 0.0, 0.0, //
            2.0, 0.0, 0.0, 3.0, //
            0.0, 0.0, 0.0, 0.0, //
        ],
        PixelType::U8,
    );
    let cluster =
        execute_operation("components.largest_cluster", &input, None, &json!({})).expect("cluster");
    assert_eq!(
        values(&cluster.raster),
        vec![1.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    );

    let fragments = raster(&[2, 4], &[5.0, 5.0, 0.0, 5.0, 5.0, 0.0, 0.0, 0.0], PixelType::U8);
    let output = execute_operation("components.largest_fragment", &fragments, None, &json!({}))
        .expect("fragment");
    assert_eq!(values(&output.raster), vec![5.0, 5.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0]);
}

#[test]
fn size_filter_drops_small_labels_and_warns_when_empty() {
    let input = raster(&[2, 3], &[1.0, 1.0, 2.0, 3.0, 3.0, 3.0], PixelType::U8);
    let output = execute_operation("filter.size", &input, None, &json!({"min_pixels": 2})).expect("size");
    assert_eq!(values(&output.raster), vec![0.0, 0.0, 0.0, 3.0, 3.0, 3.0]);
    assert!(output.warnings.is_empty());

    let output = execute_operation("filter.size", &input, None, &json!({"min_pixels": 5})).expect("size");
    assert!(values(&output.raster).iter().all(|v| *v == 0.0));
    assert_eq!(
        output.warnings,
        vec![OpWarning::EmptySelection {
            operation: "filter.size".to_string()
        }]
    );
}

#[test]
fn mask_filter_keeps_or_deletes_touched_labels() {
    let image = raster(&[2, 3], &[1.0, 1.0, 2.0, 2.0, 2.0, 3.0], PixelType::U8);
    let mask = raster(&[2, 3], &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0], PixelType::U8);
    let kept = execute_operation("filter.mask.keep", &image, Some(&mask), &json!({})).expect("keep");
    assert_eq!(values(&kept.raster), vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    let deleted =
        execute_operation("filter.mask.delete", &image, Some(&mask), &json!({})).expect("delete");
    assert_eq!(values(&deleted.raster), vec![0.0, 0.0, 2.0, 2.0, 2.0, 3.0]);

    let err = execute_operation("filter.mask.keep", &image, None, &json!({})).expect_err("operand");
    assert!(matches!(err, OpsError::MissingOperand(_)));
}

#[test]
fn point_filter_uses_labels_under_points() {
    let image = raster(&[2, 3], &[1.0, 1.0, 2.0, 2.0, 2.0, 3.0], PixelType::U8);
    let params = json!({"points": [[0, 2]]});
    let kept = execute_operation("filter.points.keep", &image, None, &params).expect("keep");
    assert_eq!(values(&kept.raster), vec![0.0, 0.0, 2.0, 2.0, 2.0, 0.0]);
    let deleted = execute_operation("filter.points.delete", &image, None, &params).expect("delete");
    assert_eq!(values(&deleted.raster), vec![1.0, 1.0, 0.0, 0.0, 0.0, 3.0]);

    let err = execute_operation("filter.points.keep", &image, None, &json!({"points": [[2, 0]]}))
        .expect_err("out of bounds");
    assert!(matches!(err, OpsError::Core(_)));
}

#[test]
fn add_widens_or_clips_integer_results() {
    let left = raster(&[1, 2], &[200.0, 10.0], PixelType::U8);
    let right = raster(&[1, 2], &[100.0, 5.0], PixelType::U8);
    let widened = execute_operation("math.add", &left, Some(&right), &json!({})).expect("add");
    assert_eq!(widened.raster.pixel_type, PixelType::U16);
    assert_eq!(values(&widened.raster), vec![300.0, 15.0]);

    let clipped = execute_operation(
        "math.add",
        &left,
        Some(&right),
        &json!({"adjust_dtype": false}),
    )
    .expect("add");
    assert_eq!(clipped.raster.pixel_type, PixelType::U8);
    assert_eq!(values(&clipped.raster), vec![255.0, 15.0]);

    let full = raster(&[1, 1], &[255.0], PixelType::U8);
    let sum = execute_operation("math.add", &full, Some(&full), &json!({})).expect("add");
    assert_eq!(sum.raster.pixel_type, PixelType::U16);
}

#[test]
fn subtract_goes_signed_when_adjusted() {
    let left = raster(&[1, 1], &[1.0], PixelType::U8);
    let right = raster(&[1, 1], &[3.0], PixelType::U8);
    let output = execute_operation("math.subtract", &left, Some(&right), &json!({})).expect("sub");
    assert_eq!(output.raster.pixel_type, PixelType::I8);
    assert_eq!(values(&output.raster), vec![-2.0]);
    let clipped = execute_operation(
        "math.subtract",
        &left,
        Some(&right),
        &json!({"adjust_dtype": false}),
    )
    .expect("sub");
    assert_eq!(values(&clipped.raster), vec![0.0]);
}

#[test]
fn divide_handles_zero_and_type() {
    let left = raster(&[1, 2], &[6.0, 4.0], PixelType::U8);
    let right = raster(&[1, 2], &[3.0, 0.0], PixelType::U8);
    let kept = execute_operation(
        "math.divide",
        &left,
        Some(&right),
        &json!({"adjust_dtype": false}),
    )
    .expect("divide");
    assert_eq!(kept.raster.pixel_type, PixelType::U8);
    assert_eq!(values(&kept.raster), vec![2.0, 0.0]);
    let float = execute_operation("math.divide", &left, Some(&right), &json!({})).expect("divide");
    assert_eq!(float.raster.pixel_type, PixelType::F64);
    assert_eq!(values(&float.raster), vec![2.0, 0.0]);
}

#[test]
fn logical_operations_give_binary_u8() {
    let left = raster(&[2, 2], &[0.0, 2.0, 3.0, 0.0], PixelType::U16);
    let right = raster(&[2, 2], &[1.0, 1.0, 0.0, 0.0], PixelType::U8);
    let and = execute_operation("math.and", &left, Some(&right), &json!({})).expect("and");
    assert_eq!(values(&and.raster), vec![0.0, 1.0, 0.0, 0.0]);
    assert_eq!(and.raster.pixel_type, PixelType::U8);
    let or = execute_operation("math.or", &left, Some(&right), &json!({})).expect("or");
    assert_eq!(values(&or.raster), vec![1.0, 1.0, 1.0, 0.0]);
}

#[test]
fn threshold_is_inclusive() {
    let input = raster(&[1, 4], &[1.0, 5.0, 10.0, 11.0], PixelType::U16);
    let output =
        execute_operation("threshold.range", &input, None, &json!({"min": 5, "max": 10})).expect("threshold");
    assert_eq!(values(&output.raster), vec![0.0, 1.0, 1.0, 0.0]);
    assert_eq!(output.raster.pixel_type, PixelType::U8);
    let err = execute_operation("threshold.range", &input, None, &json!({"min": 3, "max": 1}))
        .expect_err("range");
    assert!(matches!(err, OpsError::InvalidParams(_)));
}

fn mask_stack(depth: usize, keys: &[usize]) -> Raster {
    let slice = square(9, 3, 3, 1.0);
    let slices = (0..depth)
        .map(|index| {
            if keys.contains(&index) {
                slice.clone()
            } else {
                Raster::zeros(&[9, 9], PixelType::U8)
            }
        })
        .collect::<Vec<_>>();
    Raster::stack(&slices).expect("stack")
}

#[test]
fn interpolation_fills_between_key_slices() {
    let output = interpolate_binary_mask(&mask_stack(5, &[0, 4]));
    for index in 1..4 {
        let slice = output.index_axis0(index).expect("slice");
        assert_eq!(slice, square(9, 3, 3, 1.0), "slice {index}");
    }
}

#[test]
fn interpolation_leaves_outer_slices_empty() {
    let output = interpolate_binary_mask(&mask_stack(6, &[1, 3]));
    for index in [0, 5] {
        assert_eq!(output.index_axis0(index).expect("slice").max_value(), 0.0);
    }
    assert_eq!(output.index_axis0(2).expect("slice").max_value(), 1.0);

    let single = interpolate_binary_mask(&mask_stack(3, &[1]));
    assert_eq!(single.index_axis0(1).expect("slice"), square(9, 3, 3, 1.0));
}
