use serde_json::json;

use super::{
    DimensionInfo, DimsError, LEGACY_METADATA_KEY, METADATA_KEY, attach, infer, reorder,
    transpose_order, validate,
};
use crate::array::{ChunkedArray, LabelArray, Layer};
use crate::model::{AxisName, PixelType, Raster};

use AxisName::{C, T, X, Y, Z};

fn ramp_layer(shape: &[usize]) -> Layer {
    let len = shape.iter().product::<usize>();
    let raster = Raster::from_shape_vec(shape, (0..len).map(|v| v as f64).collect(), PixelType::U16)
        .expect("raster");
    Layer::labels("cells", raster)
}

#[test]
fn infer_defaults_to_right_aligned_names() {
    let layer = ramp_layer(&[2, 3, 4]);
    let info = infer(&layer).expect("infer");
    assert_eq!(info.axis_names, vec![Z, Y, X]);
    assert_eq!(info.axis_scale, vec![1.0; 3]);
    assert_eq!(info.index_labels, vec![0, 1, 2]);
    assert!(layer.metadata.is_empty());
}

#[test]
fn attach_records_info_once() {
    let mut layer = ramp_layer(&[2, 3]);
    let info = attach(&mut layer).expect("attach");
    assert!(layer.metadata.contains_key(METADATA_KEY));
    assert_eq!(infer(&layer).expect("infer"), info);
}

#[test]
fn stored_info_is_returned_unchanged() {
    let mut layer = ramp_layer(&[2, 3, 4]);
    layer.metadata.insert(
        LEGACY_METADATA_KEY.into(),
        json!([["0 [2]", "1 [3]", "2 [4]"], ["T", "Y", "X"], [1.0, 0.5, 0.5]]),
    );
    let info = infer(&layer).expect("infer");
    assert_eq!(
        info,
        DimensionInfo {
            index_labels: vec![0, 1, 2],
            axis_names: vec![T, Y, X],
            axis_scale: vec![1.0, 0.5, 0.5],
        }
    );
}

#[test]
fn validate_requires_unique_names_with_y_and_x() {
    assert!(validate(&[T, Z, Y, X]));
    assert!(validate(&[X, Y]));
    assert!(!validate(&[Z, Z, Y, X]));
    assert!(!validate(&[T, Z, X]));
}

#[test]
fn transpose_order_follows_canonical_axes() {
    assert_eq!(transpose_order(&[Y, X, Z]), vec![2, 0, 1]);
    assert_eq!(transpose_order(&[Z, C, Y, X]), vec![1, 0, 2, 3]);
    assert_eq!(transpose_order(&[T, Z, Y, X]), vec![0, 1, 2, 3]);
}

#[test]
fn reorder_transposes_data_and_pins_time_scale() {
    let mut layer = ramp_layer(&[2, 3, 4]);
    let before = layer.data.to_raster().expect("raster");
    let order = reorder(&mut layer, &[Y, X, T], Some(&[0.5, 0.25, 7.0])).expect("reorder");
    assert_eq!(order, vec![2, 0, 1]);
    assert_eq!(layer.shape(), vec![4, 2, 3]);
    assert_eq!(layer.scale, vec![1.0, 0.5, 0.25]);
    let after = layer.data.to_raster().expect("raster");
    assert_eq!(
        after.value_at(&[3, 1, 2]).expect("value"),
        before.value_at(&[1, 2, 3]).expect("value")
    );
    let info = infer(&layer).expect("infer");
    assert_eq!(info.axis_names, vec![T, Y, X]);
    assert_eq!(info.index_labels, vec![2, 0, 1]);
}

#[test]
fn invalid_reorder_has_no_side_effects() {
    let mut layer = ramp_layer(&[2, 3, 4]);
    let err = reorder(&mut layer, &[Z, Z, X], None).expect_err("must fail");
    assert!(matches!(err, DimsError::InvalidAxes(_)));
    let err = reorder(&mut layer, &[Z, Y, X], Some(&[1.0, 0.0, 1.0])).expect_err("must fail");
    assert!(matches!(err, DimsError::InvalidScale(_)));
    assert_eq!(layer.shape(), vec![2, 3, 4]);
    assert!(layer.metadata.is_empty());
}

#[test]
fn reorder_keeps_chunked_storage() {
    let raster = Raster::from_shape_vec(&[2, 2, 3], (0..12).map(f64::from).collect(), PixelType::U8)
        .expect("raster");
    let chunked = ChunkedArray::from_raster(&raster).expect("chunked");
    let mut layer = Layer::labels("stack", LabelArray::from(chunked));
    reorder(&mut layer, &[T, X, Y], None).expect("reorder");
    assert!(layer.data.is_chunked());
    assert_eq!(layer.shape(), vec![2, 3, 2]);
    assert_eq!(layer.data.value_at(&[1, 2, 0]).expect("value"), 8.0);
}
