use std::collections::BTreeMap;
use std::fs;

use tempfile::tempdir;

use super::{ArrayError, Chunk, ChunkedArray, LabelArray, Layer};
use crate::formats::{load_directory_as_lazy_stack, slice_file_name, write_slice};
use crate::model::{AxisIndex, PixelType, Raster};

fn filled(shape: &[usize], value: f64) -> Raster {
    let len = shape.iter().product::<usize>();
    Raster::from_shape_vec(shape, vec![value; len], PixelType::U8).expect("raster")
}

fn file_backed_stack(dir: &std::path::Path, depth: usize) -> ChunkedArray {
    for index in 0..depth {
        let path = dir.join(slice_file_name("labels", index));
        write_slice(&path, &filled(&[2, 3], index as f64 + 1.0), PixelType::U8)
            .expect("write slice");
    }
    load_directory_as_lazy_stack(dir).expect("lazy stack")
}

#[test]
fn chunked_from_raster_matches_source() {
    let raster = Raster::from_shape_vec(
        &[2, 2, 2],
        (0..8).map(f64::from).collect(),
        PixelType::U16,
    )
    .expect("raster");
    let chunked = ChunkedArray::from_raster(&raster).expect("chunked");
    assert_eq!(chunked.shape(), vec![2, 2, 2]);
    assert!(chunked.chunks().iter().all(Chunk::is_resident));
    assert_eq!(chunked.compute_all().expect("compute"), raster);
}

#[test]
fn patch_leaves_other_chunks_unevaluated() {
    let dir = tempdir().expect("tempdir");
    let stack = file_backed_stack(dir.path(), 3);
    fs::remove_file(dir.path().join(slice_file_name("labels", 2))).expect("remove slice");

    let patched = stack
        .patch(BTreeMap::from([(0, filled(&[2, 3], 9.0))]))
        .expect("patch without reading other slices");
    assert!(patched.chunks()[0].is_resident());
    assert!(!patched.chunks()[1].is_resident());
    assert_eq!(patched.compute(0).expect("slice 0").max_value(), 9.0);
    assert_eq!(patched.compute(1).expect("slice 1").max_value(), 2.0);
    assert!(patched.compute(2).is_err());
    assert_eq!(stack.compute(0).expect("original slice").max_value(), 1.0);
}

#[test]
fn chunked_write_swaps_handle_and_keeps_clones_intact() {
    let dir = tempdir().expect("tempdir");
    let mut array = LabelArray::from(file_backed_stack(dir.path(), 2));
    let before = array.clone();
    array
        .write_region(
            &[AxisIndex::Fixed(1), AxisIndex::Fixed(0), AxisIndex::Free],
            &filled(&[3], 7.0),
        )
        .expect("write region");
    assert_eq!(array.value_at(&[1, 0, 2]).expect("value"), 7.0);
    assert_eq!(array.value_at(&[1, 1, 2]).expect("value"), 2.0);
    assert_eq!(before.value_at(&[1, 0, 2]).expect("value"), 2.0);
    assert_eq!(array.max_value().expect("max"), 7.0);
}

#[test]
fn chunked_and_materialized_regions_agree() {
    let raster = Raster::from_shape_vec(
        &[3, 2, 2],
        (0..12).map(f64::from).collect(),
        PixelType::U8,
    )
    .expect("raster");
    let materialized = LabelArray::from(raster.clone());
    let chunked = LabelArray::from(ChunkedArray::from_raster(&raster).expect("chunked"));
    let regions = [
        vec![AxisIndex::Free, AxisIndex::Fixed(1), AxisIndex::Free],
        vec![AxisIndex::Fixed(2), AxisIndex::Free, AxisIndex::Free],
        vec![AxisIndex::Free, AxisIndex::Free, AxisIndex::Free],
    ];
    for region in &regions {
        assert_eq!(
            materialized.read_region(region).expect("materialized"),
            chunked.read_region(region).expect("chunked")
        );
    }
}

#[test]
fn write_slice_on_materialized_edits_in_place() {
    let mut array = LabelArray::from(Raster::zeros(&[2, 2, 2], PixelType::U8));
    array.write_slice(1, filled(&[2, 2], 3.0)).expect("write slice");
    assert_eq!(array.read_slice(1).expect("slice").max_value(), 3.0);
    assert_eq!(array.read_slice(0).expect("slice").max_value(), 0.0);
    assert!(!array.is_chunked());
}

#[test]
fn promote_widens_chunked_stack_without_reading() {
    let dir = tempdir().expect("tempdir");
    let mut array = LabelArray::from(file_backed_stack(dir.path(), 2));
    array.promote(PixelType::U16).expect("promote");
    assert_eq!(array.pixel_type(), PixelType::U16);
    assert_eq!(array.read_slice(0).expect("slice").pixel_type, PixelType::U16);
    assert!(array.promote(PixelType::I8).is_err());
}

#[test]
fn materialize_computes_every_chunk() {
    let dir = tempdir().expect("tempdir");
    let array = LabelArray::from(file_backed_stack(dir.path(), 3));
    let raster = array.materialize().expect("materialize");
    assert_eq!(raster.shape(), &[3, 2, 3]);
    assert_eq!(raster.value_at(&[2, 1, 1]).expect("value"), 3.0);
}

#[test]
fn permuted_chunks_transpose_lazily() {
    let raster = Raster::from_shape_vec(
        &[1, 2, 3],
        (0..6).map(f64::from).collect(),
        PixelType::U8,
    )
    .expect("raster");
    let chunked = ChunkedArray::from_raster(&raster).expect("chunked");
    let permuted = chunked.permute_chunks(&[1, 0]).expect("permute");
    assert_eq!(permuted.shape(), vec![1, 3, 2]);
    let slice = permuted.compute(0).expect("compute");
    assert_eq!(slice.value_at(&[2, 1]).expect("value"), 5.0);
    assert!(matches!(
        chunked.permute_chunks(&[0, 0]),
        Err(ArrayError::InvalidPermutation { .. })
    ));
}

#[test]
fn layer_world_to_data_uses_trailing_axes_and_scale() {
    let layer = Layer::labels("cells", Raster::zeros(&[4, 4], PixelType::U8))
        .with_scale(vec![2.0, 0.5]);
    assert_eq!(layer.world_to_data(&[3.0, 5.0, 1.2]), vec![2, 2]);
    assert_eq!(layer.world_to_data(&[-0.5, 0.0]), vec![-1, 0]);
    assert!(layer.is_labels());
}
