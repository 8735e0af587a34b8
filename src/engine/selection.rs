use crate::array::LabelArray;

/// Which part of an array a transform sees along axis 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SliceSelection {
    /// The whole array at once.
    #[default]
    Whole,
    /// One slice.
    Single(usize),
    /// Several slices, visited in ascending order.
    Many(Vec<usize>),
}

impl SliceSelection {
    pub fn all(len: usize) -> Self {
        SliceSelection::Many((0..len).collect())
    }

    /// Default selection for a transform over a segmentation alone: every
    /// frame of a chunked or 4D stack, otherwise the whole array.
    pub fn for_segmentation(array: &LabelArray) -> Self {
        let shape = array.shape();
        if array.is_chunked() || shape.len() == 4 {
            SliceSelection::all(shape[0])
        } else {
            SliceSelection::Whole
        }
    }

    pub fn is_whole(&self) -> bool {
        matches!(self, SliceSelection::Whole)
    }
}
