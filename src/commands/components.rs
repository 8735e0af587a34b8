use std::collections::{BTreeMap, VecDeque};

use ndarray::{ArrayD, Dimension, IxDyn};
use serde_json::{Value, json};

use crate::model::{PixelType, Raster};

use super::{
    MeasurementTable, OpOutput, OpSchema, Operation, Result,
    util::{check_rank, neighborhood_offsets, shifted},
};

/// Connected regions with full (face, edge and corner) connectivity. With
/// `by_value` two neighbours only join when they carry the same label;
/// otherwise all non-zero pixels count as foreground. Returns the component
/// id per pixel (0 for background) and the number of components.
pub(crate) fn label_components(raster: &Raster, by_value: bool) -> (ArrayD<usize>, usize) {
    let shape = raster.shape().to_vec();
    let offsets = neighborhood_offsets(shape.len(), 1, false);
    let mut labels = ArrayD::<usize>::zeros(IxDyn(&shape));
    let mut next_label = 1_usize;

    for (index, value) in raster.data.indexed_iter() {
        if *value == 0.0 || labels[index.clone()] != 0 {
            continue;
        }
        let seed = *value;
        let mut queue = VecDeque::new();
        queue.push_back(index.slice().to_vec());
        labels[IxDyn(index.slice())] = next_label;

        while let Some(point) = queue.pop_front() {
            for offset in &offsets {
                let Some(candidate) = shifted(&shape, &point, offset) else {
                    continue;
                };
                let candidate_idx = IxDyn(&candidate);
                let neighbour = raster.data[candidate_idx.clone()];
                let joins = if by_value {
                    neighbour == seed
                } else {
                    neighbour != 0.0
                };
                if !joins || labels[candidate_idx.clone()] != 0 {
                    continue;
                }
                labels[candidate_idx] = next_label;
                queue.push_back(candidate);
            }
        }
        next_label += 1;
    }
    (labels, next_label - 1)
}

fn component_sizes(labels: &ArrayD<usize>, count: usize) -> Vec<usize> {
    let mut sizes = vec![0_usize; count + 1];
    for label in labels.iter() {
        sizes[*label] += 1;
    }
    sizes
}

#[derive(Debug, Clone, Copy)]
pub struct ComponentsLabelOp;

impl Operation for ComponentsLabelOp {
    fn name(&self) -> &'static str {
        "components.label"
    }

    fn schema(&self) -> OpSchema {
        OpSchema {
            name: self.name().to_string(),
            description: "Relabel connected regions with sequential labels; regions of different value stay apart.".to_string(),
            operand: false,
            params: vec![],
        }
    }

    fn execute(&self, input: &Raster, _operand: Option<&Raster>, _params: &Value) -> Result<OpOutput> {
        check_rank(self.name(), input, 2..=4, "2-4")?;
        let (labels, count) = label_components(input, true);
        let pixel_type = PixelType::smallest_integer_for(0.0, count as f64);
        let raster = Raster::new(labels.mapv(|label| label as f64), pixel_type);
        let mut measurements = MeasurementTable::default();
        measurements
            .values
            .insert("component_count".to_string(), json!(count));
        Ok(OpOutput {
            raster,
            warnings: Vec::new(),
            measurements: Some(measurements),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LargestClusterOp;

impl Operation for LargestClusterOp {
    fn name(&self) -> &'static str {
        "components.largest_cluster"
    }

    fn schema(&self) -> OpSchema {
        OpSchema {
            name: self.name().to_string(),
            description: "Keep only the largest connected foreground cluster, with its original labels.".to_string(),
            operand: false,
            params: vec![],
        }
    }

    fn execute(&self, input: &Raster, _operand: Option<&Raster>, _params: &Value) -> Result<OpOutput> {
        check_rank(self.name(), input, 2..=4, "2-4")?;
        let (labels, count) = label_components(input, false);
        if count == 0 {
            return Ok(OpOutput::raster_only(input.clone()));
        }
        let sizes = component_sizes(&labels, count);
        let mut largest = 1;
        for (label, size) in sizes.iter().enumerate().skip(1) {
            if *size > sizes[largest] {
                largest = label;
            }
        }
        let keep = labels.mapv(|label| label == largest);
        Ok(OpOutput::raster_only(input.masked(&keep)?))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LargestFragmentOp;

impl Operation for LargestFragmentOp {
    fn name(&self) -> &'static str {
        "components.largest_fragment"
    }

    fn schema(&self) -> OpSchema {
        OpSchema {
            name: self.name().to_string(),
            description: "For every label keep only its largest connected fragment.".to_string(),
            operand: false,
            params: vec![],
        }
    }

    fn execute(&self, input: &Raster, _operand: Option<&Raster>, _params: &Value) -> Result<OpOutput> {
        check_rank(self.name(), input, 2..=4, "2-4")?;
        let (labels, count) = label_components(input, true);
        let sizes = component_sizes(&labels, count);
        let mut best: BTreeMap<i64, usize> = BTreeMap::new();
        for (index, component) in labels.indexed_iter() {
            if *component == 0 {
                continue;
            }
            let value = input.data[index.clone()] as i64;
            let entry = best.entry(value).or_insert(*component);
            if sizes[*component] > sizes[*entry] {
                *entry = *component;
            }
        }
        let mut kept = vec![false; count + 1];
        for component in best.values() {
            kept[*component] = true;
        }
        let keep = labels.mapv(|component| kept[component]);
        Ok(OpOutput::raster_only(input.masked(&keep)?))
    }
}
