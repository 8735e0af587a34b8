use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::commands::MeasurementTable;
use crate::model::PixelType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepReport {
    pub op: String,
    pub duration_ms: u128,
    pub measurements: Vec<MeasurementTable>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineReport {
    pub pipeline_name: Option<String>,
    pub steps: Vec<StepReport>,
    pub final_measurements: BTreeMap<String, Value>,
    pub output_shape: Vec<usize>,
    pub output_pixel_type: PixelType,
}
