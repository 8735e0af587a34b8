use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Raster;

use super::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub kind: String,
}

impl ParamSpec {
    pub fn new(name: &str, description: &str, required: bool, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required,
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpSchema {
    pub name: String,
    pub description: String,
    pub operand: bool,
    pub params: Vec<ParamSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MeasurementTable {
    pub values: BTreeMap<String, Value>,
}

/// Non-fatal conditions reported next to a completed result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpWarning {
    /// Every label of a non-empty input was removed.
    EmptySelection { operation: String },
}

impl fmt::Display for OpWarning {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpWarning::EmptySelection { operation } => {
                write!(formatter, "{operation} removed every label; the result is empty")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpOutput {
    pub raster: Raster,
    pub warnings: Vec<OpWarning>,
    pub measurements: Option<MeasurementTable>,
}

impl OpOutput {
    pub fn raster_only(raster: Raster) -> Self {
        Self {
            raster,
            warnings: Vec::new(),
            measurements: None,
        }
    }

    /// Adds an empty-selection warning when `input` had labels and the output has none.
    pub(crate) fn warn_if_emptied(mut self, operation: &str, input: &Raster) -> Self {
        if input.max_value() > 0.0 && self.raster.data.iter().all(|value| *value == 0.0) {
            self.warnings.push(OpWarning::EmptySelection {
                operation: operation.to_string(),
            });
        }
        self
    }
}

/// A pure transform over one slice or one whole array, optionally combined
/// with a second image.
pub trait Operation: Send + Sync {
    fn name(&self) -> &'static str;
    fn schema(&self) -> OpSchema;
    fn execute(&self, input: &Raster, operand: Option<&Raster>, params: &Value) -> Result<OpOutput>;

    /// Suffix used when naming output directories for this transform.
    fn output_suffix(&self) -> String {
        self.name().replace('.', "_")
    }
}
