use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PipelineError, Result};

/// A named sequence of single-layer transforms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineSpec {
    pub name: Option<String>,
    #[serde(default)]
    pub operations: Vec<OpInvocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpInvocation {
    pub op: String,
    #[serde(default)]
    pub params: Value,
    /// Indices along axis 0 to transform. When absent, chunked and 4D
    /// stacks are processed frame by frame and anything else as a whole.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slices: Option<Vec<usize>>,
}

impl PipelineSpec {
    pub fn validate(&self) -> Result<()> {
        if self.operations.is_empty() {
            return Err(PipelineError::Parse(
                "recipe must include at least one operation".to_string(),
            ));
        }
        for (index, step) in self.operations.iter().enumerate() {
            if step.op.trim().is_empty() {
                return Err(PipelineError::Parse(format!(
                    "operation at index {index} has an empty name"
                )));
            }
            if !step.params.is_object() && !step.params.is_null() {
                return Err(PipelineError::Parse(format!(
                    "operation `{}` parameters must be a JSON object",
                    step.op
                )));
            }
            if step.slices.as_ref().is_some_and(Vec::is_empty) {
                return Err(PipelineError::Parse(format!(
                    "operation `{}` selects no slices",
                    step.op
                )));
            }
        }
        Ok(())
    }
}
