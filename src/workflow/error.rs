use crate::commands::OpsError;
use crate::engine::MutationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("recipe parse failure: {0}")]
    Parse(String),

    #[error("recipe I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("recipe serialization failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("recipe YAML serialization failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("step `{op}` cannot run in a recipe: {reason}")]
    UnsupportedStep { op: String, reason: &'static str },

    #[error("operation execution failed: {0}")]
    Operation(#[from] OpsError),

    #[error("step failed: {0}")]
    Mutation(#[from] MutationError),
}
