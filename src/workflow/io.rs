use std::fs;
use std::path::Path;

use super::{PipelineReport, PipelineSpec, Result};

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "yaml" | "yml"))
}

/// Reads a JSON or YAML recipe, chosen by file extension.
pub fn load_spec(path: impl AsRef<Path>) -> Result<PipelineSpec> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let spec = if is_yaml(path) {
        serde_yaml::from_str::<PipelineSpec>(&raw)?
    } else {
        serde_json::from_str::<PipelineSpec>(&raw)?
    };
    spec.validate()?;
    Ok(spec)
}

pub fn save_report(path: impl AsRef<Path>, report: &PipelineReport) -> Result<()> {
    let path = path.as_ref();
    let serialized = if is_yaml(path) {
        serde_yaml::to_string(report)?
    } else {
        serde_json::to_string_pretty(report)?
    };
    fs::write(path, serialized)?;
    Ok(())
}
