use std::path::Path;

use crate::array::Layer;
use crate::engine::DirectoryPicker;
use crate::workflow::{PipelineReport, PipelineSpec, load_spec, run_pipeline, save_report};

use super::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineService;

impl PipelineService {
    pub fn load_spec(&self, path: impl AsRef<Path>) -> Result<PipelineSpec> {
        Ok(load_spec(path)?)
    }

    pub fn run(
        &self,
        spec: &PipelineSpec,
        input: &Layer,
        picker: &dyn DirectoryPicker,
    ) -> Result<(Layer, PipelineReport)> {
        Ok(run_pipeline(spec, input, picker)?)
    }

    pub fn save_report(&self, path: impl AsRef<Path>, report: &PipelineReport) -> Result<()> {
        save_report(path, report)?;
        Ok(())
    }
}
