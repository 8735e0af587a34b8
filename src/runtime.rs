mod context;
#[cfg(feature = "dialogs")]
mod dialog;
mod error;
mod io_service;
mod layer_service;
mod ops_service;
mod pipeline_service;

#[cfg(test)]
mod tests;

pub use context::AppContext;
#[cfg(feature = "dialogs")]
pub use dialog::{NativeDirectoryPicker, NativePrompt};
pub use error::{AppError, Result};
pub use io_service::{IoService, SaveOptions};
pub use layer_service::LayerService;
pub use ops_service::{MaskFilterRequest, OpRun, OpsService};
pub use pipeline_service::PipelineService;
