mod apply;
mod error;
mod output;
mod selection;


pub use apply::{Applied, ApplyRequest, Outcome, apply, persist_stack};
pub use error::{MutationError, Result};
pub use output::{CancelPicker, DirectoryPicker, FixedDirectory, create_output_dir};
pub use selection::SliceSelection;
