mod copier;
mod error;
mod event;
mod plan;
mod prompt;


pub use copier::{CopyOutcome, LabelCopier, UndoSnapshot};
pub use error::{CopyError, Result};
pub use event::{ClickEvent, Modifier};
pub use plan::{CopyOptions, CopyPlan, LabelFit, check_value_dtype, resolve_copy};
pub use prompt::{AutoConfirm, AutoDecline, CopyPrompt};
