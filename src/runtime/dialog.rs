use std::path::PathBuf;

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::copy::CopyPrompt;
use crate::engine::DirectoryPicker;
use crate::model::PixelType;

/// Native folder dialog.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDirectoryPicker;

impl DirectoryPicker for NativeDirectoryPicker {
    fn pick_directory(&self, title: &str) -> Option<PathBuf> {
        FileDialog::new().set_title(title).pick_folder()
    }
}

/// Native OK/Cancel message boxes for the copy engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePrompt;

fn confirm(title: &str, description: &str) -> bool {
    let answer = MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::OkCancel)
        .show();
    answer == MessageDialogResult::Ok
}

impl CopyPrompt for NativePrompt {
    fn confirm_promotion(&self, label: f64, from: PixelType, to: PixelType) -> bool {
        confirm(
            "Convert data type?",
            &format!(
                "Label {label} does not fit in the target's {from} data. Convert the target layer to {to}?"
            ),
        )
    }

    fn confirm_slow_copy(&self) -> bool {
        confirm(
            "Copy across all time points?",
            "Copying a label through every time point of a lazily loaded stack can be slow. Continue?",
        )
    }
}
