use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::formats::remove_invalid_chars;

use super::{MutationError, Result};

/// Blocking source of an output location, standing in for a folder dialog.
/// `None` means the user cancelled.
pub trait DirectoryPicker {
    fn pick_directory(&self, title: &str) -> Option<PathBuf>;
}

/// Always answers with the same directory.
#[derive(Debug, Clone)]
pub struct FixedDirectory(pub PathBuf);

impl DirectoryPicker for FixedDirectory {
    fn pick_directory(&self, _title: &str) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Always cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelPicker;

impl DirectoryPicker for CancelPicker {
    fn pick_directory(&self, _title: &str) -> Option<PathBuf> {
        None
    }
}

/// Creates `root/{name}` with invalid characters stripped from `name`,
/// appending `_1` until the path is free. Existing directories are never reused.
pub fn create_output_dir(root: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
    let mut path = root.as_ref().join(remove_invalid_chars(name));
    while path.exists() {
        let mut next = path.into_os_string();
        next.push("_1");
        path = PathBuf::from(next);
    }
    fs::create_dir(&path).map_err(|source| MutationError::CreateDirectory {
        path: path.clone(),
        source,
    })?;
    debug!("created output directory {}", path.display());
    Ok(path)
}
