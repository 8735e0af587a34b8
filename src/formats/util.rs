use std::path::Path;

use super::{IoError, Result};

const INVALID_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|', '[', ']'];

pub(crate) fn extension(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .ok_or_else(|| IoError::UnsupportedFormat(path.to_string_lossy().to_string()))?;
    Ok(ext)
}

/// Strips characters that are not allowed in file names on common platforms.
pub fn remove_invalid_chars(name: &str) -> String {
    name.chars()
        .filter(|value| !INVALID_NAME_CHARS.contains(value))
        .collect()
}

/// File name for slice `index` of a per-slice output directory. The index is
/// zero-padded so that lexical order equals slice order.
pub fn slice_file_name(basename: &str, index: usize) -> String {
    format!("{}{index:04}.tif", remove_invalid_chars(basename))
}

/// File name for time point `index` when a layer is saved split along axis 0.
pub fn time_point_file_name(basename: &str, index: usize) -> String {
    format!("{}_TP{index:04}.tif", remove_invalid_chars(basename))
}
