use std::path::{Path, PathBuf};

use crate::{
    assets::scan::glob_case_insensitive,
    foundation::error::{DollError, DollResult},
    schedule::frames::LayerSelection,
};

/// Locate the single source file for `selection` under `<data_dir>/<folder>`.
///
/// The name is matched case-insensitively. Zero or several matches is a resolution error.
pub fn resolve_layer_file(data_dir: &Path, selection: &LayerSelection<'_>) -> DollResult<PathBuf> {
    let dir = data_dir.join(selection.folder);
    let name = selection.file_name();
    let mut found = glob_case_insensitive(&dir, &glob::Pattern::escape(&name))?;

    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(DollError::resolve(format!(
            "no file matches '{}' in '{}'",
            name,
            dir.display()
        ))),
        n => Err(DollError::resolve(format!(
            "need exactly 1 file for '{}' in '{}', found {n}: {:?}",
            name,
            dir.display(),
            found
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/resolve.rs"]
mod tests;
