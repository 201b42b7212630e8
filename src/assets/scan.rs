use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::foundation::error::{DollError, DollResult};

/// Case-insensitive match of `file_pattern` against the regular files directly inside `dir`.
///
/// `file_pattern` uses glob syntax (escape literal names with [`glob::Pattern::escape`]).
/// A missing `dir` yields no matches. Results are sorted.
pub fn glob_case_insensitive(dir: &Path, file_pattern: &str) -> DollResult<Vec<PathBuf>> {
    let pattern = glob::Pattern::new(file_pattern)
        .map_err(|e| DollError::resolve(format!("bad glob pattern '{file_pattern}': {e}")))?;
    let options = glob::MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let rd = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("list directory '{}'", dir.display()))
                .into());
        }
    };

    let mut paths = Vec::new();
    for entry in rd {
        let entry = entry.with_context(|| format!("list directory '{}'", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if pattern.matches_with(name, options) {
            paths.push(path);
        }
    }
    paths.sort();
    debug!(dir = %dir.display(), pattern = file_pattern, found = paths.len(), "scan");
    Ok(paths)
}

/// Sorted names of the immediate sub-directories of `dir`.
pub fn list_subdirs(dir: &Path) -> DollResult<Vec<String>> {
    let rd = std::fs::read_dir(dir)
        .map_err(|e| DollError::config(format!("cannot list data dir '{}': {e}", dir.display())))?;

    let mut names = Vec::new();
    for entry in rd.flatten() {
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/scan.rs"]
mod tests;
