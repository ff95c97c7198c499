use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Lists the files in `dir` whose extension matches `extension`, sorted by file name.
///
/// Sorting keeps runs reproducible: raw directory order differs between platforms.
pub fn list_corpus(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|err| PipelineError::io(dir, err))?;
    let wanted = extension.trim_start_matches('.');

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| PipelineError::io(dir, err))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Strips known stage prefixes from a file stem until none apply.
///
/// `aggregated_padded_song1` with prefixes `["aggregated_", "padded_"]` becomes `song1`.
pub fn recording_id(stem: &str, prefixes: &[&str]) -> String {
    let mut id = stem;
    loop {
        let stripped = prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .find_map(|prefix| id.strip_prefix(prefix));
        match stripped {
            Some(rest) if !rest.is_empty() => id = rest,
            _ => return id.to_string(),
        }
    }
}

/// File stem as UTF-8, falling back to a lossy rendering.
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
