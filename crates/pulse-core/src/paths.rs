use crate::error::{PulseError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "pulse.yaml";
pub const MARKDOWN_EXT: &str = "md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// File name of `path` as a string, empty when it has none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File stem of `path` as a string, empty when it has none.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// All `*.md` regular files directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == MARKDOWN_EXT) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// The sole markdown file inside `dir`.
///
/// Zero or several candidates are reported as errors rather than guessed at.
pub fn find_target_document(dir: &Path) -> Result<PathBuf> {
    let mut found = markdown_files(dir)?;
    match found.len() {
        0 => Err(PulseError::NoTargetDocument(dir.to_path_buf())),
        1 => Ok(found.remove(0)),
        _ => Err(PulseError::AmbiguousTargetDocument {
            dir: dir.to_path_buf(),
            found,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
