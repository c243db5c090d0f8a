//! Typesetting search-path assembly.
//!
//! The engine resolves `\input`, `\include` and image references through the
//! `TEXINPUTS` environment variable: configured local disk roots first, then
//! the directory containing the original template source. Every entry is
//! normalized to the platform separator with a trailing separator (kpathsea
//! treats a bare directory and a trailing-separator directory differently),
//! and entries are joined with the platform path-list separator.

use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

/// Platform path-list separator.
#[cfg(windows)]
const LIST_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const LIST_SEPARATOR: &str = ":";

/// Normalize one search-path entry: platform separators, trailing separator.
fn normalize(path: &Path) -> String {
    let mut entry = path
        .to_string_lossy()
        .replace(['/', '\\'], MAIN_SEPARATOR_STR);
    if !entry.ends_with(MAIN_SEPARATOR_STR) {
        entry.push_str(MAIN_SEPARATOR_STR);
    }
    entry
}

/// Assemble the `TEXINPUTS` value: `roots` in order, then `source_dir`.
#[must_use]
pub fn assemble_search_paths(roots: &[PathBuf], source_dir: &Path) -> String {
    let mut entries: Vec<String> = Vec::with_capacity(roots.len() + 1);
    for root in roots {
        entries.push(normalize(root));
    }
    entries.push(normalize(source_dir));
    entries.join(LIST_SEPARATOR)
}
