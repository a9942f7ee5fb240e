//! Directory scanning shared by every command.
//!
//! Patterns are shell globs matched against the file name only, the same way
//! `ls *.txt` would, optionally descending into subdirectories.

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::KwtoolsError;

/// Default image patterns used by the splitter, converter and image stats.
pub const DEFAULT_IMAGE_PATTERNS: [&str; 2] = ["*.jpg", "*.png"];

/// Pattern for YOLO label files.
pub const LABEL_PATTERN: &str = "*.txt";

/// Collect regular files under `root` whose names match any of `patterns`.
///
/// The result is sorted and contains each path once, even when several
/// patterns match it.
pub fn scan_files<S: AsRef<str>>(
    root: &Path,
    patterns: &[S],
    recursive: bool,
) -> Result<Vec<PathBuf>, KwtoolsError> {
    ensure_dir(root)?;
    let patterns = compile_patterns(patterns)?;

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).max_depth(max_depth) {
        let entry = entry.map_err(|source| KwtoolsError::Traversal {
            path: root.to_path_buf(),
            message: source.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };

        if patterns.iter().any(|pattern| pattern.matches(name)) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Every regular file under `root`.
pub fn scan_all_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, KwtoolsError> {
    scan_files(root, &["*"], recursive)
}

/// Fail unless `path` is an existing directory.
pub fn ensure_dir(path: &Path) -> Result<(), KwtoolsError> {
    if !path.exists() {
        return Err(KwtoolsError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(KwtoolsError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>, KwtoolsError> {
    patterns
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            Pattern::new(raw).map_err(|source| KwtoolsError::InvalidPattern {
                pattern: raw.to_string(),
                source,
            })
        })
        .collect()
}
