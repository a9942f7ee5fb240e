use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// The main error type for kwtools operations.
///
/// Every variant here aborts the command it came from. Failures that only
/// affect a single file are collected as [`FileError`]s instead.
#[derive(Debug, Error)]
pub enum KwtoolsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input path does not exist: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Input path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Input path is not a file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Failed to traverse {path}: {message}")]
    Traversal { path: PathBuf, message: String },

    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Invalid rename pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read class name file {path}: {source}")]
    ClassFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read class mapping file {path}: {source}")]
    MappingRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse class mapping from {path}: {source}")]
    MappingParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid class mapping in {path}: {message}")]
    MappingInvalid { path: PathBuf, message: String },

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write COCO JSON to {path}: {source}")]
    CocoJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Category id {id} would be used by more than one category after remapping")]
    CocoDuplicateCategoryId { id: u64 },

    #[error("Invalid split ratios: {message}")]
    InvalidSplitRatios { message: String },

    #[error("Failed to serialize report as JSON: {0}")]
    ReportJson(#[source] serde_json::Error),
}

/// What went wrong with a single file during a batch operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FileErrorKind {
    Read,
    Write,
    Backup,
    Image,
    Hash,
    Copy,
    Move,
    Rename,
}

/// A failure confined to one file. The batch carries on without it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileError {
    pub kind: FileErrorKind,
    pub path: PathBuf,
    pub message: String,
}

impl FileError {
    pub fn new(kind: FileErrorKind, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Shorthand for wrapping an I/O failure on `path`.
    pub fn io(kind: FileErrorKind, path: &Path, err: &std::io::Error) -> Self {
        Self::new(kind, path, err.to_string())
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] {}: {}",
            self.kind,
            self.path.display(),
            self.message
        )
    }
}

/// Writes the "failed files" tail shared by every batch report.
pub(crate) fn write_error_section(
    f: &mut fmt::Formatter<'_>,
    errors: &[FileError],
    verbose: bool,
) -> fmt::Result {
    if errors.is_empty() {
        return Ok(());
    }

    writeln!(f)?;
    writeln!(f, "Files with errors: {}", errors.len())?;
    if verbose {
        for error in errors {
            writeln!(f, "  - {}", error)?;
        }
    }
    Ok(())
}
