use std::fmt;

use serde::Serialize;

use crate::error::{write_error_section, FileError};

/// Outcome of rewriting a directory of label files.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RewriteReport {
    /// Label files found.
    pub total_files: usize,
    /// Files whose content changed and was written back.
    pub modified_files: usize,
    /// Files that could not be read, backed up or written.
    pub errors: Vec<FileError>,
    /// Display-only: list failed files individually.
    #[serde(skip)]
    pub(crate) verbose: bool,
}

impl RewriteReport {
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl fmt::Display for RewriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Result ===")?;
        writeln!(f, "Total files: {}", self.total_files)?;
        writeln!(f, "Modified files: {}", self.modified_files)?;
        write_error_section(f, &self.errors, self.verbose)
    }
}
