//! Label analysis report types and terminal formatting.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{write_error_section, FileError};
use crate::labels::{ClassId, ClassNames};

/// Aggregate counters over one scan.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AnalysisSummary {
    /// Label files found.
    pub total_files: usize,
    /// Files without a single non-blank line.
    pub empty_files: usize,
    /// Files with content but no valid five-field record.
    pub no_object_files: usize,
    /// Valid records across all files.
    pub total_objects: usize,
    /// Files that could not be read.
    pub error_files: Vec<FileError>,
}

/// Per-class counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClassStat {
    /// Objects of this class.
    pub count: usize,
    /// Files containing at least one object of this class.
    pub files: usize,
}

/// One row of the per-class section, with its display name resolved.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassSummary {
    pub id: ClassId,
    pub name: String,
    pub count: usize,
    pub files: usize,
}

/// The result of analyzing a label directory.
#[derive(Clone, Debug)]
pub struct LabelAnalysis {
    pub summary: AnalysisSummary,
    pub classes: BTreeMap<ClassId, ClassStat>,
    pub class_names: ClassNames,
    /// Display-only: list failed files individually.
    pub(crate) verbose: bool,
}

impl LabelAnalysis {
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Per-class rows sorted by class id.
    pub fn class_summaries(&self) -> Vec<ClassSummary> {
        self.classes
            .iter()
            .map(|(id, stat)| ClassSummary {
                id: *id,
                name: self.class_names.label(*id),
                count: stat.count,
                files: stat.files,
            })
            .collect()
    }
}

impl Serialize for LabelAnalysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct View<'a> {
            summary: &'a AnalysisSummary,
            classes: Vec<ClassSummary>,
        }

        View {
            summary: &self.summary,
            classes: self.class_summaries(),
        }
        .serialize(serializer)
    }
}

impl fmt::Display for LabelAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Label statistics ===")?;
        writeln!(f, "Total files: {}", self.summary.total_files)?;
        writeln!(f, "Empty files: {}", self.summary.empty_files)?;
        writeln!(f, "Files without objects: {}", self.summary.no_object_files)?;
        writeln!(f, "Total objects: {}", self.summary.total_objects)?;

        write_error_section(f, &self.summary.error_files, self.verbose)?;

        writeln!(f)?;
        writeln!(f, "=== Per-class statistics ===")?;
        if self.classes.is_empty() {
            writeln!(f, "(no objects found)")?;
        }
        for row in self.class_summaries() {
            writeln!(f)?;
            writeln!(f, "Class {} {}:", row.id, row.name)?;
            writeln!(f, "  objects: {}", row.count)?;
            writeln!(f, "  files: {}", row.files)?;
        }
        Ok(())
    }
}
