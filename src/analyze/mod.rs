//! Label statistics.
//!
//! Scans a directory of YOLO label files and counts objects overall and per
//! class. Files that cannot be read are recorded and skipped.

mod report;

pub use report::{AnalysisSummary, ClassStat, ClassSummary, LabelAnalysis};

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{FileError, FileErrorKind, KwtoolsError};
use crate::labels::{read_label_file, ClassId, ClassNames, LabelOutcome};
use crate::progress::progress_bar;
use crate::scan::{scan_files, LABEL_PATTERN};

/// Options for label analysis.
#[derive(Clone, Debug, Default)]
pub struct AnalyzeOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Optional class-name file used to label the per-class section.
    pub class_names: Option<PathBuf>,
}

/// Analyze every `*.txt` label file under `dir`.
pub fn analyze_labels(dir: &Path, opts: &AnalyzeOptions) -> Result<LabelAnalysis, KwtoolsError> {
    // Load names up front so a bad path fails before any scanning.
    let class_names = match &opts.class_names {
        Some(path) => ClassNames::load(path)?,
        None => ClassNames::default(),
    };

    let files = scan_files(dir, &[LABEL_PATTERN], opts.recursive)?;
    info!("analyzing {} label file(s) in {}", files.len(), dir.display());

    let mut aggregator = LabelAggregator::default();
    let pb = progress_bar(files.len(), "Analyzing labels");
    for path in &files {
        aggregator.add_file(path);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(aggregator.finish(class_names))
}

/// Running counters for one scan.
#[derive(Debug, Default)]
pub struct LabelAggregator {
    summary: AnalysisSummary,
    classes: BTreeMap<ClassId, ClassStat>,
}

impl LabelAggregator {
    /// Read, parse and count one file.
    pub fn add_file(&mut self, path: &Path) {
        self.summary.total_files += 1;

        let set = match read_label_file(path) {
            Ok(set) => set,
            Err(err) => {
                warn!("failed to read {}: {}", path.display(), err);
                self.summary
                    .error_files
                    .push(FileError::new(FileErrorKind::Read, path, err.to_string()));
                return;
            }
        };

        for issue in &set.parsed.issues {
            debug!("{}: {}", path.display(), issue);
        }

        match set.outcome() {
            LabelOutcome::Empty => {
                debug!("empty file: {}", path.display());
                self.summary.empty_files += 1;
            }
            LabelOutcome::NoValidObjects => {
                debug!("no valid objects: {}", path.display());
                self.summary.no_object_files += 1;
            }
            LabelOutcome::Parsed(records) => {
                let mut seen = BTreeSet::new();
                for record in records {
                    self.classes.entry(record.class_id).or_default().count += 1;
                    seen.insert(record.class_id);
                }
                for class_id in seen {
                    self.classes.entry(class_id).or_default().files += 1;
                }
                self.summary.total_objects += records.len();
            }
        }
    }

    pub fn finish(self, class_names: ClassNames) -> LabelAnalysis {
        LabelAnalysis {
            summary: self.summary,
            classes: self.classes,
            class_names,
            verbose: false,
        }
    }
}
