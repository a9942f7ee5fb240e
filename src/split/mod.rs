//! Train/val/test dataset splitting.
//!
//! Files are sorted, shuffled with a seeded RNG and cut by cumulative count,
//! so the same seed and the same input always give the same partition. The
//! test split takes whatever is left after train and val.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use crate::error::{write_error_section, FileError, FileErrorKind, KwtoolsError};
use crate::progress::progress_bar;
use crate::scan::{scan_files, DEFAULT_IMAGE_PATTERNS};

pub const DEFAULT_SEED: u64 = 42;

/// Fractions of the input that go to train and val; test gets the rest.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    /// Informational: test always absorbs the remainder.
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.7,
            val: 0.2,
            test: 0.1,
        }
    }
}

impl SplitRatios {
    /// Each ratio must be a finite number in `[0, 1]`.
    pub fn validate(&self) -> Result<(), KwtoolsError> {
        for (name, value) in [("train", self.train), ("val", self.val), ("test", self.test)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(KwtoolsError::InvalidSplitRatios {
                    message: format!("{} ratio {} must be between 0.0 and 1.0", name, value),
                });
            }
        }
        Ok(())
    }
}

/// Which files land in which split.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitPlan {
    pub train: Vec<PathBuf>,
    pub val: Vec<PathBuf>,
    pub test: Vec<PathBuf>,
}

impl SplitPlan {
    fn splits(&self) -> [(&'static str, &[PathBuf]); 3] {
        [
            ("train", &self.train),
            ("val", &self.val),
            ("test", &self.test),
        ]
    }
}

/// Shuffle `files` with `seed` and cut them into train/val/test.
pub fn plan_split(mut files: Vec<PathBuf>, ratios: &SplitRatios, seed: u64) -> SplitPlan {
    files.sort();
    let mut rng = StdRng::seed_from_u64(seed);
    files.shuffle(&mut rng);

    let total = files.len();
    let train_end = ((total as f64 * ratios.train) as usize).min(total);
    let val_end = (train_end + (total as f64 * ratios.val) as usize).min(total);

    let test = files.split_off(val_end);
    let val = files.split_off(train_end);
    SplitPlan {
        train: files,
        val,
        test,
    }
}

/// Options for [`split_dataset`].
#[derive(Clone, Debug)]
pub struct SplitOptions {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub ratios: SplitRatios,
    pub patterns: Vec<String>,
    pub seed: u64,
}

impl SplitOptions {
    pub fn new(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
            ratios: SplitRatios::default(),
            patterns: DEFAULT_IMAGE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            seed: DEFAULT_SEED,
        }
    }
}

/// Outcome of a split run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SplitReport {
    pub train: usize,
    pub val: usize,
    pub test: usize,
    pub errors: Vec<FileError>,
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "train: {} file(s)", self.train)?;
        writeln!(f, "val: {} file(s)", self.val)?;
        writeln!(f, "test: {} file(s)", self.test)?;
        write_error_section(f, &self.errors, true)
    }
}

/// Copy matching files from `data_dir` into `output_dir/{train,val,test}`.
///
/// Only the file name is kept at the destination.
pub fn split_dataset(opts: &SplitOptions) -> Result<SplitReport, KwtoolsError> {
    opts.ratios.validate()?;
    let files = scan_files(&opts.data_dir, &opts.patterns, false)?;
    info!(
        "splitting {} file(s) from {} with seed {}",
        files.len(),
        opts.data_dir.display(),
        opts.seed
    );

    let plan = plan_split(files, &opts.ratios, opts.seed);
    let mut report = SplitReport {
        train: plan.train.len(),
        val: plan.val.len(),
        test: plan.test.len(),
        errors: Vec::new(),
    };

    for (name, files) in plan.splits() {
        let split_dir = opts.output_dir.join(name);
        fs::create_dir_all(&split_dir)?;

        let pb = progress_bar(files.len(), &format!("Copying {} files", name));
        for file in files {
            if let Err(err) = copy_into(file, &split_dir) {
                warn!("{}", err);
                report.errors.push(err);
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
    }

    Ok(report)
}

fn copy_into(file: &Path, dir: &Path) -> Result<(), FileError> {
    let Some(name) = file.file_name() else {
        return Err(FileError::new(FileErrorKind::Copy, file, "path has no file name"));
    };
    let dest = dir.join(name);
    fs::copy(file, &dest).map_err(|err| FileError::io(FileErrorKind::Copy, file, &err))?;
    debug!("copied {} -> {}", file.display(), dest.display());
    Ok(())
}
