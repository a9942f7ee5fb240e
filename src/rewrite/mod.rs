//! In-place rewriting of YOLO label files.
//!
//! Two rewrites are supported: remapping class ids and stripping a trailing
//! confidence column. Only files with at least one transformed line are
//! written. Before writing, the original can be renamed to `<name>.bak`; an
//! existing backup is never replaced, so it always holds the oldest version.

mod report;

pub use report::RewriteReport;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{FileError, FileErrorKind, KwtoolsError};
use crate::labels::{parse_class_id, ClassId, LineIssue, LineIssueKind};
use crate::mapping::YoloClassMap;
use crate::progress::progress_bar;
use crate::scan::{scan_files, LABEL_PATTERN};

/// Field count of a label line that carries a confidence score.
const CONFIDENCE_FIELD_COUNT: usize = 6;

/// What to do with each label line.
#[derive(Clone, Debug, PartialEq)]
pub enum RewriteMode {
    /// Replace class ids found in the map; other lines pass through.
    RemapClasses(YoloClassMap),
    /// Drop the sixth (confidence) field from six-field lines.
    StripConfidence,
}

impl RewriteMode {
    fn label(&self) -> &'static str {
        match self {
            RewriteMode::RemapClasses(_) => "Remapping classes",
            RewriteMode::StripConfidence => "Cleaning labels",
        }
    }
}

/// Options for a directory rewrite.
#[derive(Clone, Debug)]
pub struct RewriteOptions {
    pub mode: RewriteMode,
    pub recursive: bool,
    /// Rename the original to `<name>.bak` before the first rewrite.
    pub backup: bool,
}

/// The rewritten content of one file.
#[derive(Clone, Debug, PartialEq)]
pub struct RewrittenLabels {
    /// Output lines without terminators. Blank input lines are dropped.
    pub lines: Vec<String>,
    /// True if at least one line was transformed.
    pub modified: bool,
    /// Lines passed through because they could not be interpreted.
    pub issues: Vec<LineIssue>,
}

impl RewrittenLabels {
    /// File content, one line per record, each newline-terminated.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

/// Apply `mode` to the text of one label file.
pub fn rewrite_label_text(text: &str, mode: &RewriteMode) -> RewrittenLabels {
    let mut out = RewrittenLabels {
        lines: Vec::new(),
        modified: false,
        issues: Vec::new(),
    };

    for (idx, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }

        match mode {
            RewriteMode::StripConfidence => {
                if fields.len() == CONFIDENCE_FIELD_COUNT {
                    out.lines.push(fields[..CONFIDENCE_FIELD_COUNT - 1].join(" "));
                    out.modified = true;
                } else {
                    out.lines.push(line.trim().to_string());
                }
            }
            RewriteMode::RemapClasses(map) => {
                let Some(class_id) = parse_class_id(fields[0]) else {
                    out.issues.push(LineIssue {
                        line: idx + 1,
                        kind: LineIssueKind::InvalidClassId,
                        text: line.trim().to_string(),
                    });
                    out.lines.push(line.trim_end().to_string());
                    continue;
                };

                match map.get(&class_id) {
                    Some(new_id) => {
                        out.lines.push(remap_fields(*new_id, &fields[1..]));
                        out.modified = true;
                    }
                    None => out.lines.push(line.trim_end().to_string()),
                }
            }
        }
    }

    out
}

fn remap_fields(new_id: ClassId, rest: &[&str]) -> String {
    let mut line = new_id.to_string();
    for field in rest {
        line.push(' ');
        line.push_str(field);
    }
    line
}

/// Rewrite every `*.txt` label file under `dir` in place.
pub fn rewrite_labels_dir(dir: &Path, opts: &RewriteOptions) -> Result<RewriteReport, KwtoolsError> {
    let files = scan_files(dir, &[LABEL_PATTERN], opts.recursive)?;
    info!("rewriting {} label file(s) in {}", files.len(), dir.display());

    let mut report = RewriteReport {
        total_files: files.len(),
        ..Default::default()
    };

    let pb = progress_bar(files.len(), opts.mode.label());
    for path in &files {
        match rewrite_label_file(path, &opts.mode, opts.backup) {
            Ok(true) => {
                debug!("modified: {}", path.display());
                report.modified_files += 1;
            }
            Ok(false) => {}
            Err(err) => {
                warn!("{}", err);
                report.errors.push(err);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(report)
}

/// Rewrite one file. Returns whether it was modified.
pub fn rewrite_label_file(path: &Path, mode: &RewriteMode, backup: bool) -> Result<bool, FileError> {
    let text =
        fs::read_to_string(path).map_err(|err| FileError::io(FileErrorKind::Read, path, &err))?;

    let rewritten = rewrite_label_text(&text, mode);
    for issue in &rewritten.issues {
        debug!("{}: {} (kept unchanged)", path.display(), issue);
    }
    if !rewritten.modified {
        return Ok(false);
    }

    if backup {
        let backup_path = backup_path(path);
        if !backup_path.exists() {
            fs::rename(path, &backup_path)
                .map_err(|err| FileError::io(FileErrorKind::Backup, path, &err))?;
        }
    }

    fs::write(path, rewritten.to_text())
        .map_err(|err| FileError::io(FileErrorKind::Write, path, &err))?;
    Ok(true)
}

/// `labels/a.txt` -> `labels/a.txt.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(OsString::new);
    name.push(".bak");
    path.with_file_name(name)
}
