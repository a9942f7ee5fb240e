//! Batch file management: move, copy, rename.
//!
//! Every operation scans first and then acts file by file. A failure on
//! one file is recorded in the report and the batch continues.

mod dedup;

pub use dedup::{find_duplicate_files, hash_file, DuplicateReport};

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use regex::Regex;
use serde::Serialize;

use crate::error::{write_error_section, FileError, FileErrorKind, KwtoolsError};
use crate::progress::progress_bar;
use crate::scan::{scan_all_files, scan_files};

/// Outcome of a batch file operation.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FileOpsReport {
    /// Files that were moved, copied or renamed.
    pub processed: usize,
    /// Files left alone because there was nothing to do.
    pub skipped: usize,
    pub errors: Vec<FileError>,
}

impl FileOpsReport {
    fn record(&mut self, result: Result<bool, FileError>) {
        match result {
            Ok(true) => self.processed += 1,
            Ok(false) => self.skipped += 1,
            Err(err) => {
                warn!("{}", err);
                self.errors.push(err);
            }
        }
    }
}

impl fmt::Display for FileOpsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed: {}", self.processed)?;
        if self.skipped > 0 {
            writeln!(f, "Skipped: {}", self.skipped)?;
        }
        write_error_section(f, &self.errors, true)
    }
}

/// Move files matching `pattern` into `target_dir`, keeping only the name.
pub fn move_files(
    source_dir: &Path,
    pattern: &str,
    target_dir: &Path,
    recursive: bool,
) -> Result<FileOpsReport, KwtoolsError> {
    let files = scan_files(source_dir, &[pattern], recursive)?;
    fs::create_dir_all(target_dir)?;
    info!(
        "moving {} file(s) from {} to {}",
        files.len(),
        source_dir.display(),
        target_dir.display()
    );

    let mut report = FileOpsReport::default();
    let pb = progress_bar(files.len(), "Moving files");
    for file in &files {
        pb.inc(1);
        report.record(move_one(file, target_dir));
    }
    pb.finish_and_clear();
    Ok(report)
}

fn move_one(file: &Path, target_dir: &Path) -> Result<bool, FileError> {
    let Some(name) = file.file_name() else {
        return Err(FileError::new(FileErrorKind::Move, file, "path has no file name"));
    };
    let dest = target_dir.join(name);
    if dest == file {
        return Ok(false);
    }
    if dest.exists() {
        return Err(FileError::new(
            FileErrorKind::Move,
            file,
            format!("destination {} already exists", dest.display()),
        ));
    }

    // rename fails across file systems; fall back to copy and delete
    if let Err(rename_err) = fs::rename(file, &dest) {
        debug!("rename failed ({}), copying instead", rename_err);
        fs::copy(file, &dest)
            .and_then(|_| fs::remove_file(file))
            .map_err(|err| FileError::io(FileErrorKind::Move, file, &err))?;
    }
    debug!("moved {} -> {}", file.display(), dest.display());
    Ok(true)
}

/// Copy files matching `pattern`, keeping their path relative to `source_dir`.
pub fn copy_files_by_pattern(
    source_dir: &Path,
    target_dir: &Path,
    pattern: &str,
    recursive: bool,
) -> Result<FileOpsReport, KwtoolsError> {
    let files = scan_files(source_dir, &[pattern], recursive)?;
    fs::create_dir_all(target_dir)?;
    info!(
        "copying {} file(s) from {} to {}",
        files.len(),
        source_dir.display(),
        target_dir.display()
    );

    let mut report = FileOpsReport::default();
    let pb = progress_bar(files.len(), "Copying files");
    for file in &files {
        pb.inc(1);
        report.record(copy_one(file, source_dir, target_dir));
    }
    pb.finish_and_clear();
    Ok(report)
}

fn copy_one(file: &Path, source_dir: &Path, target_dir: &Path) -> Result<bool, FileError> {
    let relative = file.strip_prefix(source_dir).map_err(|_| {
        FileError::new(
            FileErrorKind::Copy,
            file,
            format!("not under {}", source_dir.display()),
        )
    })?;
    let dest = target_dir.join(relative);
    let copy = || -> io::Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(file, &dest)?;
        Ok(())
    };
    copy().map_err(|err| FileError::io(FileErrorKind::Copy, file, &err))?;
    debug!("copied {} -> {}", file.display(), dest.display());
    Ok(true)
}

/// Regex replace-all on every file name under `dir`.
pub fn batch_rename(
    dir: &Path,
    pattern: &str,
    replacement: &str,
    recursive: bool,
) -> Result<FileOpsReport, KwtoolsError> {
    let regex = Regex::new(pattern).map_err(|source| KwtoolsError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })?;
    rename_all(dir, recursive, "Renaming files", |name| {
        regex.replace_all(name, replacement).into_owned()
    })
}

/// Prepend `prefix` to every file name under `dir`.
pub fn add_prefix(dir: &Path, prefix: &str, recursive: bool) -> Result<FileOpsReport, KwtoolsError> {
    rename_all(dir, recursive, "Adding prefix", |name| format!("{}{}", prefix, name))
}

/// Insert `suffix` before the extension of every file name under `dir`.
pub fn add_suffix(dir: &Path, suffix: &str, recursive: bool) -> Result<FileOpsReport, KwtoolsError> {
    rename_all(dir, recursive, "Adding suffix", |name| suffixed_name(name, suffix))
}

/// `photo.jpg` + `_v2` is `photo_v2.jpg`. Dotfiles and extensionless names
/// get the suffix at the end.
fn suffixed_name(name: &str, suffix: &str) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}{}", &name[..dot], suffix, &name[dot..]),
        _ => format!("{}{}", name, suffix),
    }
}

fn rename_all<F>(
    dir: &Path,
    recursive: bool,
    label: &str,
    new_name: F,
) -> Result<FileOpsReport, KwtoolsError>
where
    F: Fn(&str) -> String,
{
    let files = scan_all_files(dir, recursive)?;
    info!("renaming up to {} file(s) in {}", files.len(), dir.display());

    let mut report = FileOpsReport::default();
    let pb = progress_bar(files.len(), label);
    for file in &files {
        pb.inc(1);
        report.record(rename_one(file, &new_name));
    }
    pb.finish_and_clear();
    Ok(report)
}

fn rename_one(file: &Path, new_name: impl Fn(&str) -> String) -> Result<bool, FileError> {
    let Some(name) = file.file_name().and_then(|name| name.to_str()) else {
        return Err(FileError::new(
            FileErrorKind::Rename,
            file,
            "file name is not valid UTF-8",
        ));
    };
    let renamed = new_name(name);
    if renamed == name {
        return Ok(false);
    }
    if renamed.is_empty() || renamed.contains(std::path::MAIN_SEPARATOR) {
        return Err(FileError::new(
            FileErrorKind::Rename,
            file,
            format!("'{}' is not a valid file name", renamed),
        ));
    }

    let dest: PathBuf = file.with_file_name(&renamed);
    if dest.exists() {
        return Err(FileError::new(
            FileErrorKind::Rename,
            file,
            format!("destination {} already exists", dest.display()),
        ));
    }
    fs::rename(file, &dest).map_err(|err| FileError::io(FileErrorKind::Rename, file, &err))?;
    debug!("renamed {} -> {}", file.display(), dest.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, contents).expect("write file");
    }

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(suffixed_name("photo.jpg", "_v2"), "photo_v2.jpg");
        assert_eq!(suffixed_name("archive.tar.gz", "_x"), "archive.tar_x.gz");
        assert_eq!(suffixed_name("README", "_x"), "README_x");
        assert_eq!(suffixed_name(".env", "_x"), ".env_x");
    }

    #[test]
    fn move_flattens_into_target() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        touch(&src.join("a.jpg"), "a");
        touch(&src.join("nested/b.jpg"), "b");
        touch(&src.join("c.txt"), "c");

        let report = move_files(&src, "*.jpg", &dst, true).expect("move");

        assert_eq!(report.processed, 2);
        assert!(dst.join("a.jpg").is_file());
        assert!(dst.join("b.jpg").is_file());
        assert!(!src.join("a.jpg").exists());
        assert!(src.join("c.txt").is_file());
    }

    #[test]
    fn move_does_not_overwrite() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        touch(&src.join("a.jpg"), "new");
        touch(&dst.join("a.jpg"), "old");

        let report = move_files(&src, "*.jpg", &dst, false).expect("move");

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, FileErrorKind::Move);
        assert_eq!(fs::read_to_string(dst.join("a.jpg")).unwrap(), "old");
        assert!(src.join("a.jpg").exists());
    }

    #[test]
    fn copy_keeps_relative_paths() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        touch(&src.join("a.txt"), "a");
        touch(&src.join("nested/b.txt"), "b");

        let report = copy_files_by_pattern(&src, &dst, "*.txt", true).expect("copy");

        assert_eq!(report.processed, 2);
        assert_eq!(fs::read_to_string(dst.join("nested/b.txt")).unwrap(), "b");
        assert!(src.join("nested/b.txt").exists());
    }

    #[test]
    fn regex_rename_only_touches_matches() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("img_001.jpg"), "");
        touch(&temp.path().join("other.jpg"), "");

        let report = batch_rename(temp.path(), r"^img_(\d+)", "frame_$1", false).expect("rename");

        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped, 1);
        assert!(temp.path().join("frame_001.jpg").is_file());
        assert!(temp.path().join("other.jpg").is_file());
    }

    #[test]
    fn rename_collision_is_reported() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("a1.txt"), "1");
        touch(&temp.path().join("b1.txt"), "2");

        let report = batch_rename(temp.path(), "^[ab]", "c", false).expect("rename");

        assert_eq!(report.processed, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, FileErrorKind::Rename);
        assert_eq!(fs::read_to_string(temp.path().join("c1.txt")).unwrap(), "1");
    }

    #[test]
    fn invalid_regex_is_fatal() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = batch_rename(temp.path(), "(", "x", false).unwrap_err();
        assert!(matches!(err, KwtoolsError::InvalidRegex { .. }));
    }

    #[test]
    fn prefix_and_suffix() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("a.jpg"), "");

        add_prefix(temp.path(), "train_", false).expect("prefix");
        add_suffix(temp.path(), "_aug", false).expect("suffix");

        assert!(temp.path().join("train_a_aug.jpg").is_file());
    }
}
