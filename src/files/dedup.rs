//! Content-hash duplicate detection.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{write_error_section, FileError, FileErrorKind, KwtoolsError};
use crate::progress::progress_bar;
use crate::scan::scan_all_files;

const HASH_BLOCK_SIZE: usize = 64 * 1024;

/// Lowercase hex SHA-256 of a file, read in fixed-size blocks.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_BLOCK_SIZE];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Files grouped by identical content.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DuplicateReport {
    /// Hash to paths; only hashes shared by two or more files.
    pub groups: BTreeMap<String, Vec<PathBuf>>,
    pub files_checked: usize,
    pub errors: Vec<FileError>,
}

impl DuplicateReport {
    pub fn duplicate_files(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

impl fmt::Display for DuplicateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.groups.is_empty() {
            writeln!(f, "No duplicate files found ({} checked).", self.files_checked)?;
        } else {
            writeln!(f, "=== Duplicate files ===")?;
            for (hash, paths) in &self.groups {
                writeln!(f)?;
                writeln!(f, "Identical files (hash: {}...):", &hash[..hash.len().min(8)])?;
                for path in paths {
                    writeln!(f, "  - {}", path.display())?;
                }
            }
        }
        write_error_section(f, &self.errors, true)
    }
}

/// Hash every regular file under `dir` and group identical ones.
pub fn find_duplicate_files(dir: &Path, recursive: bool) -> Result<DuplicateReport, KwtoolsError> {
    let files = scan_all_files(dir, recursive)?;
    info!("hashing {} file(s) in {}", files.len(), dir.display());

    let mut by_hash: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    let mut report = DuplicateReport::default();

    let pb = progress_bar(files.len(), "Checking files");
    for path in files {
        pb.inc(1);
        match hash_file(&path) {
            Ok(hash) => {
                debug!("{} {}", hash, path.display());
                report.files_checked += 1;
                by_hash.entry(hash).or_default().push(path);
            }
            Err(err) => {
                let err = FileError::io(FileErrorKind::Hash, &path, &err);
                warn!("{}", err);
                report.errors.push(err);
            }
        }
    }
    pb.finish_and_clear();

    report.groups = by_hash
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .collect();
    Ok(report)
}
