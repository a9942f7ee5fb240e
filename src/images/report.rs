//! Image statistics report and terminal formatting.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{write_error_section, FileError};

const BYTES_PER_KB: u64 = 1024;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// How many resolutions the text report lists.
pub const TOP_RESOLUTIONS: usize = 5;

/// File size rounded down to a whole unit.
///
/// Kilobyte buckets sort before megabyte buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeBucket {
    Kilobytes(u64),
    Megabytes(u64),
}

impl SizeBucket {
    pub fn from_bytes(bytes: u64) -> Self {
        if bytes >= BYTES_PER_MB {
            Self::Megabytes(bytes / BYTES_PER_MB)
        } else {
            Self::Kilobytes(bytes / BYTES_PER_KB)
        }
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kilobytes(kb) => write!(f, "{}KB", kb),
            Self::Megabytes(mb) => write!(f, "{}MB", mb),
        }
    }
}

impl Serialize for SizeBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Aspect ratio label: `1:1`, `W:1` when wider, `1:H` when taller.
pub fn aspect_ratio_label(width: u32, height: u32) -> String {
    if width == height {
        "1:1".to_string()
    } else if width > height {
        format!("{:.2}:1", f64::from(width) / f64::from(height))
    } else {
        format!("1:{:.2}", f64::from(height) / f64::from(width))
    }
}

/// Aggregated image statistics for a directory.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ImageStats {
    pub total_files: usize,
    pub total_bytes: u64,
    /// Lowercase extension, without the dot.
    pub formats: BTreeMap<String, usize>,
    pub sizes: BTreeMap<SizeBucket, usize>,
    /// `WIDTHxHEIGHT`.
    pub resolutions: BTreeMap<String, usize>,
    pub aspect_ratios: BTreeMap<String, usize>,
    pub color_modes: BTreeMap<String, usize>,
    pub errors: Vec<FileError>,
    #[serde(skip)]
    pub(crate) verbose: bool,
}

impl ImageStats {
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn total_megabytes(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_MB as f64
    }

    /// Most common resolutions first; ties keep name order.
    pub fn top_resolutions(&self, n: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .resolutions
            .iter()
            .map(|(res, count)| (res.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }
}

fn write_counts<K: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    counts: impl IntoIterator<Item = (K, usize)>,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}:", title)?;
    for (key, count) in counts {
        writeln!(f, "  {}: {}", key, count)?;
    }
    Ok(())
}

impl fmt::Display for ImageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Image statistics ===")?;
        writeln!(f, "Total files: {}", self.total_files)?;
        writeln!(f, "Total size: {:.2} MB", self.total_megabytes())?;

        write_counts(f, "Formats", self.formats.iter().map(|(k, v)| (k, *v)))?;
        write_counts(f, "File sizes", self.sizes.iter().map(|(k, v)| (k, *v)))?;
        write_counts(
            f,
            &format!("Resolutions (top {})", TOP_RESOLUTIONS),
            self.top_resolutions(TOP_RESOLUTIONS),
        )?;
        write_counts(
            f,
            "Aspect ratios",
            self.aspect_ratios.iter().map(|(k, v)| (k, *v)),
        )?;
        write_counts(f, "Color modes", self.color_modes.iter().map(|(k, v)| (k, *v)))?;

        write_error_section(f, &self.errors, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_buckets_round_down() {
        assert_eq!(SizeBucket::from_bytes(500).to_string(), "0KB");
        assert_eq!(SizeBucket::from_bytes(2047).to_string(), "1KB");
        assert_eq!(SizeBucket::from_bytes(BYTES_PER_MB).to_string(), "1MB");
        assert_eq!(SizeBucket::from_bytes(5 * BYTES_PER_MB + 1).to_string(), "5MB");
    }

    #[test]
    fn size_buckets_sort_by_magnitude() {
        let mut buckets = vec![
            SizeBucket::Megabytes(10),
            SizeBucket::Kilobytes(900),
            SizeBucket::Megabytes(2),
        ];
        buckets.sort();
        let names: Vec<String> = buckets.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["900KB", "2MB", "10MB"]);
    }

    #[test]
    fn aspect_labels() {
        assert_eq!(aspect_ratio_label(100, 100), "1:1");
        assert_eq!(aspect_ratio_label(1920, 1080), "1.78:1");
        assert_eq!(aspect_ratio_label(1080, 1920), "1:1.78");
    }

    #[test]
    fn top_resolutions_sorted_by_count() {
        let mut stats = ImageStats::default();
        stats.resolutions.insert("10x10".into(), 1);
        stats.resolutions.insert("20x20".into(), 3);
        stats.resolutions.insert("30x30".into(), 3);

        let top = stats.top_resolutions(2);
        assert_eq!(top, vec![("20x20", 3), ("30x30", 3)]);
    }

    #[test]
    fn size_buckets_serialize_as_strings() {
        let mut stats = ImageStats::default();
        stats.sizes.insert(SizeBucket::Kilobytes(3), 2);
        let json = serde_json::to_value(&stats).expect("serialize");
        assert_eq!(json["sizes"]["3KB"], 2);
    }
}
