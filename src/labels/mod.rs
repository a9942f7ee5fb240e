//! YOLO text labels.
//!
//! A label file holds one object per line: `class_id x y width height`, with
//! the box given as a normalized center/size. Parsing never fails on bad
//! content; malformed lines are skipped and reported as [`LineIssue`]s.

mod names;
mod parse;

pub use names::ClassNames;
pub use parse::{parse_label_line, parse_labels, read_label_file};

pub(crate) use parse::parse_class_id;

#[cfg(feature = "fuzzing")]
pub use parse::fuzz_parse_label_line;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A YOLO class index.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub u32);

impl ClassId {
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ClassId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// One detected object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelRecord {
    pub class_id: ClassId,
    /// Normalized box center x.
    pub x: f64,
    /// Normalized box center y.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Why a single line was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LineIssueKind {
    /// The line did not have exactly five fields; carries the count seen.
    WrongFieldCount(usize),
    /// The first field is not a non-negative number.
    InvalidClassId,
    /// One of the four box fields is not a number.
    InvalidCoordinate,
}

impl fmt::Display for LineIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineIssueKind::WrongFieldCount(n) => write!(f, "expected 5 values, found {}", n),
            LineIssueKind::InvalidClassId => f.write_str("invalid class id"),
            LineIssueKind::InvalidCoordinate => f.write_str("invalid box coordinate"),
        }
    }
}

/// A skipped line, 1-based.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineIssue {
    pub line: usize,
    pub kind: LineIssueKind,
    pub text: String,
}

impl fmt::Display for LineIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line, self.kind, self.text)
    }
}

/// Classification of one label file's content.
#[derive(Clone, Debug, PartialEq)]
pub enum LabelOutcome {
    /// No non-blank lines at all.
    Empty,
    /// Content present, but not a single valid record.
    NoValidObjects,
    /// At least one valid record, in line order.
    Parsed(Vec<LabelRecord>),
}

/// Result of parsing label text: the outcome plus every skipped line.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedLabels {
    pub outcome: LabelOutcome,
    pub issues: Vec<LineIssue>,
}

impl ParsedLabels {
    /// Valid records, empty unless the outcome is [`LabelOutcome::Parsed`].
    pub fn records(&self) -> &[LabelRecord] {
        match &self.outcome {
            LabelOutcome::Parsed(records) => records,
            LabelOutcome::Empty | LabelOutcome::NoValidObjects => &[],
        }
    }
}

/// The parsed contents of one label file.
#[derive(Clone, Debug, PartialEq)]
pub struct FileLabelSet {
    pub path: PathBuf,
    pub stem: String,
    pub parsed: ParsedLabels,
}

impl FileLabelSet {
    pub fn records(&self) -> &[LabelRecord] {
        self.parsed.records()
    }

    pub fn outcome(&self) -> &LabelOutcome {
        &self.parsed.outcome
    }
}
