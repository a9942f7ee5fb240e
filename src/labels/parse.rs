use std::fs;
use std::path::Path;

use super::{ClassId, FileLabelSet, LabelOutcome, LabelRecord, LineIssue, LineIssueKind, ParsedLabels};
use crate::error::KwtoolsError;

const FIELD_COUNT: usize = 5;

/// Parse one label line.
///
/// Blank lines yield `Ok(None)`. The class id may be written as a float
/// (`"1.0"`) and is truncated toward zero.
pub fn parse_label_line(line: &str) -> Result<Option<LabelRecord>, LineIssueKind> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Count past five only as far as needed to report the mismatch.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(FIELD_COUNT + 1).collect();
    if tokens.len() != FIELD_COUNT {
        let count = if tokens.len() > FIELD_COUNT {
            trimmed.split_whitespace().count()
        } else {
            tokens.len()
        };
        return Err(LineIssueKind::WrongFieldCount(count));
    }

    let class_id = parse_class_id(tokens[0]).ok_or(LineIssueKind::InvalidClassId)?;
    let x = parse_coordinate(tokens[1])?;
    let y = parse_coordinate(tokens[2])?;
    let width = parse_coordinate(tokens[3])?;
    let height = parse_coordinate(tokens[4])?;

    Ok(Some(LabelRecord {
        class_id,
        x,
        y,
        width,
        height,
    }))
}

/// Parse the full text of a label file, keeping line order.
pub fn parse_labels(text: &str) -> ParsedLabels {
    let mut records = Vec::new();
    let mut issues = Vec::new();
    let mut saw_content = false;

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        saw_content = true;

        match parse_label_line(line) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(kind) => issues.push(LineIssue {
                line: idx + 1,
                kind,
                text: line.trim().to_string(),
            }),
        }
    }

    let outcome = if !saw_content {
        LabelOutcome::Empty
    } else if records.is_empty() {
        LabelOutcome::NoValidObjects
    } else {
        LabelOutcome::Parsed(records)
    };

    ParsedLabels { outcome, issues }
}

/// Read and parse a label file. Only I/O failures are errors.
pub fn read_label_file(path: &Path) -> Result<FileLabelSet, KwtoolsError> {
    let text = fs::read_to_string(path)?;
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(FileLabelSet {
        path: path.to_path_buf(),
        stem,
        parsed: parse_labels(&text),
    })
}

/// Parse a class id token, accepting float text such as `"3.0"`.
pub(crate) fn parse_class_id(raw: &str) -> Option<ClassId> {
    let value = raw.parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < 0.0 || truncated > u32::MAX as f64 {
        return None;
    }
    Some(ClassId::new(truncated as u32))
}

fn parse_coordinate(raw: &str) -> Result<f64, LineIssueKind> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(LineIssueKind::InvalidCoordinate),
    }
}

/// Fuzz-only entrypoint for single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) {
    let _ = parse_label_line(input);
    let _ = parse_labels(input);
}
