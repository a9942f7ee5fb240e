//! COCO JSON documents.
//!
//! COCO bounding boxes use `[x, y, width, height]` where `(x, y)` is the
//! top-left corner in absolute pixels. Documents are read and written with
//! serde; every entry keeps the fields this tool does not model in an
//! `extra` map so a read-modify-write cycle does not drop them. Box and
//! area values are held as JSON numbers, so `12` stays `12` and `12.0`
//! stays `12.0` when a document is written back.
//!
//! # Example
//!
//! ```
//! use kwtools::coco::{CocoDocument, CategoryEntry};
//!
//! let mut doc = CocoDocument::default();
//! doc.categories.push(CategoryEntry::new(0, "person"));
//! assert!(doc.annotations.is_empty());
//! ```

mod bbox;
mod convert;
mod remap;

pub use bbox::YoloBox;
pub use convert::{convert_yolo_to_coco, BBoxMode, ConvertOptions, ConvertReport};
pub use remap::{remap_coco_file, RemapReport};

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::KwtoolsError;

/// Supercategory given to categories created from a class-name file.
pub const DEFAULT_SUPERCATEGORY: &str = "none";

/// Top-level COCO document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CocoDocument {
    pub images: Vec<ImageEntry>,
    pub annotations: Vec<AnnotationEntry>,
    pub categories: Vec<CategoryEntry>,
    /// Top-level fields such as `info` and `licenses`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// COCO image entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub id: u64,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// COCO annotation entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    pub id: u64,
    pub image_id: u64,
    pub category_id: u64,
    /// `[x, y, width, height]`.
    pub bbox: [Number; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iscrowd: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// COCO category entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageEntry {
    pub fn new(id: u64, file_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            width: Some(width),
            height: Some(height),
            extra: Map::new(),
        }
    }

    /// `(width, height)`, with a missing side read as 0.
    pub fn size(&self) -> (u32, u32) {
        (self.width.unwrap_or(0), self.height.unwrap_or(0))
    }
}

impl AnnotationEntry {
    /// A non-crowd annotation with the given box and area.
    ///
    /// Returns `None` when any value is NaN or infinite, since JSON has no
    /// representation for those.
    pub fn new(
        id: u64,
        image_id: u64,
        category_id: u64,
        bbox: [f64; 4],
        area: f64,
    ) -> Option<Self> {
        let [x, y, w, h] = bbox;
        Some(Self {
            id,
            image_id,
            category_id,
            bbox: [
                Number::from_f64(x)?,
                Number::from_f64(y)?,
                Number::from_f64(w)?,
                Number::from_f64(h)?,
            ],
            area: Some(Number::from_f64(area)?),
            iscrowd: Some(0),
            extra: Map::new(),
        })
    }

    /// The box as floats.
    pub fn bbox_f64(&self) -> [f64; 4] {
        self.bbox.each_ref().map(|n| n.as_f64().unwrap_or_default())
    }

    pub fn area_f64(&self) -> Option<f64> {
        self.area.as_ref().and_then(Number::as_f64)
    }
}

impl CategoryEntry {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            supercategory: None,
            extra: Map::new(),
        }
    }

    pub fn with_supercategory(mut self, supercategory: impl Into<String>) -> Self {
        self.supercategory = Some(supercategory.into());
        self
    }
}

impl CocoDocument {
    pub fn category(&self, id: u64) -> Option<&CategoryEntry> {
        self.categories.iter().find(|cat| cat.id == id)
    }

    pub fn image(&self, id: u64) -> Option<&ImageEntry> {
        self.images.iter().find(|img| img.id == id)
    }
}

/// Reads a COCO document from a JSON file.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use kwtools::coco::read_coco_json;
///
/// let doc = read_coco_json(Path::new("annotations.json"))?;
/// # Ok::<(), kwtools::KwtoolsError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<CocoDocument, KwtoolsError> {
    let file = File::open(path).map_err(KwtoolsError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| KwtoolsError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a COCO document as pretty-printed JSON.
pub fn write_coco_json(path: &Path, doc: &CocoDocument) -> Result<(), KwtoolsError> {
    let file = File::create(path).map_err(KwtoolsError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, doc).map_err(|source| {
        KwtoolsError::CocoJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(KwtoolsError::Io)
}

/// Reads a COCO document from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<CocoDocument, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a COCO document from a JSON byte slice.
pub fn from_coco_slice(bytes: &[u8]) -> Result<CocoDocument, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Writes a COCO document to a pretty JSON string.
pub fn to_coco_string(doc: &CocoDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}
