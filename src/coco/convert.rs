//! YOLO directory to COCO document conversion.
//!
//! Category ids follow line order of the class-name file, image ids follow
//! sorted image order, and annotation ids run sequentially over the whole
//! document. All three start at zero.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use super::{AnnotationEntry, CategoryEntry, CocoDocument, ImageEntry, YoloBox, DEFAULT_SUPERCATEGORY};
use crate::error::{write_error_section, FileError, FileErrorKind, KwtoolsError};
use crate::labels::{read_label_file, ClassNames};
use crate::progress::progress_bar;
use crate::scan::{scan_files, DEFAULT_IMAGE_PATTERNS};

/// How YOLO boxes are written into the COCO document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BBoxMode {
    /// Copy the normalized center/size numbers as they are and leave image
    /// sizes at zero.
    #[default]
    Verbatim,
    /// Read each image's size and emit top-left pixel boxes.
    Pixel,
}

/// Options for a YOLO to COCO conversion.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    pub label_dir: PathBuf,
    pub class_file: PathBuf,
    /// Where the images live; defaults to `label_dir`.
    pub image_dir: Option<PathBuf>,
    pub image_patterns: Vec<String>,
    pub bbox_mode: BBoxMode,
}

impl ConvertOptions {
    pub fn new(label_dir: impl Into<PathBuf>, class_file: impl Into<PathBuf>) -> Self {
        Self {
            label_dir: label_dir.into(),
            class_file: class_file.into(),
            image_dir: None,
            image_patterns: DEFAULT_IMAGE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            bbox_mode: BBoxMode::default(),
        }
    }

    fn image_dir(&self) -> &Path {
        self.image_dir.as_deref().unwrap_or(&self.label_dir)
    }
}

/// Counts from a conversion run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConvertReport {
    pub images: usize,
    pub categories: usize,
    pub annotations: usize,
    /// Images that had no same-stem label file.
    pub images_without_labels: usize,
    pub errors: Vec<FileError>,
    #[serde(skip)]
    pub(crate) verbose: bool,
}

impl ConvertReport {
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl fmt::Display for ConvertReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {} images, {} categories, {} annotations",
            self.images, self.categories, self.annotations
        )?;
        if self.images_without_labels > 0 {
            writeln!(f, "  {} image(s) without a label file", self.images_without_labels)?;
        }
        write_error_section(f, &self.errors, self.verbose)
    }
}

/// Build a COCO document from a YOLO label directory and its images.
pub fn convert_yolo_to_coco(
    opts: &ConvertOptions,
) -> Result<(CocoDocument, ConvertReport), KwtoolsError> {
    let class_names = ClassNames::load(&opts.class_file)?;
    let image_dir = opts.image_dir();
    let image_files = scan_files(image_dir, &opts.image_patterns, false)?;
    info!(
        "converting {} image(s) from {} with labels from {}",
        image_files.len(),
        image_dir.display(),
        opts.label_dir.display()
    );

    let mut doc = CocoDocument {
        categories: class_names
            .iter()
            .map(|(id, name)| {
                CategoryEntry::new(u64::from(id.as_u32()), name)
                    .with_supercategory(DEFAULT_SUPERCATEGORY)
            })
            .collect(),
        ..Default::default()
    };
    let mut report = ConvertReport {
        categories: doc.categories.len(),
        ..Default::default()
    };

    let mut next_annotation_id: u64 = 0;
    let pb = progress_bar(image_files.len(), "Converting to COCO");

    for (index, image_path) in image_files.iter().enumerate() {
        pb.inc(1);
        let image_id = index as u64;
        let file_name = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let dimensions = match opts.bbox_mode {
            BBoxMode::Verbatim => None,
            BBoxMode::Pixel => match read_image_dimensions(image_path) {
                Ok(dims) => Some(dims),
                Err(err) => {
                    warn!("{}", err);
                    report.errors.push(err);
                    doc.images.push(ImageEntry::new(image_id, file_name, 0, 0));
                    continue;
                }
            },
        };

        let (width, height) = dimensions.unwrap_or((0, 0));
        doc.images.push(ImageEntry::new(image_id, file_name, width, height));

        let Some(label_path) = label_for_image(&opts.label_dir, image_path) else {
            debug!("no label file for {}", image_path.display());
            report.images_without_labels += 1;
            continue;
        };

        let labels = match read_label_file(&label_path) {
            Ok(labels) => labels,
            Err(err) => {
                warn!("failed to read {}: {}", label_path.display(), err);
                report
                    .errors
                    .push(FileError::new(FileErrorKind::Read, &label_path, err.to_string()));
                continue;
            }
        };
        for issue in &labels.parsed.issues {
            debug!("{}: {}", label_path.display(), issue);
        }

        for record in labels.records() {
            let yolo = YoloBox::from(record);
            let (bbox, area) = match dimensions {
                Some((w, h)) => yolo.to_coco_pixels(w as f64, h as f64),
                None => yolo.verbatim(),
            };

            let Some(annotation) = AnnotationEntry::new(
                next_annotation_id,
                image_id,
                u64::from(record.class_id.as_u32()),
                bbox,
                area,
            ) else {
                let err = FileError::new(
                    FileErrorKind::Read,
                    &label_path,
                    format!("box {:?} with area {} is not representable in JSON", bbox, area),
                );
                warn!("{}", err);
                report.errors.push(err);
                continue;
            };
            doc.annotations.push(annotation);
            next_annotation_id += 1;
        }
    }
    pb.finish_and_clear();

    report.images = doc.images.len();
    report.annotations = doc.annotations.len();
    Ok((doc, report))
}

fn label_for_image(label_dir: &Path, image_path: &Path) -> Option<PathBuf> {
    let stem = image_path.file_stem()?;
    let mut name = stem.to_os_string();
    name.push(".txt");
    let candidate = label_dir.join(name);
    candidate.is_file().then_some(candidate)
}

fn read_image_dimensions(path: &Path) -> Result<(u32, u32), FileError> {
    let size = imagesize::size(path)
        .map_err(|err| FileError::new(FileErrorKind::Image, path, err.to_string()))?;

    let width = u32::try_from(size.width).map_err(|_| {
        FileError::new(
            FileErrorKind::Image,
            path,
            format!("image width {} does not fit in u32", size.width),
        )
    })?;
    let height = u32::try_from(size.height).map_err(|_| {
        FileError::new(
            FileErrorKind::Image,
            path,
            format!("image height {} does not fit in u32", size.height),
        )
    })?;

    Ok((width, height))
}
