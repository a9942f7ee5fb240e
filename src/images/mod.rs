//! Image metadata statistics.
//!
//! Only image headers are read: dimensions and color type come from the
//! decoder without decoding pixel data.

mod report;

pub use report::{aspect_ratio_label, ImageStats, SizeBucket, TOP_RESOLUTIONS};

use std::fs;
use std::path::Path;

use image::{ColorType, ImageDecoder, ImageReader};
use log::{debug, info, warn};

use crate::error::{FileError, FileErrorKind, KwtoolsError};
use crate::progress::progress_bar;
use crate::scan::{scan_files, DEFAULT_IMAGE_PATTERNS};

/// Options for [`analyze_images`].
#[derive(Clone, Debug)]
pub struct ImageStatsOptions {
    pub recursive: bool,
    pub patterns: Vec<String>,
}

impl Default for ImageStatsOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            patterns: DEFAULT_IMAGE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Header-level facts about one image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub color_mode: String,
}

/// Read dimensions and color mode from the image header.
pub fn read_image_metadata(path: &Path) -> Result<ImageMetadata, FileError> {
    let image_err = |message: String| FileError::new(FileErrorKind::Image, path, message);

    let decoder = ImageReader::open(path)
        .map_err(|err| FileError::io(FileErrorKind::Image, path, &err))?
        .with_guessed_format()
        .map_err(|err| FileError::io(FileErrorKind::Image, path, &err))?
        .into_decoder()
        .map_err(|err| image_err(err.to_string()))?;

    let (width, height) = decoder.dimensions();
    if width == 0 || height == 0 {
        return Err(image_err(format!("image has no pixels ({}x{})", width, height)));
    }

    Ok(ImageMetadata {
        width,
        height,
        color_mode: color_mode_name(decoder.color_type()).to_string(),
    })
}

fn color_mode_name(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F32",
        ColorType::Rgba32F => "RGBA;F32",
        _ => "unknown",
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Collect format, size, resolution, aspect and color-mode counts.
///
/// A file whose header cannot be read still counts toward the totals and
/// its format and size bucket, and is listed in `errors`.
pub fn analyze_images(dir: &Path, opts: &ImageStatsOptions) -> Result<ImageStats, KwtoolsError> {
    let files = scan_files(dir, &opts.patterns, opts.recursive)?;
    info!("analyzing {} image(s) in {}", files.len(), dir.display());

    let mut stats = ImageStats::default();
    let pb = progress_bar(files.len(), "Reading image headers");
    for path in &files {
        pb.inc(1);
        add_image(&mut stats, path);
    }
    pb.finish_and_clear();

    Ok(stats)
}

fn add_image(stats: &mut ImageStats, path: &Path) {
    stats.total_files += 1;

    let bytes = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(err) => {
            let err = FileError::io(FileErrorKind::Read, path, &err);
            warn!("{}", err);
            stats.errors.push(err);
            return;
        }
    };
    stats.total_bytes += bytes;
    *stats.formats.entry(extension_of(path)).or_default() += 1;
    *stats.sizes.entry(SizeBucket::from_bytes(bytes)).or_default() += 1;

    let meta = match read_image_metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            warn!("{}", err);
            stats.errors.push(err);
            return;
        }
    };
    debug!(
        "{}: {}x{} {}",
        path.display(),
        meta.width,
        meta.height,
        meta.color_mode
    );

    *stats
        .resolutions
        .entry(format!("{}x{}", meta.width, meta.height))
        .or_default() += 1;
    *stats
        .aspect_ratios
        .entry(aspect_ratio_label(meta.width, meta.height))
        .or_default() += 1;
    *stats.color_modes.entry(meta.color_mode).or_default() += 1;
}
