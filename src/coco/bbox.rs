//! YOLO box conversions.

use crate::labels::LabelRecord;

/// A YOLO box: normalized center and size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoloBox {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl YoloBox {
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self { cx, cy, w, h }
    }

    /// The four numbers as written in the label file, plus `w * h`.
    pub fn verbatim(&self) -> ([f64; 4], f64) {
        ([self.cx, self.cy, self.w, self.h], self.w * self.h)
    }

    /// COCO `[x, y, width, height]` in pixels for an image of the given size,
    /// plus the pixel area.
    pub fn to_coco_pixels(&self, image_width: f64, image_height: f64) -> ([f64; 4], f64) {
        let width = self.w * image_width;
        let height = self.h * image_height;
        let x = (self.cx - self.w / 2.0) * image_width;
        let y = (self.cy - self.h / 2.0) * image_height;
        ([x, y, width, height], width * height)
    }
}

impl From<&LabelRecord> for YoloBox {
    fn from(record: &LabelRecord) -> Self {
        Self::from_cxcywh(record.x, record.y, record.width, record.height)
    }
}
