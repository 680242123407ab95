use std::path::PathBuf;

/// How a bounding box is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxMode {
    /// `(x_min, y_min, x_max, y_max)` in absolute pixel coordinates.
    XyxyAbs,
}

/// Axis-aligned bounding box in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BBox {
    #[inline]
    pub fn as_xyxy(&self) -> [f64; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }
}

/// One labeled region within an image.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAnnotation {
    pub bbox: BBox,
    pub bbox_mode: BoxMode,
    /// Flat `[x0, y0, x1, y1, ...]` vertices, shifted to pixel centers.
    pub polygon: Vec<f64>,
    pub category_id: usize,
}

/// One image's metadata together with all of its labeled regions.
///
/// Produced once per distinct filename and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub file_name: PathBuf,
    /// Sequential id in order of first appearance in the annotation table.
    pub image_id: usize,
    pub height: u32,
    pub width: u32,
    pub annotations: Vec<ObjectAnnotation>,
}
