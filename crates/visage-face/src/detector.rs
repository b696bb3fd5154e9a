use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;

use crate::descriptor::FaceDescriptor;
use crate::error::FaceError;

/// Axis-aligned face box in pixel coordinates of the analysed image.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
}

impl FaceBox {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with `other`.
    pub fn iou(&self, other: &FaceBox) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union > 0.0 { intersection / union } else { 0.0 }
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.x1 *= sx;
        self.x2 *= sx;
        self.y1 *= sy;
        self.y2 *= sy;
    }
}

/// Non-maximum suppression: keep the most confident box of every overlapping cluster.
/// Output is sorted by descending confidence.
pub fn non_max_suppression(mut boxes: Vec<FaceBox>, iou_threshold: f32) -> Vec<FaceBox> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut keep: Vec<FaceBox> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        if keep.iter().all(|k| k.iou(&candidate) < iou_threshold) {
            keep.push(candidate);
        }
    }
    keep
}

/// A single detected face with its descriptor.
#[derive(Debug, Clone)]
pub struct Detection {
    pub bounding_box: FaceBox,
    pub descriptor: FaceDescriptor,
}

impl Detection {
    pub fn score(&self) -> f32 {
        self.bounding_box.confidence
    }
}

/// Finds the most prominent face in an image and describes it.
///
/// Implementations are CPU-bound and synchronous; async callers should run
/// them on a blocking thread.
pub trait FaceDetector: Send + Sync {
    /// `Ok(None)` when the image contains no face.
    fn detect_single(&self, image: &DynamicImage) -> Result<Option<Detection>, FaceError>;
}

/// Decode an image file and shrink it by an integer `downscale` factor.
///
/// The format is sniffed from the file contents, since uploads are stored
/// without an extension. A factor of 0 or 1 keeps the original size;
/// dimensions never drop below 1px.
pub fn load_image(path: &Path, downscale: u32) -> Result<DynamicImage, FaceError> {
    let image = image::io::Reader::open(path)?
        .with_guessed_format()?
        .decode()?;
    Ok(downscale_image(image, downscale))
}

pub fn downscale_image(image: DynamicImage, downscale: u32) -> DynamicImage {
    if downscale <= 1 {
        return image;
    }
    let width = (image.width() / downscale).max(1);
    let height = (image.height() / downscale).max(1);
    image.resize_exact(width, height, FilterType::Triangle)
}
