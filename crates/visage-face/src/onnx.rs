//! ONNX Runtime backed [`FaceDetector`].
//!
//! Two models are loaded: a single-class face detector with YOLO-style
//! output (`[1, N, 5+]` or transposed `[1, 5+, N]`, rows of
//! `cx, cy, w, h, score`) and a recognition network that maps an aligned face
//! crop to a [`DESCRIPTOR_LEN`]-value embedding.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::{Array4, CowArray};
use ort::{Environment, GraphOptimizationLevel, Session, SessionBuilder, Value};

use crate::descriptor::{DESCRIPTOR_LEN, FaceDescriptor};
use crate::detector::{Detection, FaceBox, FaceDetector, non_max_suppression};
use crate::error::FaceError;

const NMS_IOU_THRESHOLD: f32 = 0.45;
/// Boxes narrower or shorter than this (in detector input pixels) are noise.
const MIN_FACE_SIDE: f32 = 10.0;
/// Pre-NMS floor; the configured confidence is applied after suppression.
const PRE_NMS_CONFIDENCE: f32 = 0.001;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub detector_path: PathBuf,
    pub recognizer_path: PathBuf,
    /// Square detector input side in pixels.
    pub detector_input: u32,
    /// Square recognizer input side in pixels.
    pub recognizer_input: u32,
    pub detection_confidence: f32,
    /// 0 disables graph optimisation, 3 enables all.
    pub optimization_level: u8,
}

pub struct OnnxFaceDetector {
    detector: Session,
    recognizer: Session,
    _environment: Arc<Environment>,
    config: ModelConfig,
}

impl OnnxFaceDetector {
    pub fn new(config: &ModelConfig) -> Result<Self, FaceError> {
        for path in [&config.detector_path, &config.recognizer_path] {
            if !path.exists() {
                return Err(FaceError::Model(format!(
                    "model not found at {}",
                    path.display()
                )));
            }
        }

        let environment = Arc::new(
            Environment::builder()
                .with_name("visage")
                .build()
                .map_err(|e| FaceError::Model(format!("failed to create environment: {e}")))?,
        );

        let detector = build_session(&environment, &config.detector_path, config)?;
        let recognizer = build_session(&environment, &config.recognizer_path, config)?;
        tracing::info!(
            detector = %config.detector_path.display(),
            recognizer = %config.recognizer_path.display(),
            "face models loaded"
        );

        Ok(Self {
            detector,
            recognizer,
            _environment: environment,
            config: config.clone(),
        })
    }

    fn detect_boxes(&self, image: &DynamicImage) -> Result<Vec<FaceBox>, FaceError> {
        let side = self.config.detector_input;
        let resized = image.resize_exact(side, side, FilterType::Triangle);
        let input = rgb_tensor(&resized, |p| p / 255.0);

        let cow = CowArray::from(input.into_dyn());
        let tensor = Value::from_array(self.detector.allocator(), &cow)?;
        let outputs = self.detector.run(vec![tensor])?;
        let output = outputs
            .first()
            .ok_or_else(|| FaceError::Model("detector produced no output".into()))?
            .try_extract::<f32>()?;
        let view = output.view();
        let values: Vec<f32> = view.iter().copied().collect();

        let mut boxes = parse_detections(&values, view.shape(), side as f32);
        boxes = non_max_suppression(boxes, NMS_IOU_THRESHOLD);
        boxes.retain(|b| b.confidence >= self.config.detection_confidence);

        let sx = image.width() as f32 / side as f32;
        let sy = image.height() as f32 / side as f32;
        for b in &mut boxes {
            b.scale(sx, sy);
        }
        Ok(boxes)
    }

    fn describe(&self, image: &DynamicImage, face: &FaceBox) -> Result<FaceDescriptor, FaceError> {
        let side = self.config.recognizer_input;
        let crop = image.crop_imm(
            face.x1.max(0.0) as u32,
            face.y1.max(0.0) as u32,
            face.width().max(1.0) as u32,
            face.height().max(1.0) as u32,
        );
        let resized = crop.resize_exact(side, side, FilterType::Triangle);
        let input = rgb_tensor(&resized, |p| (p - 127.5) / 127.5);

        let cow = CowArray::from(input.into_dyn());
        let tensor = Value::from_array(self.recognizer.allocator(), &cow)?;
        let outputs = self.recognizer.run(vec![tensor])?;
        let output = outputs
            .first()
            .ok_or_else(|| FaceError::Model("recognizer produced no output".into()))?
            .try_extract::<f32>()?;
        let mut embedding: Vec<f32> = output.view().iter().copied().collect();

        if embedding.len() != DESCRIPTOR_LEN {
            return Err(FaceError::Model(format!(
                "recognizer returned {} values, expected {DESCRIPTOR_LEN}",
                embedding.len()
            )));
        }
        l2_normalize(&mut embedding);
        Ok(FaceDescriptor::from_vec(embedding)?)
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect_single(&self, image: &DynamicImage) -> Result<Option<Detection>, FaceError> {
        let boxes = self.detect_boxes(image)?;
        // Sorted by confidence after NMS.
        let Some(best) = boxes.into_iter().next() else {
            tracing::debug!("no face detected");
            return Ok(None);
        };
        let descriptor = self.describe(image, &best)?;
        tracing::debug!(confidence = best.confidence, "face detected");
        Ok(Some(Detection {
            bounding_box: best,
            descriptor,
        }))
    }
}

fn build_session(
    environment: &Arc<Environment>,
    path: &Path,
    config: &ModelConfig,
) -> Result<Session, FaceError> {
    let level = match config.optimization_level {
        0 => GraphOptimizationLevel::Disable,
        1 => GraphOptimizationLevel::Level1,
        2 => GraphOptimizationLevel::Level2,
        _ => GraphOptimizationLevel::Level3,
    };
    let session = SessionBuilder::new(environment)?
        .with_optimization_level(level)?
        .with_model_from_file(path)?;
    Ok(session)
}

/// NCHW RGB tensor with `normalize` applied to every 0..=255 channel value.
fn rgb_tensor(image: &DynamicImage, normalize: impl Fn(f32) -> f32) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let mut array = Array4::<f32>::zeros((1, 3, height, width));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            array[[0, c, y, x]] = normalize(f32::from(pixel[c]));
        }
    }
    array
}

/// Decode raw detector output into boxes in detector-input pixel space.
///
/// Accepts `[1, N, K]`, `[1, K, N]` (transposed when the attribute axis is the
/// shorter one) and `[N, K]`, with `K >= 5`. Coordinates in `0..=1` are treated as normalised to `side`.
fn parse_detections(values: &[f32], shape: &[usize], side: f32) -> Vec<FaceBox> {
    let (count, stride, transposed) = match shape {
        [_, a, b] if a < b && *a >= 5 => (*b, *a, true),
        [_, a, b] => (*a, *b, false),
        [a, b] => (*a, *b, false),
        _ => {
            tracing::warn!(?shape, "unexpected detector output shape");
            return vec![];
        }
    };
    if stride < 5 || values.len() < count * stride {
        tracing::warn!(?shape, len = values.len(), "detector output too small");
        return vec![];
    }

    let at = |row: usize, col: usize| {
        if transposed {
            values[col * count + row]
        } else {
            values[row * stride + col]
        }
    };

    let mut boxes = Vec::new();
    for i in 0..count {
        let (cx, cy, w, h, confidence) = (at(i, 0), at(i, 1), at(i, 2), at(i, 3), at(i, 4));
        if confidence <= PRE_NMS_CONFIDENCE {
            continue;
        }
        let scale = if cx <= 1.0 && cy <= 1.0 && w <= 1.0 && h <= 1.0 {
            side
        } else {
            1.0
        };
        let (cx, cy, w, h) = (cx * scale, cy * scale, w * scale, h * scale);
        let b = FaceBox {
            x1: (cx - w / 2.0).max(0.0),
            y1: (cy - h / 2.0).max(0.0),
            x2: (cx + w / 2.0).min(side),
            y2: (cy + h / 2.0).min(side),
            confidence,
        };
        if b.width() > MIN_FACE_SIDE && b.height() > MIN_FACE_SIDE {
            boxes.push(b);
        }
    }
    boxes
}

fn l2_normalize(values: &mut [f32]) {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in values.iter_mut() {
            *v /= norm;
        }
    }
}
