//! Face descriptors and the detection/matching machinery behind face login.
//!
//! A [`FaceDetector`] turns an image into at most one [`Detection`] carrying a
//! fixed-length [`FaceDescriptor`]; a [`FaceMatcher`] decides whether two
//! descriptors belong to the same person by Euclidean distance.

pub mod descriptor;
pub mod detector;
pub mod error;
pub mod matcher;
pub mod onnx;

pub use descriptor::{DESCRIPTOR_LEN, FaceDescriptor, distance};
pub use detector::{Detection, FaceBox, FaceDetector, load_image};
pub use error::{DescriptorError, FaceError};
pub use matcher::{DEFAULT_MATCH_THRESHOLD, FaceMatcher, MatchOutcome};
pub use onnx::{ModelConfig, OnnxFaceDetector};
